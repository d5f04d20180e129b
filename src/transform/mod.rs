//! Difference transformation.
//!
//! Transforms rewrite the differences reported for a pair of elements. The
//! [`TransformEngine`] applies them repeatedly until a report no longer
//! changes, guarding against transforms that undo each other.

mod differences;
mod engine;
mod result;
mod traits;

pub use differences::{DifferenceRecipe, DifferencesConfig, DifferencesTransform};
pub use engine::{StabilizeOutcome, TransformEngine, TransformLimits};
pub use result::TransformationResult;
pub use traits::DifferenceTransform;
