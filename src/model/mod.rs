//! Data model shared by every stage of a comparison.
//!
//! Analyzers produce one [`ElementForest`] per API version. Elements are
//! addressed by [`ElementId`] handles and viewed through [`ElementRef`],
//! which gives O(1) access to the parent, children and owning archive.
//! Difference analyzers attach [`Difference`] values to a [`Report`] for
//! each element [`Pairing`].

mod api;
mod criticality;
mod difference;
mod element;
mod forest;
mod pairing;
mod report;

pub use api::{Api, Archive};
pub use criticality::{Criticality, CriticalityRegistry, SeverityMapping};
pub use difference::{CompatibilityType, Difference, DifferenceSeverity};
pub use element::{ApiSide, Element, ElementId, SimpleElement};
pub use forest::{ElementForest, ElementRef, Walk};
pub use pairing::Pairing;
pub use report::Report;
