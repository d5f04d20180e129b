//! Three-valued element filtering.
//!
//! Filters decide per element whether it takes part in the comparison and
//! whether its children are visited at all. Decisions may be deferred
//! ([`Ternary::Undecided`]) until the whole forest has been seen.
//!
//! # Example
//!
//! ```
//! use api_compat::filter::{FilterStartResult, Ternary};
//!
//! let explicit = FilterStartResult::match_and_descend();
//! let combined = explicit.and(FilterStartResult::default_result());
//! assert_eq!(combined.matches, Ternary::True);
//! assert!(!combined.inherited);
//! ```

mod include_exclude;
mod registry;
mod result;
mod ternary;
mod traits;

pub use include_exclude::{IncludeExcludeConfig, IncludeExcludeFilter};
pub use registry::{FilterRegistry, FilterVerdicts, Verdict};
pub use result::{FilterFinishResult, FilterStartResult};
pub use ternary::Ternary;
pub use traits::TreeFilter;
