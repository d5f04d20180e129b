//! Pipeline orchestration.
//!
//! Extensions are registered in an [`ExtensionRegistry`], selected and
//! configured by [`ComparisonEngine::build`] and driven through one
//! comparison by [`ComparisonEngine::run`].

mod cancel;
mod context;
mod engine;
mod registry;
mod reporters;
mod traits;

pub use cancel::CancellationToken;
pub use context::ExtensionContext;
pub use engine::{ComparisonEngine, ComparisonSummary};
pub use registry::{ExtensionKind, ExtensionRegistry};
pub use reporters::{CollectedReport, CollectingReporter, ReportSink};
pub use traits::{ApiAnalyzer, ArchiveAnalyzer, DifferenceAnalyzer, Extension, Reporter};
