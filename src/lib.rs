//! **A pluggable pipeline for checking API compatibility between two versions.**
//!
//! `api-compat` compares an old and a new version of an API. Language or
//! format specific analyzers turn each version into a tree of elements; the
//! core pairs up the elements of both trees, lets analyzers describe the
//! differences of each pair, reshapes those differences with configurable
//! transforms and delivers the result to reporters.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: element forests, differences, criticalities and reports.
//! - **[`matching`]**: the co-iterator and the correspondence deducers that
//!   decide which old element is paired with which new one.
//! - **[`filter`]**: three-valued tree filters selecting the elements that
//!   take part in a comparison.
//! - **[`transform`]**: difference transforms and the fixpoint engine
//!   applying them.
//! - **[`pipeline`]**: extension traits, the registry and the
//!   [`ComparisonEngine`] driving a comparison.
//! - **[`config`]**: the YAML/JSON pipeline configuration and its validation.
//!
//! ## Running a comparison
//!
//! ```ignore
//! use api_compat::{ComparisonEngine, ExtensionRegistry, PipelineConfig};
//! use api_compat::pipeline::CollectingReporter;
//!
//! let config = PipelineConfig::from_yaml(&std::fs::read_to_string(".api-compat.yaml")?)?
//!     .resolve()?;
//! let reporter = CollectingReporter::new("collect");
//! let sink = reporter.sink();
//! let registry = ExtensionRegistry::new()
//!     .with_analyzer(Box::new(MyAnalyzer::default()))
//!     .with_reporter(Box::new(reporter));
//!
//! let summary = ComparisonEngine::build(config, registry)?.run(&old_api, &new_api)?;
//! for difference in sink.differences() {
//!     println!("{difference}");
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Variable names like `old`/`new` are clear in context
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod matching;
pub mod model;
pub mod pipeline;
pub mod transform;

// Re-export main types for convenience
pub use config::{ConfigError, PipelineConfig, PipelineConfiguration, Validatable};
pub use error::{ApiCompatError, ErrorContext, OptionContext, Result};
pub use filter::{FilterStartResult, Ternary, TreeFilter};
pub use matching::{CoIterator, Correspondence, CorrespondenceDeducer};
pub use model::{
    Api, CompatibilityType, Criticality, Difference, DifferenceSeverity, Element, ElementForest,
    ElementRef, Pairing, Report,
};
pub use pipeline::{ComparisonEngine, ComparisonSummary, ExtensionRegistry};
pub use transform::{DifferenceTransform, TransformationResult};
