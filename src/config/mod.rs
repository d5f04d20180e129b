//! Configuration module for api-compat.
//!
//! This module provides:
//! - Typed pipeline configuration read from YAML or JSON
//! - Validation that reports every problem at once
//! - Resolution into the form the comparison engine is built from
//! - Config file loading and discovery
//!
//! # Configuration File
//!
//! Place a `.api-compat.yaml` file in your project root:
//!
//! ```yaml
//! transforms:
//!   exclude: [experimental.rename]
//! transformBlocks:
//!   - [acme.reclassify, acme.justify]
//! severityMapping:
//!   EQUIVALENT: allowed
//!   NON_BREAKING: documented
//!   POTENTIALLY_BREAKING: error
//!   BREAKING: error
//! extensions:
//!   api-compat.differences:
//!     differences:
//!       - code: method.removed
//!         ignore: true
//! ```

mod defaults;
pub mod file;
mod resolved;
mod types;
mod validation;

pub use defaults::{
    CONFIG_FILE_NAMES, DEFAULT_MAX_TRANSFORM_ITERATIONS, OSCILLATION_WARNING_THRESHOLD,
    default_severity_mapping,
};
pub use resolved::PipelineConfiguration;
pub use types::{CriticalityConfig, ExtensionSelection, IterationLimitPolicy, PipelineConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{discover_config_file, generate_example_config, load_config_file, load_or_default};

/// Generate a JSON Schema for the `PipelineConfig` configuration format.
///
/// Editors can use it for validation and autocompletion of
/// `.api-compat.yaml` files.
pub fn generate_json_schema() -> crate::error::Result<String> {
    let schema = schemars::schema_for!(PipelineConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}
