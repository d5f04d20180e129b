//! Default values for pipeline configuration.

use crate::model::{DifferenceSeverity, SeverityMapping};
use std::collections::BTreeMap;

/// Default bound on fixpoint passes over one report.
pub const DEFAULT_MAX_TRANSFORM_ITERATIONS: usize = 250;

/// Pass count after which transforms are reported as likely oscillating.
pub const OSCILLATION_WARNING_THRESHOLD: usize = 100;

/// Standard config file names, in lookup order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".api-compat.yaml",
    ".api-compat.yml",
    "api-compat.yaml",
    "api-compat.yml",
];

/// Severity to criticality names of the built-in mapping.
#[must_use]
pub fn default_severity_mapping() -> BTreeMap<DifferenceSeverity, String> {
    SeverityMapping::default()
        .iter()
        .map(|(severity, criticality)| (severity, criticality.name.clone()))
        .collect()
}
