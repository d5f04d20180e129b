//! Configuration validation for api-compat.
//!
//! Validation collects every problem instead of stopping at the first one,
//! so a user can fix a configuration in one go.

use super::types::{ExtensionSelection, PipelineConfig};
use crate::model::DifferenceSeverity;
use std::collections::{HashMap, HashSet};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for PipelineConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.analyzers.validate_at("analyzers"));
        errors.extend(self.filters.validate_at("filters"));
        errors.extend(self.transforms.validate_at("transforms"));
        errors.extend(self.reporters.validate_at("reporters"));
        errors.extend(self.validate_blocks());
        errors.extend(self.validate_criticalities());
        errors.extend(self.validate_severity_mapping());

        if self.max_transform_iterations == 0 {
            errors.push(ConfigError::new(
                "maxTransformIterations",
                "must be at least 1",
            ));
        }

        for id in self.extensions.keys() {
            if id.trim().is_empty() {
                errors.push(ConfigError::new(
                    "extensions",
                    "extension configuration keyed by an empty id",
                ));
            }
        }

        errors
    }
}

impl ExtensionSelection {
    /// Validate the lists, reporting problems under `field`
    pub(crate) fn validate_at(&self, field: &str) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (list, ids) in [("include", &self.include), ("exclude", &self.exclude)] {
            if ids.iter().any(|id| id.trim().is_empty()) {
                errors.push(ConfigError::new(
                    format!("{field}.{list}"),
                    "extension ids must not be empty",
                ));
            }
        }
        for id in &self.include {
            if self.exclude.contains(id) {
                errors.push(ConfigError::new(
                    field,
                    format!("'{id}' is both included and excluded"),
                ));
            }
        }
        errors
    }
}

impl PipelineConfig {
    fn validate_blocks(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut owner: HashMap<&str, usize> = HashMap::new();
        for (index, block) in self.transform_blocks.iter().enumerate() {
            let field = format!("transformBlocks[{index}]");
            if block.is_empty() {
                errors.push(ConfigError::new(&field, "a block needs at least one transform"));
            }
            for id in block {
                if id.trim().is_empty() {
                    errors.push(ConfigError::new(&field, "transform ids must not be empty"));
                    continue;
                }
                if let Some(previous) = owner.insert(id.as_str(), index) {
                    let message = if previous == index {
                        format!("'{id}' appears more than once")
                    } else {
                        format!("'{id}' already belongs to transformBlocks[{previous}]")
                    };
                    errors.push(ConfigError::new(&field, message));
                }
                if !self.transforms.is_selected(id) {
                    errors.push(ConfigError::new(
                        &field,
                        format!("'{id}' is not a selected transform"),
                    ));
                }
            }
        }
        errors
    }

    fn validate_criticalities(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        for criticality in &self.criticalities {
            if criticality.name.trim().is_empty() {
                errors.push(ConfigError::new(
                    "criticalities",
                    "criticality names must not be empty",
                ));
            } else if !seen.insert(criticality.name.as_str()) {
                errors.push(ConfigError::new(
                    "criticalities",
                    format!("criticality '{}' declared more than once", criticality.name),
                ));
            }
        }
        errors
    }

    fn validate_severity_mapping(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let missing: Vec<String> = DifferenceSeverity::ALL
            .iter()
            .filter(|s| !self.severity_mapping.contains_key(*s))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            errors.push(ConfigError::new(
                "severityMapping",
                format!("no criticality mapped for {}", missing.join(", ")),
            ));
        }

        let declared = self.effective_criticalities();
        for (severity, name) in &self.severity_mapping {
            if !declared.iter().any(|c| &c.name == name) {
                errors.push(ConfigError::new(
                    format!("severityMapping.{severity}"),
                    format!("criticality '{name}' is not declared"),
                ));
            }
        }
        errors
    }
}
