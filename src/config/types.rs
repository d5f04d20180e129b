//! Configuration types for a comparison pipeline.
//!
//! [`PipelineConfig`] is the serialized form read from YAML or JSON.
//! [`PipelineConfig::resolve`] validates it and produces the
//! [`PipelineConfiguration`] the engine is built from.

use super::defaults::{DEFAULT_MAX_TRANSFORM_ITERATIONS, default_severity_mapping};
use crate::model::{Criticality, DifferenceSeverity};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Pipeline Configuration
// ============================================================================

/// Serialized pipeline configuration.
///
/// Every field has a default, so an empty document runs every registered
/// extension with the built-in criticalities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// API analyzers taking part in the comparison
    pub analyzers: ExtensionSelection,
    /// Tree filters
    pub filters: ExtensionSelection,
    /// Difference transforms
    pub transforms: ExtensionSelection,
    /// Reporters
    pub reporters: ExtensionSelection,
    /// Transforms grouped into blocks, each an ordered list of extension ids
    pub transform_blocks: Vec<Vec<String>>,
    /// Declared criticalities; empty means the built-in set
    pub criticalities: Vec<CriticalityConfig>,
    /// Criticality name for every difference severity
    pub severity_mapping: BTreeMap<DifferenceSeverity, String>,
    /// Upper bound on fixpoint passes over one report
    pub max_transform_iterations: usize,
    /// What happens when `max_transform_iterations` is reached
    pub on_iteration_limit: IterationLimitPolicy,
    /// Configuration of individual extensions keyed by extension id
    pub extensions: IndexMap<String, serde_json::Value>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analyzers: ExtensionSelection::default(),
            filters: ExtensionSelection::default(),
            transforms: ExtensionSelection::default(),
            reporters: ExtensionSelection::default(),
            transform_blocks: Vec::new(),
            criticalities: Vec::new(),
            severity_mapping: default_severity_mapping(),
            max_transform_iterations: DEFAULT_MAX_TRANSFORM_ITERATIONS,
            on_iteration_limit: IterationLimitPolicy::default(),
            extensions: IndexMap::new(),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Criticalities in effect: the declared ones, or the built-in set
    #[must_use]
    pub fn effective_criticalities(&self) -> Vec<Criticality> {
        if self.criticalities.is_empty() {
            Criticality::defaults()
        } else {
            self.criticalities.iter().map(Criticality::from).collect()
        }
    }

    /// Set the configuration section of one extension
    #[must_use]
    pub fn with_extension_config(
        mut self,
        extension_id: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.extensions.insert(extension_id.into(), value);
        self
    }

    #[must_use]
    pub fn with_transform_block(mut self, block: Vec<String>) -> Self {
        self.transform_blocks.push(block);
        self
    }

    #[must_use]
    pub const fn with_iteration_limit(
        mut self,
        max_iterations: usize,
        policy: IterationLimitPolicy,
    ) -> Self {
        self.max_transform_iterations = max_iterations;
        self.on_iteration_limit = policy;
        self
    }
}

// ============================================================================
// Extension Selection
// ============================================================================

/// Include/exclude lists over extension ids of one kind.
///
/// An empty include list selects every registered extension; exclusion
/// always wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExtensionSelection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ExtensionSelection {
    /// Selection of exactly the given ids
    pub fn only<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: ids.into_iter().map(Into::into).collect(),
            exclude: Vec::new(),
        }
    }

    #[must_use]
    pub fn excluding(mut self, id: impl Into<String>) -> Self {
        self.exclude.push(id.into());
        self
    }

    /// Whether an extension with this id takes part
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|i| i == id);
        included && !self.exclude.iter().any(|e| e == id)
    }
}

// ============================================================================
// Criticalities and limits
// ============================================================================

/// A declared criticality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CriticalityConfig {
    pub name: String,
    /// Rank; higher is more critical
    pub level: i32,
}

impl From<&CriticalityConfig> for Criticality {
    fn from(config: &CriticalityConfig) -> Self {
        Self::new(config.name.clone(), config.level)
    }
}

/// Behavior when transformations do not stabilize within the iteration bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum IterationLimitPolicy {
    /// Keep the differences as they are after the last pass and log a warning
    #[default]
    KeepLastState,
    /// Abort the comparison with an error
    Fail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_include_selects_everything() {
        let selection = ExtensionSelection::default().excluding("b");
        assert!(selection.is_selected("a"));
        assert!(!selection.is_selected("b"));
    }

    #[test]
    fn test_include_limits_selection() {
        let selection = ExtensionSelection::only(["a", "b"]).excluding("b");
        assert!(selection.is_selected("a"));
        assert!(!selection.is_selected("b"));
        assert!(!selection.is_selected("c"));
    }

    #[test]
    fn test_effective_criticalities_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.effective_criticalities(), Criticality::defaults());

        let config = PipelineConfig {
            criticalities: vec![CriticalityConfig {
                name: "fatal".to_string(),
                level: 1,
            }],
            ..PipelineConfig::default()
        };
        assert_eq!(config.effective_criticalities(), vec![Criticality::new("fatal", 1)]);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: PipelineConfig = serde_json::from_value(serde_json::json!({
            "maxTransformIterations": 10,
            "onIterationLimit": "fail",
            "transforms": { "exclude": ["noisy"] }
        }))
        .unwrap();
        assert_eq!(config.max_transform_iterations, 10);
        assert_eq!(config.on_iteration_limit, IterationLimitPolicy::Fail);
        assert!(!config.transforms.is_selected("noisy"));
        assert_eq!(config.severity_mapping, default_severity_mapping());
    }
}
