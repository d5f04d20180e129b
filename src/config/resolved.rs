//! Validated pipeline configuration.

use super::types::{ExtensionSelection, PipelineConfig};
use super::validation::{ConfigError, Validatable};
use crate::error::{ApiCompatError, Result};
use crate::model::{Criticality, CriticalityRegistry, DifferenceSeverity, SeverityMapping};
use crate::transform::TransformLimits;
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Configuration the comparison engine is built from.
///
/// Normally produced by [`PipelineConfig::resolve`], which rejects unknown
/// criticality names. The severity mapping is total whichever way the value
/// is built, and [`Default`] equals a resolved default [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct PipelineConfiguration {
    pub analyzers: ExtensionSelection,
    pub filters: ExtensionSelection,
    pub transforms: ExtensionSelection,
    pub reporters: ExtensionSelection,
    pub transform_blocks: Vec<Vec<String>>,
    pub criticalities: CriticalityRegistry,
    pub severity_mapping: SeverityMapping,
    pub limits: TransformLimits,
    pub extensions: IndexMap<String, serde_json::Value>,
}

impl PipelineConfiguration {
    /// Configuration section of one extension
    #[must_use]
    pub fn extension_config(&self, extension_id: &str) -> Option<&serde_json::Value> {
        self.extensions.get(extension_id)
    }
}

impl Default for PipelineConfiguration {
    fn default() -> Self {
        Self {
            analyzers: ExtensionSelection::default(),
            filters: ExtensionSelection::default(),
            transforms: ExtensionSelection::default(),
            reporters: ExtensionSelection::default(),
            transform_blocks: Vec::new(),
            criticalities: CriticalityRegistry::default(),
            severity_mapping: SeverityMapping::default(),
            limits: TransformLimits::default(),
            extensions: IndexMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Validate and resolve into a [`PipelineConfiguration`].
    ///
    /// Fails with [`ApiCompatError::InvalidConfig`] listing every problem.
    pub fn resolve(&self) -> Result<PipelineConfiguration> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(ApiCompatError::invalid_config(errors));
        }

        let criticalities = CriticalityRegistry::new(self.effective_criticalities());
        let mapping: BTreeMap<DifferenceSeverity, Criticality> = self
            .severity_mapping
            .iter()
            .filter_map(|(severity, name)| criticalities.get(name).map(|c| (*severity, c.clone())))
            .collect();
        let severity_mapping = SeverityMapping::new(mapping).map_err(|missing| {
            let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
            ApiCompatError::invalid_config(vec![ConfigError::new(
                "severityMapping",
                format!("no criticality mapped for {}", names.join(", ")),
            )])
        })?;

        let limits = TransformLimits {
            max_iterations: self.max_transform_iterations,
            on_limit: self.on_iteration_limit,
            ..TransformLimits::default()
        };

        tracing::debug!(
            criticalities = criticalities.len(),
            blocks = self.transform_blocks.len(),
            max_iterations = limits.max_iterations,
            "Resolved pipeline configuration"
        );

        Ok(PipelineConfiguration {
            analyzers: self.analyzers.clone(),
            filters: self.filters.clone(),
            transforms: self.transforms.clone(),
            reporters: self.reporters.clone(),
            transform_blocks: self.transform_blocks.clone(),
            criticalities,
            severity_mapping,
            limits,
            extensions: self.extensions.clone(),
        })
    }
}
