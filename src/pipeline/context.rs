//! Context handed to extensions before their first use.

use crate::error::{ApiCompatError, ExtensionErrorKind, Result};
use crate::model::{Criticality, CriticalityRegistry, SeverityMapping};
use serde::de::DeserializeOwned;

/// Configuration and shared settings visible to one extension.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionContext<'a> {
    extension_id: &'a str,
    configuration: Option<&'a serde_json::Value>,
    criticalities: &'a CriticalityRegistry,
    severity_mapping: &'a SeverityMapping,
}

impl<'a> ExtensionContext<'a> {
    #[must_use]
    pub const fn new(
        extension_id: &'a str,
        configuration: Option<&'a serde_json::Value>,
        criticalities: &'a CriticalityRegistry,
        severity_mapping: &'a SeverityMapping,
    ) -> Self {
        Self {
            extension_id,
            configuration,
            criticalities,
            severity_mapping,
        }
    }

    #[must_use]
    pub const fn extension_id(&self) -> &'a str {
        self.extension_id
    }

    /// Raw configuration section of this extension
    #[must_use]
    pub const fn raw_config(&self) -> Option<&'a serde_json::Value> {
        self.configuration
    }

    /// Typed configuration, or `None` when the extension has no section
    pub fn config<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.configuration
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    ApiCompatError::extension(
                        self.extension_id,
                        "deserializing configuration",
                        ExtensionErrorKind::Configuration(e.to_string()),
                    )
                })
            })
            .transpose()
    }

    /// Typed configuration, falling back to the type's default
    pub fn config_or_default<T: DeserializeOwned + Default>(&self) -> Result<T> {
        Ok(self.config()?.unwrap_or_default())
    }

    /// Look up a declared criticality by name
    #[must_use]
    pub fn criticality(&self, name: &str) -> Option<&'a Criticality> {
        self.criticalities.get(name)
    }

    #[must_use]
    pub const fn criticalities(&self) -> &'a CriticalityRegistry {
        self.criticalities
    }

    #[must_use]
    pub const fn severity_mapping(&self) -> &'a SeverityMapping {
        self.severity_mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Sample {
        #[serde(default)]
        limit: u32,
    }

    #[test]
    fn test_typed_config() {
        let value = serde_json::json!({ "limit": 3 });
        let registry = CriticalityRegistry::default();
        let mapping = SeverityMapping::default();
        let ctx = ExtensionContext::new("sample", Some(&value), &registry, &mapping);
        assert_eq!(ctx.config::<Sample>().unwrap(), Some(Sample { limit: 3 }));
        assert_eq!(ctx.criticality("error"), Some(&Criticality::error()));
    }

    #[test]
    fn test_missing_config_defaults() {
        let registry = CriticalityRegistry::default();
        let mapping = SeverityMapping::default();
        let ctx = ExtensionContext::new("sample", None, &registry, &mapping);
        assert_eq!(ctx.config::<Sample>().unwrap(), None);
        assert_eq!(ctx.config_or_default::<Sample>().unwrap(), Sample::default());
    }

    #[test]
    fn test_malformed_config_names_extension() {
        let value = serde_json::json!({ "limit": "many" });
        let registry = CriticalityRegistry::default();
        let mapping = SeverityMapping::default();
        let ctx = ExtensionContext::new("sample", Some(&value), &registry, &mapping);
        let err = ctx.config::<Sample>().unwrap_err();
        assert!(err.to_string().contains("sample"), "{err}");
    }
}
