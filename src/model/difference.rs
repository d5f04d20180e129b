//! Differences detected between a paired old/new element.

use super::criticality::Criticality;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Axis of compatibility judgment
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityType {
    Binary,
    Source,
    Semantic,
    Other,
}

impl CompatibilityType {
    pub const ALL: [Self; 4] = [Self::Binary, Self::Source, Self::Semantic, Self::Other];
}

impl fmt::Display for CompatibilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "BINARY"),
            Self::Source => write!(f, "SOURCE"),
            Self::Semantic => write!(f, "SEMANTIC"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

/// Ordinal impact within one compatibility type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifferenceSeverity {
    Equivalent,
    NonBreaking,
    PotentiallyBreaking,
    Breaking,
}

impl DifferenceSeverity {
    pub const ALL: [Self; 4] = [
        Self::Equivalent,
        Self::NonBreaking,
        Self::PotentiallyBreaking,
        Self::Breaking,
    ];
}

impl fmt::Display for DifferenceSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equivalent => write!(f, "EQUIVALENT"),
            Self::NonBreaking => write!(f, "NON_BREAKING"),
            Self::PotentiallyBreaking => write!(f, "POTENTIALLY_BREAKING"),
            Self::Breaking => write!(f, "BREAKING"),
        }
    }
}

/// A single detected discrepancy.
///
/// Differences are values: transforms produce modified copies instead of
/// mutating the difference they were given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Difference {
    /// Analyzer-defined key, e.g. `java.method.removed`
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub classification: BTreeMap<CompatibilityType, DifferenceSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criticality: Option<Criticality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default)]
    pub attachments: BTreeMap<String, String>,
    /// Attachment keys that tell apart differences sharing the same code
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifying_attachments: Vec<String>,
}

impl Difference {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
            classification: BTreeMap::new(),
            criticality: None,
            justification: None,
            attachments: BTreeMap::new(),
            identifying_attachments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_classification(
        mut self,
        compatibility: CompatibilityType,
        severity: DifferenceSeverity,
    ) -> Self {
        self.classification.insert(compatibility, severity);
        self
    }

    /// Replace the whole classification map
    #[must_use]
    pub fn with_classifications(
        mut self,
        classification: BTreeMap<CompatibilityType, DifferenceSeverity>,
    ) -> Self {
        self.classification = classification;
        self
    }

    #[must_use]
    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = Some(criticality);
        self
    }

    #[must_use]
    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = Some(justification.into());
        self
    }

    #[must_use]
    pub fn with_attachment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attachments.insert(key.into(), value.into());
        self
    }

    /// Add an attachment that also identifies the difference
    #[must_use]
    pub fn with_identifying_attachment(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let key = key.into();
        if !self.identifying_attachments.contains(&key) {
            self.identifying_attachments.push(key.clone());
        }
        self.attachments.insert(key, value.into());
        self
    }

    #[must_use]
    pub fn severity(&self, compatibility: CompatibilityType) -> Option<DifferenceSeverity> {
        self.classification.get(&compatibility).copied()
    }

    /// Most severe classification across all compatibility types
    #[must_use]
    pub fn max_severity(&self) -> Option<DifferenceSeverity> {
        self.classification.values().copied().max()
    }

    #[must_use]
    pub fn is_breaking(&self) -> bool {
        self.max_severity() == Some(DifferenceSeverity::Breaking)
    }

    /// Values of the identifying attachments, in declaration order
    pub fn identity(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.identifying_attachments
            .iter()
            .map(|k| (k.as_str(), self.attachments.get(k).map(String::as_str)))
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.name)?;
        if !self.classification.is_empty() {
            let classes: Vec<String> = self
                .classification
                .iter()
                .map(|(c, s)| format!("{c}={s}"))
                .collect();
            write!(f, " [{}]", classes.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_severity_queries() {
        let diff = Difference::new("java.class.removed", "class removed")
            .with_description("Class com.acme.Foo was removed")
            .with_classification(CompatibilityType::Binary, DifferenceSeverity::Breaking)
            .with_classification(CompatibilityType::Source, DifferenceSeverity::Breaking)
            .with_classification(CompatibilityType::Semantic, DifferenceSeverity::NonBreaking);

        assert_eq!(
            diff.severity(CompatibilityType::Semantic),
            Some(DifferenceSeverity::NonBreaking)
        );
        assert_eq!(diff.severity(CompatibilityType::Other), None);
        assert!(diff.is_breaking());
    }

    #[test]
    fn test_attachment_order_is_irrelevant_for_equality() {
        let a = Difference::new("c", "n")
            .with_attachment("x", "1")
            .with_attachment("y", "2");
        let b = Difference::new("c", "n")
            .with_attachment("y", "2")
            .with_attachment("x", "1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_identifying_attachments() {
        let diff = Difference::new("c", "n")
            .with_identifying_attachment("methodName", "foo")
            .with_identifying_attachment("methodName", "bar")
            .with_attachment("note", "x");
        let identity: Vec<_> = diff.identity().collect();
        assert_eq!(identity, vec![("methodName", Some("bar"))]);
    }

    #[test]
    fn test_severity_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&DifferenceSeverity::PotentiallyBreaking).unwrap();
        assert_eq!(json, "\"POTENTIALLY_BREAKING\"");
        assert_eq!(
            DifferenceSeverity::PotentiallyBreaking.to_string(),
            "POTENTIALLY_BREAKING"
        );
    }

    #[test]
    fn test_display() {
        let diff = Difference::new("c", "changed")
            .with_classification(CompatibilityType::Source, DifferenceSeverity::Breaking);
        assert_eq!(diff.to_string(), "c: changed [SOURCE=BREAKING]");
    }
}
