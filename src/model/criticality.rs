//! Criticality levels and the severity to criticality mapping.

use super::difference::{Difference, DifferenceSeverity};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Named importance level with an integer rank.
///
/// Ordered by level first, then by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Criticality {
    pub name: String,
    pub level: i32,
}

impl Criticality {
    pub const ALLOWED_LEVEL: i32 = 1000;
    pub const DOCUMENTED_LEVEL: i32 = 2000;
    pub const HIGHLIGHT_LEVEL: i32 = 3000;
    pub const ERROR_LEVEL: i32 = i32::MAX;

    pub fn new(name: impl Into<String>, level: i32) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }

    #[must_use]
    pub fn allowed() -> Self {
        Self::new("allowed", Self::ALLOWED_LEVEL)
    }

    #[must_use]
    pub fn documented() -> Self {
        Self::new("documented", Self::DOCUMENTED_LEVEL)
    }

    #[must_use]
    pub fn highlight() -> Self {
        Self::new("highlight", Self::HIGHLIGHT_LEVEL)
    }

    #[must_use]
    pub fn error() -> Self {
        Self::new("error", Self::ERROR_LEVEL)
    }

    /// The built-in set: `allowed` < `documented` < `highlight` < `error`
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::allowed(),
            Self::documented(),
            Self::highlight(),
            Self::error(),
        ]
    }
}

impl PartialOrd for Criticality {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Criticality {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level
            .cmp(&other.level)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.level)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Declared criticalities, looked up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalityRegistry {
    by_name: IndexMap<String, Criticality>,
}

impl CriticalityRegistry {
    /// Registry holding the given criticalities; later duplicates replace earlier ones
    pub fn new(criticalities: impl IntoIterator<Item = Criticality>) -> Self {
        Self {
            by_name: criticalities
                .into_iter()
                .map(|c| (c.name.clone(), c))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Criticality> {
        self.by_name.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Declared criticalities in ascending order
    #[must_use]
    pub fn sorted(&self) -> Vec<&Criticality> {
        let mut all: Vec<_> = self.by_name.values().collect();
        all.sort();
        all
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for CriticalityRegistry {
    fn default() -> Self {
        Self::new(Criticality::defaults())
    }
}

// ============================================================================
// Severity mapping
// ============================================================================

/// Total mapping from every [`DifferenceSeverity`] to a criticality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityMapping {
    mapping: BTreeMap<DifferenceSeverity, Criticality>,
}

impl SeverityMapping {
    /// Build a mapping, failing with the list of severities left unmapped
    pub fn new(
        mapping: BTreeMap<DifferenceSeverity, Criticality>,
    ) -> Result<Self, Vec<DifferenceSeverity>> {
        let missing: Vec<_> = DifferenceSeverity::ALL
            .into_iter()
            .filter(|s| !mapping.contains_key(s))
            .collect();
        if missing.is_empty() {
            Ok(Self { mapping })
        } else {
            Err(missing)
        }
    }

    /// Criticality configured for a severity
    #[must_use]
    pub fn criticality_of(&self, severity: DifferenceSeverity) -> &Criticality {
        // Construction guarantees every severity is present.
        &self.mapping[&severity]
    }

    /// Highest criticality among the mapped severities of a difference.
    ///
    /// `None` when the difference carries no classification.
    #[must_use]
    pub fn criticality_for(&self, difference: &Difference) -> Option<Criticality> {
        difference
            .classification
            .values()
            .map(|s| self.criticality_of(*s))
            .max()
            .cloned()
    }

    /// Keep an explicit criticality, otherwise derive one from the classification
    #[must_use]
    pub fn assign(&self, mut difference: Difference) -> Difference {
        if difference.criticality.is_none() {
            difference.criticality = self.criticality_for(&difference);
        }
        difference
    }

    pub fn iter(&self) -> impl Iterator<Item = (DifferenceSeverity, &Criticality)> {
        self.mapping.iter().map(|(s, c)| (*s, c))
    }
}

impl Default for SeverityMapping {
    fn default() -> Self {
        let mapping = BTreeMap::from([
            (DifferenceSeverity::Equivalent, Criticality::allowed()),
            (DifferenceSeverity::NonBreaking, Criticality::documented()),
            (DifferenceSeverity::PotentiallyBreaking, Criticality::error()),
            (DifferenceSeverity::Breaking, Criticality::error()),
        ]);
        Self { mapping }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompatibilityType;

    #[test]
    fn test_default_criticalities_are_ordered() {
        let defaults = Criticality::defaults();
        let mut sorted = defaults.clone();
        sorted.sort();
        assert_eq!(defaults, sorted);
        assert!(Criticality::allowed() < Criticality::error());
    }

    #[test]
    fn test_incomplete_mapping_names_missing_severities() {
        let partial = BTreeMap::from([
            (DifferenceSeverity::Equivalent, Criticality::allowed()),
            (DifferenceSeverity::Breaking, Criticality::error()),
        ]);
        let missing = SeverityMapping::new(partial).unwrap_err();
        assert_eq!(
            missing,
            vec![
                DifferenceSeverity::NonBreaking,
                DifferenceSeverity::PotentiallyBreaking
            ]
        );
    }

    #[test]
    fn test_criticality_for_takes_maximum() {
        let mapping = SeverityMapping::default();
        let diff = Difference::new("java.method.added", "method added")
            .with_classification(CompatibilityType::Binary, DifferenceSeverity::NonBreaking)
            .with_classification(
                CompatibilityType::Source,
                DifferenceSeverity::PotentiallyBreaking,
            );
        assert_eq!(mapping.criticality_for(&diff), Some(Criticality::error()));
    }

    #[test]
    fn test_assign_keeps_explicit_criticality() {
        let mapping = SeverityMapping::default();
        let diff = Difference::new("c", "n")
            .with_classification(CompatibilityType::Source, DifferenceSeverity::Breaking)
            .with_criticality(Criticality::highlight());
        assert_eq!(
            mapping.assign(diff).criticality,
            Some(Criticality::highlight())
        );

        let unclassified = mapping.assign(Difference::new("c", "n"));
        assert_eq!(unclassified.criticality, None);
    }

    #[test]
    fn test_registry_lookup() {
        let registry = CriticalityRegistry::default();
        assert_eq!(registry.len(), 4);
        assert!(registry.contains("highlight"));
        assert_eq!(registry.get("error"), Some(&Criticality::error()));
        assert_eq!(registry.sorted()[0].name, "allowed");
    }
}
