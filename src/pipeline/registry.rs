//! Registration of extensions by id.

use super::traits::{ApiAnalyzer, Reporter};
use crate::config::{ConfigError, ExtensionSelection};
use crate::filter::TreeFilter;
use crate::model::Element;
use crate::transform::DifferenceTransform;
use indexmap::IndexMap;
use std::fmt;

/// The four kinds of extensions a pipeline is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    Analyzer,
    Filter,
    Transform,
    Reporter,
}

impl ExtensionKind {
    /// Name of the configuration section selecting extensions of this kind
    #[must_use]
    pub const fn section(&self) -> &'static str {
        match self {
            Self::Analyzer => "analyzers",
            Self::Filter => "filters",
            Self::Transform => "transforms",
            Self::Reporter => "reporters",
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analyzer => write!(f, "analyzer"),
            Self::Filter => write!(f, "filter"),
            Self::Transform => write!(f, "transform"),
            Self::Reporter => write!(f, "reporter"),
        }
    }
}

/// Extensions available to a pipeline, keyed by id in registration order.
///
/// Registering a second extension under an id already taken keeps the
/// first one; the conflict is reported when the engine is built.
pub struct ExtensionRegistry<E> {
    pub(crate) analyzers: IndexMap<String, Box<dyn ApiAnalyzer<E>>>,
    pub(crate) filters: IndexMap<String, Box<dyn TreeFilter<E>>>,
    pub(crate) transforms: IndexMap<String, Box<dyn DifferenceTransform<E>>>,
    pub(crate) reporters: IndexMap<String, Box<dyn Reporter<E>>>,
    pub(crate) conflicts: Vec<ConfigError>,
}

impl<E: Element> Default for ExtensionRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> ExtensionRegistry<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            analyzers: IndexMap::new(),
            filters: IndexMap::new(),
            transforms: IndexMap::new(),
            reporters: IndexMap::new(),
            conflicts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Box<dyn ApiAnalyzer<E>>) -> Self {
        let id = analyzer.extension_id().to_string();
        insert(&mut self.analyzers, &mut self.conflicts, ExtensionKind::Analyzer, id, analyzer);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Box<dyn TreeFilter<E>>) -> Self {
        let id = filter.extension_id().to_string();
        insert(&mut self.filters, &mut self.conflicts, ExtensionKind::Filter, id, filter);
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Box<dyn DifferenceTransform<E>>) -> Self {
        let id = transform.extension_id().to_string();
        insert(&mut self.transforms, &mut self.conflicts, ExtensionKind::Transform, id, transform);
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Box<dyn Reporter<E>>) -> Self {
        let id = reporter.extension_id().to_string();
        insert(&mut self.reporters, &mut self.conflicts, ExtensionKind::Reporter, id, reporter);
        self
    }

    /// Registered ids of one kind, in registration order
    pub fn ids(&self, kind: ExtensionKind) -> Vec<&str> {
        match kind {
            ExtensionKind::Analyzer => self.analyzers.keys().map(String::as_str).collect(),
            ExtensionKind::Filter => self.filters.keys().map(String::as_str).collect(),
            ExtensionKind::Transform => self.transforms.keys().map(String::as_str).collect(),
            ExtensionKind::Reporter => self.reporters.keys().map(String::as_str).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
            && self.filters.is_empty()
            && self.transforms.is_empty()
            && self.reporters.is_empty()
    }
}

fn insert<T: ?Sized>(
    map: &mut IndexMap<String, Box<T>>,
    conflicts: &mut Vec<ConfigError>,
    kind: ExtensionKind,
    id: String,
    extension: Box<T>,
) {
    if map.contains_key(&id) {
        conflicts.push(ConfigError::new(
            kind.section(),
            format!("{kind} '{id}' registered more than once"),
        ));
    } else {
        map.insert(id, extension);
    }
}

/// Take the selected extensions out of `registered`, in registration order.
///
/// Ids named by the selection but never registered are reported.
pub(crate) fn select<T: ?Sized>(
    kind: ExtensionKind,
    registered: IndexMap<String, Box<T>>,
    selection: &ExtensionSelection,
    errors: &mut Vec<ConfigError>,
) -> Vec<(String, Box<T>)> {
    for (list, ids) in [("include", &selection.include), ("exclude", &selection.exclude)] {
        for id in ids.iter().filter(|id| !registered.contains_key(*id)) {
            errors.push(ConfigError::new(
                format!("{}.{list}", kind.section()),
                format!("no {kind} registered as '{id}'"),
            ));
        }
    }
    registered
        .into_iter()
        .filter(|(id, _)| selection.is_selected(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{CollectingReporter, Extension};

    #[test]
    fn test_duplicate_ids_are_recorded() {
        let registry: ExtensionRegistry<String> = ExtensionRegistry::new()
            .with_reporter(Box::new(CollectingReporter::new("collect")))
            .with_reporter(Box::new(CollectingReporter::new("collect")));
        assert_eq!(registry.ids(ExtensionKind::Reporter), vec!["collect"]);
        assert_eq!(registry.conflicts.len(), 1);
        assert_eq!(registry.conflicts[0].field, "reporters");
    }

    #[test]
    fn test_select_reports_unknown_includes() {
        let registry: ExtensionRegistry<String> = ExtensionRegistry::new()
            .with_reporter(Box::new(CollectingReporter::new("a")))
            .with_reporter(Box::new(CollectingReporter::new("b")));

        let mut errors = Vec::new();
        let selected = select(
            ExtensionKind::Reporter,
            registry.reporters,
            &ExtensionSelection::only(["b", "c"]),
            &mut errors,
        );
        let ids: Vec<_> = selected.iter().map(|(id, r)| (id.as_str(), r.extension_id())).collect();
        assert_eq!(ids, vec![("b", "b")]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "reporters.include");
    }

    #[test]
    fn test_select_reports_unknown_excludes() {
        let registry: ExtensionRegistry<String> =
            ExtensionRegistry::new().with_reporter(Box::new(CollectingReporter::new("a")));

        let mut errors = Vec::new();
        let selected = select(
            ExtensionKind::Reporter,
            registry.reporters,
            &ExtensionSelection::default().excluding("typo"),
            &mut errors,
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "reporters.exclude");
        assert!(errors[0].message.contains("'typo'"), "{}", errors[0].message);
    }
}
