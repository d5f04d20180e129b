//! Running all registered tree filters over a forest.

use super::result::{FilterFinishResult, FilterStartResult};
use super::ternary::Ternary;
use super::traits::TreeFilter;
use crate::error::{ErrorContext, Result};
use crate::model::{Element, ElementForest, ElementId, ElementRef};
use std::collections::HashMap;

/// Combined verdict of all filters for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub matches: Ternary,
    pub descend: Ternary,
}

/// Verdicts for one forest, scoped to a single traversal.
#[derive(Debug, Clone, Default)]
pub struct FilterVerdicts {
    verdicts: HashMap<ElementId, Verdict>,
    permissive: bool,
}

impl FilterVerdicts {
    /// Verdicts accepting every element
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            verdicts: HashMap::new(),
            permissive: true,
        }
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<Verdict> {
        self.verdicts.get(&id).copied()
    }

    /// Whether the element passed every filter
    #[must_use]
    pub fn is_included(&self, id: ElementId) -> bool {
        self.permissive || self.get(id).is_some_and(|v| v.matches.is_true())
    }

    /// Whether the element's children take part in the traversal
    #[must_use]
    pub fn should_descend(&self, id: ElementId) -> bool {
        self.permissive || self.get(id).is_some_and(|v| !v.descend.is_false())
    }

    #[must_use]
    pub const fn is_permissive(&self) -> bool {
        self.permissive
    }

    /// Number of evaluated elements that were included
    #[must_use]
    pub fn included_count(&self) -> usize {
        self.verdicts.values().filter(|v| v.matches.is_true()).count()
    }

    /// Number of evaluated elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

/// Ordered set of tree filters applied as one.
///
/// Matches of the individual filters are combined with AND, descend
/// decisions favor descending. An empty registry accepts everything.
pub struct FilterRegistry<E> {
    filters: Vec<Box<dyn TreeFilter<E>>>,
}

impl<E: Element> Default for FilterRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> FilterRegistry<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Box<dyn TreeFilter<E>>) -> Self {
        self.push(filter);
        self
    }

    pub fn push(&mut self, filter: Box<dyn TreeFilter<E>>) {
        self.filters.push(filter);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn TreeFilter<E>>> {
        self.filters.iter_mut()
    }

    /// Combined start verdict of all filters
    pub fn start(&mut self, element: ElementRef<'_, E>) -> Result<FilterStartResult> {
        let mut combined: Option<FilterStartResult> = None;
        for filter in &mut self.filters {
            let result = filter
                .start(element)
                .with_context(|| format!("filter '{}' starting element", filter.extension_id()))?;
            combined = Some(combined.map_or(result, |c| c.and(result)));
        }
        Ok(combined.unwrap_or_else(FilterStartResult::match_and_descend))
    }

    /// Combined finish verdict of all filters
    pub fn finish(&mut self, element: ElementRef<'_, E>) -> Result<FilterFinishResult> {
        let finishes = self.finish_each(element)?;
        Ok(finishes
            .into_iter()
            .reduce(FilterFinishResult::and)
            .unwrap_or_else(FilterFinishResult::matches))
    }

    fn finish_each(&mut self, element: ElementRef<'_, E>) -> Result<Vec<FilterFinishResult>> {
        self.filters
            .iter_mut()
            .map(|filter| {
                filter.finish(element).with_context(|| {
                    format!("filter '{}' finishing element", filter.extension_id())
                })
            })
            .collect()
    }

    /// Late resolutions of all filters, combined per element
    pub fn finish_all(&mut self) -> Result<HashMap<ElementId, FilterFinishResult>> {
        let mut merged: HashMap<ElementId, FilterFinishResult> = HashMap::new();
        for filter in &mut self.filters {
            let resolved = filter
                .finish_all()
                .with_context(|| format!("filter '{}' finishing forest", filter.extension_id()))?;
            for (id, result) in resolved {
                merged
                    .entry(id)
                    .and_modify(|existing| *existing = existing.and(result))
                    .or_insert(result);
            }
        }
        Ok(merged)
    }

    /// Run the complete two-pass protocol over a forest.
    ///
    /// Children of an element whose combined descend verdict is `False` are
    /// not visited and get no verdict, so they count as excluded.
    pub fn evaluate(&mut self, forest: &ElementForest<E>) -> Result<FilterVerdicts> {
        if self.filters.is_empty() {
            return Ok(FilterVerdicts::permissive());
        }

        let mut finishes: HashMap<ElementId, Vec<FilterFinishResult>> = HashMap::new();
        let mut descends: HashMap<ElementId, Ternary> = HashMap::new();
        for root in forest.roots() {
            self.visit(root, &mut finishes, &mut descends)?;
        }

        for (index, filter) in self.filters.iter_mut().enumerate() {
            let resolved = filter
                .finish_all()
                .with_context(|| format!("filter '{}' finishing forest", filter.extension_id()))?;
            for (id, result) in resolved {
                if let Some(per_filter) = finishes.get_mut(&id) {
                    per_filter[index] = result;
                }
            }
        }

        let verdicts = finishes
            .into_iter()
            .map(|(id, per_filter)| {
                let matches = per_filter
                    .into_iter()
                    .reduce(FilterFinishResult::and)
                    .map_or(Ternary::True, |r| r.matches);
                let descend = descends.get(&id).copied().unwrap_or(Ternary::False);
                (id, Verdict { matches, descend })
            })
            .collect();

        Ok(FilterVerdicts {
            verdicts,
            permissive: false,
        })
    }

    fn visit(
        &mut self,
        element: ElementRef<'_, E>,
        finishes: &mut HashMap<ElementId, Vec<FilterFinishResult>>,
        descends: &mut HashMap<ElementId, Ternary>,
    ) -> Result<()> {
        let start = self.start(element)?;
        descends.insert(element.id(), start.descend);
        if !start.descend.is_false() {
            for child in element.children() {
                self.visit(child, finishes, descends)?;
            }
        }
        let per_filter = self.finish_each(element)?;
        finishes.insert(element.id(), per_filter);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiSide, SimpleElement};
    use crate::pipeline::Extension;
    use std::collections::HashSet;

    /// Rejects elements by name, optionally without descending into them
    struct RejectNamed {
        name: &'static str,
        descend: bool,
    }

    impl Extension for RejectNamed {
        fn extension_id(&self) -> &str {
            "test.reject"
        }
    }

    impl TreeFilter<SimpleElement> for RejectNamed {
        fn start(&mut self, element: ElementRef<'_, SimpleElement>) -> Result<FilterStartResult> {
            if element.data().name == self.name {
                Ok(FilterStartResult::direct(
                    Ternary::False,
                    Ternary::from_bool(self.descend),
                ))
            } else {
                Ok(FilterStartResult::match_and_descend())
            }
        }

        fn finish(&mut self, element: ElementRef<'_, SimpleElement>) -> Result<FilterFinishResult> {
            Ok(FilterFinishResult::direct(Ternary::from_bool(
                element.data().name != self.name,
            )))
        }

        fn finish_all(&mut self) -> Result<HashMap<ElementId, FilterFinishResult>> {
            Ok(HashMap::new())
        }
    }

    /// Leaves every element undecided until the whole forest was seen,
    /// then includes the elements whose names were referenced anywhere.
    #[derive(Default)]
    struct ReferencedOnly {
        seen: Vec<(ElementId, String)>,
        references: HashSet<String>,
    }

    impl Extension for ReferencedOnly {
        fn extension_id(&self) -> &str {
            "test.referenced"
        }
    }

    impl TreeFilter<SimpleElement> for ReferencedOnly {
        fn start(&mut self, element: ElementRef<'_, SimpleElement>) -> Result<FilterStartResult> {
            if let Some(target) = element.data().name.strip_prefix("ref:") {
                self.references.insert(target.to_string());
            }
            self.seen.push((element.id(), element.data().name.clone()));
            Ok(FilterStartResult::direct(Ternary::Undecided, Ternary::True))
        }

        fn finish(
            &mut self,
            _element: ElementRef<'_, SimpleElement>,
        ) -> Result<FilterFinishResult> {
            Ok(FilterFinishResult::direct(Ternary::Undecided))
        }

        fn finish_all(&mut self) -> Result<HashMap<ElementId, FilterFinishResult>> {
            let references = std::mem::take(&mut self.references);
            Ok(self
                .seen
                .drain(..)
                .map(|(id, name)| {
                    let referenced = references.contains(&name) || name.starts_with("ref:");
                    (id, FilterFinishResult::direct(Ternary::from_bool(referenced)))
                })
                .collect())
        }
    }

    fn forest() -> (ElementForest<SimpleElement>, HashMap<&'static str, ElementId>) {
        let mut forest = ElementForest::new(ApiSide::Old);
        let mut ids = HashMap::new();
        let a = forest.insert_root(SimpleElement::new("a"));
        ids.insert("a", a);
        ids.insert("a1", forest.insert_child(a, SimpleElement::new("a1")));
        let b = forest.insert_root(SimpleElement::new("b"));
        ids.insert("b", b);
        ids.insert("b1", forest.insert_child(b, SimpleElement::new("b1")));
        ids.insert("ref:a1", forest.insert_root(SimpleElement::new("ref:a1")));
        (forest, ids)
    }

    #[test]
    fn test_empty_registry_is_permissive() {
        let (forest, ids) = forest();
        let verdicts = FilterRegistry::new().evaluate(&forest).unwrap();
        assert!(verdicts.is_permissive());
        assert!(verdicts.is_included(ids["b1"]));
        assert!(verdicts.should_descend(ids["b"]));
    }

    #[test]
    fn test_non_descending_rejection_hides_subtree() {
        let (forest, ids) = forest();
        let mut registry = FilterRegistry::new().with_filter(Box::new(RejectNamed {
            name: "b",
            descend: false,
        }));
        let verdicts = registry.evaluate(&forest).unwrap();
        assert!(verdicts.is_included(ids["a"]));
        assert!(verdicts.is_included(ids["a1"]));
        assert!(!verdicts.is_included(ids["b"]));
        assert!(!verdicts.should_descend(ids["b"]));
        assert!(verdicts.get(ids["b1"]).is_none());
        assert!(!verdicts.is_included(ids["b1"]));
    }

    #[test]
    fn test_descend_wins_across_filters() {
        let (forest, ids) = forest();
        let mut registry = FilterRegistry::new()
            .with_filter(Box::new(RejectNamed {
                name: "b",
                descend: false,
            }))
            .with_filter(Box::new(RejectNamed {
                name: "b",
                descend: true,
            }));
        let verdicts = registry.evaluate(&forest).unwrap();
        assert!(verdicts.should_descend(ids["b"]));
        assert!(!verdicts.is_included(ids["b"]));
        assert!(verdicts.is_included(ids["b1"]));
    }

    #[test]
    fn test_global_finish_resolves_undecided() {
        let (forest, ids) = forest();
        let mut registry = FilterRegistry::new().with_filter(Box::new(ReferencedOnly::default()));
        let verdicts = registry.evaluate(&forest).unwrap();
        assert!(verdicts.is_included(ids["a1"]));
        assert!(verdicts.is_included(ids["ref:a1"]));
        assert!(!verdicts.is_included(ids["a"]));
        assert!(!verdicts.is_included(ids["b1"]));
        assert_eq!(verdicts.included_count(), 2);
        assert_eq!(verdicts.len(), 5);
    }

    #[test]
    fn test_all_filters_must_match() {
        let (forest, ids) = forest();
        let mut registry = FilterRegistry::new()
            .with_filter(Box::new(ReferencedOnly::default()))
            .with_filter(Box::new(RejectNamed {
                name: "a1",
                descend: true,
            }));
        let verdicts = registry.evaluate(&forest).unwrap();
        assert!(!verdicts.is_included(ids["a1"]));
        assert!(verdicts.is_included(ids["ref:a1"]));
    }

    #[test]
    fn test_start_and_finish_combine() {
        let (forest, ids) = forest();
        let mut registry = FilterRegistry::new().with_filter(Box::new(RejectNamed {
            name: "a",
            descend: false,
        }));
        let a = forest.get(ids["a"]).unwrap();
        assert_eq!(registry.start(a).unwrap(), FilterStartResult::doesnt_match());
        assert_eq!(registry.finish(a).unwrap(), FilterFinishResult::doesnt_match());
        assert!(registry.finish_all().unwrap().is_empty());
    }
}
