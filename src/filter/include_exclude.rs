//! Regex-based include/exclude filter with parent inheritance.
//!
//! An element's verdict is derived from its own include/exclude matches and
//! the verdict of its parent: children of an included element are included
//! unless excluded, children of an excluded element stay excluded unless
//! explicitly included.

use super::result::{FilterFinishResult, FilterStartResult};
use super::ternary::Ternary;
use super::traits::TreeFilter;
use crate::error::{ApiCompatError, ExtensionErrorKind, Result};
use crate::model::{Element, ElementId, ElementRef};
use crate::pipeline::{Extension, ExtensionContext};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration of an [`IncludeExcludeFilter`].
///
/// Patterns must match an element's whole display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IncludeExcludeConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Tree filter including or excluding elements by display name.
///
/// Without any patterns every element stays undecided, and undecided
/// elements are not analyzed: an unconfigured filter selects nothing.
pub struct IncludeExcludeFilter {
    id: String,
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    progress: HashMap<ElementId, FilterStartResult>,
}

impl IncludeExcludeFilter {
    /// Create a filter, compiling all patterns up front
    pub fn new(id: impl Into<String>, config: &IncludeExcludeConfig) -> Result<Self> {
        let id = id.into();
        let include = compile_all(&id, &config.include)?;
        let exclude = compile_all(&id, &config.exclude)?;
        Ok(Self {
            id,
            include,
            exclude,
            progress: HashMap::new(),
        })
    }

    fn matches(patterns: &[Regex], name: &str) -> Option<FilterStartResult> {
        if patterns.is_empty() {
            return None;
        }
        let hit = patterns.iter().any(|re| re.is_match(name));
        Some(FilterStartResult::direct(Ternary::from_bool(hit), Ternary::True))
    }

    fn compute(
        include: Option<FilterStartResult>,
        exclude: Option<FilterStartResult>,
        parent: Option<FilterStartResult>,
    ) -> FilterStartResult {
        let not_excluded = exclude.map(FilterStartResult::negate_match);
        match parent {
            None => match (include, not_excluded) {
                (None, None) => FilterStartResult::default_result(),
                (None, Some(e)) => e.with_inherited(true),
                (Some(i), None) => i,
                (Some(i), Some(e)) => i.and(e),
            },
            Some(parent) => {
                let inherited = FilterStartResult::inherit(parent);
                match (include, not_excluded) {
                    (None, None) => inherited,
                    (None, Some(e)) => inherited.and(e),
                    (Some(i), None) => inherited.or(i),
                    (Some(i), Some(e)) => {
                        if parent.matches.to_bool(true) {
                            inherited.and(e)
                        } else {
                            i.and(e)
                        }
                    }
                }
            }
        }
    }
}

fn compile_all(id: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(&format!("^(?:{p})$")).map_err(|e| {
                ApiCompatError::extension(
                    id,
                    "compiling filter patterns",
                    ExtensionErrorKind::Configuration(format!("invalid regex '{p}': {e}")),
                )
            })
        })
        .collect()
}

impl Extension for IncludeExcludeFilter {
    fn extension_id(&self) -> &str {
        &self.id
    }

    fn configure(&mut self, ctx: &ExtensionContext<'_>) -> Result<()> {
        if let Some(config) = ctx.config::<IncludeExcludeConfig>()? {
            *self = Self::new(self.id.clone(), &config)?;
        }
        if self.include.is_empty() && self.exclude.is_empty() {
            tracing::debug!(
                filter = %self.id,
                "No include or exclude patterns, no element will be selected"
            );
        }
        Ok(())
    }
}

impl<E: Element> TreeFilter<E> for IncludeExcludeFilter {
    fn start(&mut self, element: ElementRef<'_, E>) -> Result<FilterStartResult> {
        let name = element.data().display_name();
        let parent = element
            .parent()
            .and_then(|p| self.progress.get(&p.id()).copied());
        let result = Self::compute(
            Self::matches(&self.include, &name),
            Self::matches(&self.exclude, &name),
            parent,
        );
        self.progress.insert(element.id(), result);
        Ok(result)
    }

    fn finish(&mut self, element: ElementRef<'_, E>) -> Result<FilterFinishResult> {
        Ok(self
            .progress
            .remove(&element.id())
            .map_or_else(FilterFinishResult::default_result, FilterFinishResult::from_start))
    }

    fn finish_all(&mut self) -> Result<HashMap<ElementId, FilterFinishResult>> {
        self.progress.clear();
        Ok(HashMap::new())
    }
}
