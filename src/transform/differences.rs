//! Configurable difference recipes.
//!
//! Recipes select differences by code, optionally narrowed by the display
//! names of the old and new elements, and then ignore, justify, reclassify or
//! annotate them. Values given at the top level of the configuration apply to
//! every recipe that does not set its own.
//!
//! ```yaml
//! justification: "Accepted for the 2.0 release"
//! differences:
//!   - code: "method.removed"
//!     old: "com\\.acme\\.internal\\..*"
//!     ignore: true
//!   - code: "field\\..*"
//!     regex: true
//!     classify:
//!       BINARY: NON_BREAKING
//!     criticality: documented
//! ```

use super::result::TransformationResult;
use super::traits::DifferenceTransform;
use crate::error::{ApiCompatError, ExtensionErrorKind, Result};
use crate::model::{
    CompatibilityType, Criticality, Difference, DifferenceSeverity, Element, ElementRef,
};
use crate::pipeline::{Extension, ExtensionContext};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level configuration of a [`DifferencesTransform`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DifferencesConfig {
    /// Discard matching differences unless a recipe says otherwise
    pub ignore: bool,
    pub justification: Option<String>,
    /// Classification overrides per compatibility type
    pub classify: BTreeMap<CompatibilityType, DifferenceSeverity>,
    /// Attachments merged into every matching difference
    pub attachments: BTreeMap<String, String>,
    /// Name of a declared criticality
    pub criticality: Option<String>,
    pub differences: Vec<DifferenceRecipe>,
}

/// One selection of differences and what to do with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DifferenceRecipe {
    /// Difference code, or a regex over codes when `regex` is set
    pub code: String,
    /// Treat `code` as a regular expression instead of an exact code.
    /// `old` and `new` are always regular expressions.
    pub regex: bool,
    /// Regex over the old element's display name
    pub old: Option<String>,
    /// Regex over the new element's display name
    pub new: Option<String>,
    pub ignore: Option<bool>,
    pub justification: Option<String>,
    pub classify: Option<BTreeMap<CompatibilityType, DifferenceSeverity>>,
    pub attachments: BTreeMap<String, String>,
    pub criticality: Option<String>,
}

#[derive(Debug, Clone)]
struct CompiledRecipe {
    code: Regex,
    old: Option<Regex>,
    new: Option<Regex>,
    ignore: bool,
    justification: Option<String>,
    classify: BTreeMap<CompatibilityType, DifferenceSeverity>,
    attachments: BTreeMap<String, String>,
    criticality: Option<Criticality>,
}

impl CompiledRecipe {
    fn matches<E: Element>(
        &self,
        old: Option<ElementRef<'_, E>>,
        new: Option<ElementRef<'_, E>>,
        difference: &Difference,
    ) -> bool {
        self.code.is_match(&difference.code)
            && side_matches(self.old.as_ref(), old)
            && side_matches(self.new.as_ref(), new)
    }

    fn apply(&self, difference: &Difference) -> TransformationResult {
        if self.ignore {
            return TransformationResult::Discard;
        }

        let mut changed = difference.clone();
        if let Some(justification) = &self.justification {
            changed.justification = Some(justification.clone());
        }
        for (&compatibility, &severity) in &self.classify {
            changed.classification.insert(compatibility, severity);
        }
        for (key, value) in &self.attachments {
            changed.attachments.insert(key.clone(), value.clone());
        }
        if let Some(criticality) = &self.criticality {
            changed.criticality = Some(criticality.clone());
        }
        TransformationResult::replace_if_changed(difference, changed)
    }
}

/// An element pattern only constrains present elements that are given.
fn side_matches<E: Element>(pattern: Option<&Regex>, element: Option<ElementRef<'_, E>>) -> bool {
    match (pattern, element) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(re), Some(element)) => re.is_match(&element.data().display_name()),
    }
}

/// Transform applying [`DifferenceRecipe`]s; the first matching recipe wins.
pub struct DifferencesTransform {
    id: String,
    recipes: Vec<CompiledRecipe>,
    patterns: Vec<Regex>,
}

impl DifferencesTransform {
    pub const DEFAULT_ID: &'static str = "api-compat.differences";

    /// Transform without recipes; it stays inert until configured
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            recipes: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Compile a configuration, resolving criticality names with `ctx`
    pub fn with_config(
        mut self,
        config: &DifferencesConfig,
        ctx: &ExtensionContext<'_>,
    ) -> Result<Self> {
        let mut recipes = Vec::with_capacity(config.differences.len());
        for recipe in &config.differences {
            recipes.push(self.compile(config, recipe, ctx)?);
        }
        self.patterns = recipes.iter().map(|r| r.code.clone()).collect();
        self.recipes = recipes;
        tracing::debug!(
            transform = %self.id,
            recipes = self.recipes.len(),
            "Configured difference recipes"
        );
        Ok(self)
    }

    #[must_use]
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    fn compile(
        &self,
        defaults: &DifferencesConfig,
        recipe: &DifferenceRecipe,
        ctx: &ExtensionContext<'_>,
    ) -> Result<CompiledRecipe> {
        let code = if recipe.regex {
            self.regex(&recipe.code)?
        } else {
            self.regex(&regex::escape(&recipe.code))?
        };
        let old = recipe.old.as_deref().map(|p| self.regex(p)).transpose()?;
        let new = recipe.new.as_deref().map(|p| self.regex(p)).transpose()?;

        let criticality = recipe
            .criticality
            .as_ref()
            .or(defaults.criticality.as_ref())
            .map(|name| {
                ctx.criticality(name).cloned().ok_or_else(|| {
                    ApiCompatError::extension(
                        &self.id,
                        "resolving recipe criticality",
                        ExtensionErrorKind::Configuration(format!(
                            "criticality '{name}' is not declared"
                        )),
                    )
                })
            })
            .transpose()?;

        let mut attachments = defaults.attachments.clone();
        attachments.extend(recipe.attachments.clone());

        Ok(CompiledRecipe {
            code,
            old,
            new,
            ignore: recipe.ignore.unwrap_or(defaults.ignore),
            justification: recipe
                .justification
                .clone()
                .or_else(|| defaults.justification.clone()),
            classify: recipe
                .classify
                .clone()
                .unwrap_or_else(|| defaults.classify.clone()),
            attachments,
            criticality,
        })
    }

    fn regex(&self, pattern: &str) -> Result<Regex> {
        Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            ApiCompatError::extension(
                &self.id,
                "compiling recipe patterns",
                ExtensionErrorKind::Configuration(format!("invalid regex '{pattern}': {e}")),
            )
        })
    }
}

impl Default for DifferencesTransform {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ID)
    }
}

impl Extension for DifferencesTransform {
    fn extension_id(&self) -> &str {
        &self.id
    }

    fn configure(&mut self, ctx: &ExtensionContext<'_>) -> Result<()> {
        let config: DifferencesConfig = ctx.config_or_default()?;
        let configured = Self::new(self.id.clone()).with_config(&config, ctx)?;
        *self = configured;
        Ok(())
    }
}

impl<E: Element> DifferenceTransform<E> for DifferencesTransform {
    fn code_patterns(&self) -> &[Regex] {
        &self.patterns
    }

    fn try_transform(
        &mut self,
        old: Option<ElementRef<'_, E>>,
        new: Option<ElementRef<'_, E>>,
        difference: &Difference,
    ) -> Result<TransformationResult> {
        Ok(self
            .recipes
            .iter()
            .find(|recipe| recipe.matches(old, new, difference))
            .map_or(TransformationResult::Keep, |recipe| recipe.apply(difference)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiSide, CriticalityRegistry, ElementForest, SeverityMapping, SimpleElement};
    use serde_json::json;

    fn configure(value: serde_json::Value) -> Result<DifferencesTransform> {
        let criticalities = CriticalityRegistry::default();
        let mapping = SeverityMapping::default();
        let ctx = ExtensionContext::new(
            DifferencesTransform::DEFAULT_ID,
            Some(&value),
            &criticalities,
            &mapping,
        );
        let mut transform = DifferencesTransform::default();
        transform.configure(&ctx)?;
        Ok(transform)
    }

    fn apply(
        transform: &mut DifferencesTransform,
        old: Option<ElementRef<'_, SimpleElement>>,
        difference: &Difference,
    ) -> TransformationResult {
        transform.try_transform(old, None, difference).unwrap()
    }

    #[test]
    fn test_exact_code_is_not_a_regex() {
        let mut transform = configure(json!({
            "differences": [{ "code": "method.removed", "ignore": true }]
        }))
        .unwrap();
        assert_eq!(
            apply(&mut transform, None, &Difference::new("method.removed", "removed")),
            TransformationResult::Discard
        );
        assert_eq!(
            apply(&mut transform, None, &Difference::new("methodXremoved", "removed")),
            TransformationResult::Keep
        );
    }

    #[test]
    fn test_bulk_defaults_apply_to_recipes() {
        let mut transform = configure(json!({
            "justification": "accepted",
            "classify": { "BINARY": "NON_BREAKING" },
            "attachments": { "ticket": "API-1" },
            "differences": [
                { "code": "field\\..*", "regex": true, "attachments": { "owner": "core" } }
            ]
        }))
        .unwrap();

        let original = Difference::new("field.removed", "removed")
            .with_classification(CompatibilityType::Binary, DifferenceSeverity::Breaking);
        let TransformationResult::Replace(result) = apply(&mut transform, None, &original) else {
            panic!("expected a replacement");
        };
        let changed = &result[0];
        assert_eq!(changed.justification.as_deref(), Some("accepted"));
        assert_eq!(
            changed.severity(CompatibilityType::Binary),
            Some(DifferenceSeverity::NonBreaking)
        );
        assert_eq!(changed.attachments["ticket"], "API-1");
        assert_eq!(changed.attachments["owner"], "core");

        // Second application leaves the result alone.
        assert_eq!(apply(&mut transform, None, changed), TransformationResult::Keep);
    }

    #[test]
    fn test_element_patterns_are_regexes_with_exact_code() {
        let mut forest = ElementForest::new(ApiSide::Old);
        let internal = forest.insert_root(SimpleElement::new("com.acme.internal.Impl"));
        let public = forest.insert_root(SimpleElement::new("com.acme.Api"));
        let mut transform = configure(json!({
            "differences": [{
                "code": "class.removed",
                "old": "com\\.acme\\.internal\\..*",
                "ignore": true
            }]
        }))
        .unwrap();

        let difference = Difference::new("class.removed", "removed");
        assert_eq!(
            apply(&mut transform, forest.get(internal), &difference),
            TransformationResult::Discard
        );
        assert_eq!(
            apply(&mut transform, forest.get(public), &difference),
            TransformationResult::Keep
        );
        assert_eq!(apply(&mut transform, None, &difference), TransformationResult::Keep);
    }

    #[test]
    fn test_criticality_is_resolved() {
        let mut transform = configure(json!({
            "differences": [{ "code": "c", "criticality": "documented" }]
        }))
        .unwrap();
        let TransformationResult::Replace(result) =
            apply(&mut transform, None, &Difference::new("c", "c"))
        else {
            panic!("expected a replacement");
        };
        assert_eq!(result[0].criticality, Some(Criticality::documented()));
    }

    #[test]
    fn test_unknown_criticality_fails_configuration() {
        let err = configure(json!({
            "differences": [{ "code": "c", "criticality": "catastrophic" }]
        }))
        .err()
        .unwrap();
        assert!(err.to_string().contains(DifferencesTransform::DEFAULT_ID));
    }

    #[test]
    fn test_invalid_regex_fails_configuration() {
        assert!(configure(json!({
            "differences": [{ "code": "(", "regex": true }]
        }))
        .is_err());
    }
}
