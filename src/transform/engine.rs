//! Fixpoint application of difference transforms to a report.
//!
//! Each report is scanned repeatedly until a full pass leaves its list of
//! differences unchanged. Replacements are spliced in at the position of
//! the difference they replace and are reconsidered in the same pass.
//!
//! Transforms are grouped into steps. A transform outside any
//! transformation block is a step of its own; a block is a single step
//! whose members run in block order on the evolving output, so no other
//! transform observes the intermediate results.

use super::result::TransformationResult;
use super::traits::DifferenceTransform;
use crate::config::{
    DEFAULT_MAX_TRANSFORM_ITERATIONS, IterationLimitPolicy, OSCILLATION_WARNING_THRESHOLD,
};
use crate::error::{ApiCompatError, Result, TransformErrorKind};
use crate::model::{Difference, Element, ElementRef, Pairing, Report};
use crate::pipeline::CancellationToken;
use std::collections::HashMap;

/// Bounds of the fixpoint loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformLimits {
    /// Maximum number of passes over one report, also the maximum chain of
    /// rewrites of one difference within a pass
    pub max_iterations: usize,
    /// Pass count after which oscillation is reported
    pub warn_after: usize,
    /// What to do when `max_iterations` is reached
    pub on_limit: IterationLimitPolicy,
}

impl Default for TransformLimits {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_TRANSFORM_ITERATIONS,
            warn_after: OSCILLATION_WARNING_THRESHOLD,
            on_limit: IterationLimitPolicy::KeepLastState,
        }
    }
}

/// Summary of stabilizing one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizeOutcome {
    /// Number of passes performed
    pub iterations: usize,
    /// False when the iteration limit stopped the loop
    pub converged: bool,
}

#[derive(Debug, Clone)]
struct Step {
    members: Vec<usize>,
}

enum StepResult {
    Unchanged,
    Changed(Vec<Difference>),
}

/// Applies registered transforms to reports until they are stable.
pub struct TransformEngine<E> {
    transforms: Vec<Box<dyn DifferenceTransform<E>>>,
    steps: Vec<Step>,
    limits: TransformLimits,
    /// Applicable steps per difference code, valid for one comparison run
    code_cache: HashMap<String, Vec<usize>>,
}

impl<E: Element> TransformEngine<E> {
    /// Engine without transformation blocks
    #[must_use]
    pub fn new(transforms: Vec<Box<dyn DifferenceTransform<E>>>) -> Self {
        let steps = (0..transforms.len())
            .map(|i| Step { members: vec![i] })
            .collect();
        Self {
            transforms,
            steps,
            limits: TransformLimits::default(),
            code_cache: HashMap::new(),
        }
    }

    /// Group transforms into blocks given as ordered lists of extension ids.
    ///
    /// A block takes the position of its first registered member. Ids that
    /// are not registered or appear in more than one block are rejected.
    pub fn with_blocks(mut self, blocks: &[Vec<String>]) -> Result<Self> {
        let index_of: HashMap<&str, usize> = self
            .transforms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.extension_id(), i))
            .collect();

        let mut block_of: HashMap<usize, usize> = HashMap::new();
        let mut members: Vec<Vec<usize>> = Vec::with_capacity(blocks.len());
        for (b, block) in blocks.iter().enumerate() {
            let mut resolved = Vec::with_capacity(block.len());
            for id in block {
                let Some(&index) = index_of.get(id.as_str()) else {
                    return Err(ApiCompatError::config(format!(
                        "transformation block {b} names unknown transform '{id}'"
                    )));
                };
                if block_of.insert(index, b).is_some() {
                    return Err(ApiCompatError::config(format!(
                        "transform '{id}' belongs to more than one transformation block"
                    )));
                }
                resolved.push(index);
            }
            members.push(resolved);
        }

        let mut placed = vec![false; members.len()];
        let mut steps = Vec::new();
        for index in 0..self.transforms.len() {
            match block_of.get(&index) {
                Some(&b) if !placed[b] => {
                    placed[b] = true;
                    steps.push(Step {
                        members: members[b].clone(),
                    });
                }
                Some(_) => {}
                None => steps.push(Step {
                    members: vec![index],
                }),
            }
        }
        self.steps = steps;
        self.code_cache.clear();
        Ok(self)
    }

    #[must_use]
    pub const fn with_limits(mut self, limits: TransformLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub const fn limits(&self) -> TransformLimits {
        self.limits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn transforms_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn DifferenceTransform<E>>> {
        self.transforms.iter_mut()
    }

    /// Forget cached code lookups; called at the start of every comparison
    pub fn reset(&mut self) {
        self.code_cache.clear();
    }

    pub fn start_traversal(&mut self) {
        for transform in &mut self.transforms {
            transform.start_traversal();
        }
    }

    pub fn start_elements(&mut self, elements: Pairing<ElementRef<'_, E>>) {
        for transform in &mut self.transforms {
            transform.start_elements(elements);
        }
    }

    pub fn end_elements(&mut self, elements: Pairing<ElementRef<'_, E>>) {
        for transform in &mut self.transforms {
            transform.end_elements(elements);
        }
    }

    pub fn end_traversal(&mut self) {
        for transform in &mut self.transforms {
            transform.end_traversal();
        }
    }

    fn steps_for(&mut self, code: &str) -> Vec<usize> {
        if let Some(steps) = self.code_cache.get(code) {
            return steps.clone();
        }
        let applicable: Vec<usize> = self
            .steps
            .iter()
            .enumerate()
            .filter(|(_, step)| {
                step.members
                    .iter()
                    .any(|&m| self.transforms[m].applies_to(code))
            })
            .map(|(i, _)| i)
            .collect();
        self.code_cache.insert(code.to_string(), applicable.clone());
        applicable
    }

    fn invoke(
        &mut self,
        member: usize,
        old: Option<ElementRef<'_, E>>,
        new: Option<ElementRef<'_, E>>,
        difference: &Difference,
    ) -> TransformationResult {
        let transform = &mut self.transforms[member];
        match transform.try_transform(old, new, difference) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    transform = transform.extension_id(),
                    code = %difference.code,
                    error = %err,
                    "Transform failed, keeping difference"
                );
                TransformationResult::Keep
            }
        }
    }

    /// Run one step on a difference; members see the output of their predecessors
    fn apply_step(
        &mut self,
        step: usize,
        old: Option<ElementRef<'_, E>>,
        new: Option<ElementRef<'_, E>>,
        difference: &Difference,
    ) -> StepResult {
        let members = self.steps[step].members.clone();
        let mut current = vec![difference.clone()];
        for member in members {
            let mut next = Vec::with_capacity(current.len());
            for diff in current {
                if !self.transforms[member].applies_to(&diff.code) {
                    next.push(diff);
                    continue;
                }
                match self.invoke(member, old, new, &diff) {
                    TransformationResult::Keep | TransformationResult::Undecided => next.push(diff),
                    TransformationResult::Discard => {}
                    TransformationResult::Replace(replacements) => next.extend(replacements),
                }
            }
            current = next;
        }

        if current.len() == 1 && current[0] == *difference {
            StepResult::Unchanged
        } else {
            StepResult::Changed(current)
        }
    }

    /// Transform a report's differences until a full pass changes nothing.
    pub fn stabilize(
        &mut self,
        report: &mut Report<'_, E>,
        cancel: &CancellationToken,
    ) -> Result<StabilizeOutcome> {
        let (old, new) = report.elements().into_options();
        // Each entry remembers how many rewrites in the current pass produced it.
        let mut list: Vec<(Difference, usize)> =
            report.take_differences().into_iter().map(|d| (d, 0)).collect();

        let max = self.limits.max_iterations.max(1);
        let mut iterations = 0;
        let mut warned = false;
        let converged = loop {
            cancel.check()?;
            if iterations >= max {
                match self.limits.on_limit {
                    IterationLimitPolicy::KeepLastState => {
                        tracing::warn!(
                            iterations,
                            differences = list.len(),
                            "Transformations did not stabilize, keeping last state"
                        );
                        break false;
                    }
                    IterationLimitPolicy::Fail => {
                        return Err(ApiCompatError::transform(
                            "stabilizing report",
                            TransformErrorKind::IterationLimitExceeded { iterations },
                        ));
                    }
                }
            }
            iterations += 1;
            if iterations > self.limits.warn_after && !warned {
                warned = true;
                tracing::warn!(
                    iterations,
                    "Transformations still changing the report, transforms are likely oscillating"
                );
            }

            let mut changed = false;
            let mut i = 0;
            while i < list.len() {
                let depth = list[i].1;
                if depth >= max {
                    // Rewrite chain too long for one pass; revisit next pass.
                    changed = true;
                    i += 1;
                    continue;
                }

                let mut replacement = None;
                for step in self.steps_for(&list[i].0.code) {
                    if let StepResult::Changed(result) =
                        self.apply_step(step, old, new, &list[i].0)
                    {
                        replacement = Some(result);
                        break;
                    }
                }

                match replacement {
                    None => i += 1,
                    Some(result) => {
                        changed = true;
                        list.splice(i..=i, result.into_iter().map(|d| (d, depth + 1)));
                    }
                }
            }

            for entry in &mut list {
                entry.1 = 0;
            }
            if !changed {
                break true;
            }
        };

        if iterations > 1 {
            tracing::debug!(iterations, converged, "Report stabilized");
        }
        report.set_differences(list.into_iter().map(|(d, _)| d).collect());
        Ok(StabilizeOutcome {
            iterations,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ApiSide, CompatibilityType, DifferenceSeverity, ElementForest, Pairing, SimpleElement,
    };
    use crate::pipeline::Extension;
    use regex::Regex;

    /// Sets one compatibility type to a fixed severity for matching codes
    struct Reclassify {
        id: &'static str,
        patterns: Vec<Regex>,
        compatibility: CompatibilityType,
        severity: DifferenceSeverity,
    }

    impl Reclassify {
        fn new(
            id: &'static str,
            code: &str,
            compatibility: CompatibilityType,
            severity: DifferenceSeverity,
        ) -> Self {
            Self {
                id,
                patterns: vec![Regex::new(&format!("^{}$", regex::escape(code))).unwrap()],
                compatibility,
                severity,
            }
        }
    }

    impl Extension for Reclassify {
        fn extension_id(&self) -> &str {
            self.id
        }
    }

    impl DifferenceTransform<SimpleElement> for Reclassify {
        fn code_patterns(&self) -> &[Regex] {
            &self.patterns
        }

        fn try_transform(
            &mut self,
            _old: Option<ElementRef<'_, SimpleElement>>,
            _new: Option<ElementRef<'_, SimpleElement>>,
            difference: &Difference,
        ) -> Result<TransformationResult> {
            let changed = difference
                .clone()
                .with_classification(self.compatibility, self.severity);
            Ok(TransformationResult::replace_if_changed(difference, changed))
        }
    }

    /// Fixed result for every matching difference
    struct Always {
        id: &'static str,
        patterns: Vec<Regex>,
        result: std::result::Result<TransformationResult, String>,
        calls: usize,
    }

    impl Always {
        fn new(
            id: &'static str,
            result: std::result::Result<TransformationResult, String>,
        ) -> Self {
            Self {
                id,
                patterns: vec![Regex::new(".*").unwrap()],
                result,
                calls: 0,
            }
        }
    }

    impl Extension for Always {
        fn extension_id(&self) -> &str {
            self.id
        }
    }

    impl DifferenceTransform<SimpleElement> for Always {
        fn code_patterns(&self) -> &[Regex] {
            &self.patterns
        }

        fn try_transform(
            &mut self,
            _old: Option<ElementRef<'_, SimpleElement>>,
            _new: Option<ElementRef<'_, SimpleElement>>,
            _difference: &Difference,
        ) -> Result<TransformationResult> {
            self.calls += 1;
            self.result
                .clone()
                .map_err(|msg| ApiCompatError::extension_failure(self.id, msg))
        }
    }

    /// Splits `split` into `a` and `b`
    struct Splitter {
        patterns: Vec<Regex>,
    }

    impl Extension for Splitter {
        fn extension_id(&self) -> &str {
            "test.split"
        }
    }

    impl DifferenceTransform<SimpleElement> for Splitter {
        fn code_patterns(&self) -> &[Regex] {
            &self.patterns
        }

        fn try_transform(
            &mut self,
            _old: Option<ElementRef<'_, SimpleElement>>,
            _new: Option<ElementRef<'_, SimpleElement>>,
            _difference: &Difference,
        ) -> Result<TransformationResult> {
            Ok(TransformationResult::replace_with([
                Difference::new("a", "first half"),
                Difference::new("b", "second half"),
            ]))
        }
    }

    fn forest() -> ElementForest<SimpleElement> {
        let mut forest = ElementForest::new(ApiSide::New);
        forest.insert_root(SimpleElement::new("m"));
        forest
    }

    fn report<'f>(
        forest: &'f ElementForest<SimpleElement>,
        differences: Vec<Difference>,
    ) -> Report<'f, SimpleElement> {
        let element = forest.roots().next().unwrap();
        Report::new(Pairing::Right(element)).with_differences(differences)
    }

    fn other(severity: DifferenceSeverity) -> Difference {
        Difference::new("c", "changed").with_classification(CompatibilityType::Other, severity)
    }

    fn toggles() -> Vec<Box<dyn DifferenceTransform<SimpleElement>>> {
        vec![
            Box::new(Reclassify::new(
                "b",
                "c",
                CompatibilityType::Other,
                DifferenceSeverity::Breaking,
            )),
            Box::new(Reclassify::new(
                "nb",
                "c",
                CompatibilityType::Other,
                DifferenceSeverity::NonBreaking,
            )),
        ]
    }

    #[test]
    fn test_reclassification_reaches_fixpoint() {
        let forest = forest();
        let mut report = report(
            &forest,
            vec![Difference::new("c", "changed").with_classification(
                CompatibilityType::Source,
                DifferenceSeverity::PotentiallyBreaking,
            )],
        );
        let mut engine = TransformEngine::new(vec![Box::new(Reclassify::new(
            "upgrade",
            "c",
            CompatibilityType::Source,
            DifferenceSeverity::Breaking,
        ))]);

        let outcome = engine
            .stabilize(&mut report, &CancellationToken::new())
            .unwrap();
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(report.differences().len(), 1);
        assert_eq!(
            report.differences()[0].severity(CompatibilityType::Source),
            Some(DifferenceSeverity::Breaking)
        );
    }

    #[test]
    fn test_stabilized_report_is_left_untouched() {
        let forest = forest();
        let mut engine = TransformEngine::new(toggles())
            .with_blocks(&[vec!["b".to_string(), "nb".to_string()]])
            .unwrap();

        let mut report = report(&forest, vec![other(DifferenceSeverity::Breaking)]);
        engine.stabilize(&mut report, &CancellationToken::new()).unwrap();
        let stable = report.differences().to_vec();

        let outcome = engine.stabilize(&mut report, &CancellationToken::new()).unwrap();
        assert_eq!(outcome.iterations, 1);
        assert_eq!(report.differences(), stable.as_slice());
    }

    #[test]
    fn test_block_prevents_ping_pong() {
        let forest = forest();
        let mut engine = TransformEngine::new(toggles())
            .with_blocks(&[vec!["b".to_string(), "nb".to_string()]])
            .unwrap();
        let mut report = report(&forest, vec![other(DifferenceSeverity::NonBreaking)]);

        let outcome = engine.stabilize(&mut report, &CancellationToken::new()).unwrap();
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(
            report.differences()[0].severity(CompatibilityType::Other),
            Some(DifferenceSeverity::NonBreaking)
        );
    }

    #[test]
    fn test_oscillation_stops_at_limit() {
        let forest = forest();
        let mut engine = TransformEngine::new(toggles()).with_limits(TransformLimits {
            max_iterations: 8,
            warn_after: 3,
            on_limit: IterationLimitPolicy::KeepLastState,
        });
        let mut report = report(&forest, vec![other(DifferenceSeverity::NonBreaking)]);

        let outcome = engine.stabilize(&mut report, &CancellationToken::new()).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 8);
        assert_eq!(report.differences().len(), 1);
        assert_eq!(report.differences()[0].code, "c");
    }

    #[test]
    fn test_oscillation_can_fail() {
        let forest = forest();
        let mut engine = TransformEngine::new(toggles()).with_limits(TransformLimits {
            max_iterations: 4,
            warn_after: 100,
            on_limit: IterationLimitPolicy::Fail,
        });
        let mut report = report(&forest, vec![other(DifferenceSeverity::NonBreaking)]);

        let err = engine
            .stabilize(&mut report, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ApiCompatError::Transform {
                source: TransformErrorKind::IterationLimitExceeded { iterations: 4 },
                ..
            }
        ));
    }

    #[test]
    fn test_failing_transform_is_treated_as_keep() {
        let forest = forest();
        let mut engine = TransformEngine::new(vec![
            Box::new(Always::new("broken", Err("boom".to_string()))),
            Box::new(Reclassify::new(
                "upgrade",
                "c",
                CompatibilityType::Source,
                DifferenceSeverity::Breaking,
            )),
        ]);
        let mut report = report(&forest, vec![Difference::new("c", "changed")]);

        engine.stabilize(&mut report, &CancellationToken::new()).unwrap();
        assert_eq!(report.differences().len(), 1);
        assert!(report.differences()[0].is_breaking());
    }

    #[test]
    fn test_discard_removes_difference() {
        let forest = forest();
        let mut engine = TransformEngine::new(vec![Box::new(Always::new(
            "ignore",
            Ok(TransformationResult::Discard),
        ))]);
        let mut report = report(
            &forest,
            vec![Difference::new("x", "x"), Difference::new("y", "y")],
        );
        engine.stabilize(&mut report, &CancellationToken::new()).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_replacements_are_spliced_in_place() {
        let forest = forest();
        let mut engine = TransformEngine::new(vec![Box::new(Splitter {
            patterns: vec![Regex::new("^split$").unwrap()],
        })]);
        let mut report = report(
            &forest,
            vec![
                Difference::new("first", "first"),
                Difference::new("split", "split"),
                Difference::new("last", "last"),
            ],
        );
        engine.stabilize(&mut report, &CancellationToken::new()).unwrap();
        let codes: Vec<_> = report.differences().iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["first", "a", "b", "last"]);
    }

    #[test]
    fn test_undecided_leaves_difference() {
        let forest = forest();
        let mut engine = TransformEngine::new(vec![Box::new(Always::new(
            "unsure",
            Ok(TransformationResult::Undecided),
        ))]);
        let mut report = report(&forest, vec![Difference::new("x", "x")]);
        let outcome = engine.stabilize(&mut report, &CancellationToken::new()).unwrap();
        assert_eq!(outcome.iterations, 1);
        assert_eq!(report.differences().len(), 1);
    }

    #[test]
    fn test_unknown_block_member_is_rejected() {
        let result = TransformEngine::new(toggles()).with_blocks(&[vec!["missing".to_string()]]);
        assert!(matches!(result, Err(ApiCompatError::Config(_))));
    }

    #[test]
    fn test_cancelled_run_stops() {
        let forest = forest();
        let mut engine = TransformEngine::new(toggles());
        let mut report = report(&forest, vec![other(DifferenceSeverity::NonBreaking)]);
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(
            engine.stabilize(&mut report, &token),
            Err(ApiCompatError::Cancelled)
        ));
    }
}
