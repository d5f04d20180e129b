//! The difference transform extension point.

use super::result::TransformationResult;
use crate::error::Result;
use crate::model::{Difference, Element, ElementRef, Pairing};
use crate::pipeline::Extension;
use regex::Regex;

/// Rewrites, reclassifies or discards differences.
///
/// A transform is only offered differences whose code matches one of its
/// [`code_patterns`](Self::code_patterns). The traversal hooks run while the
/// forests are walked, before any difference is transformed, so a transform
/// can gather context from the whole comparison.
pub trait DifferenceTransform<E: Element>: Extension {
    /// Patterns over `Difference::code` this transform is interested in
    fn code_patterns(&self) -> &[Regex];

    fn try_transform(
        &mut self,
        old: Option<ElementRef<'_, E>>,
        new: Option<ElementRef<'_, E>>,
        difference: &Difference,
    ) -> Result<TransformationResult>;

    fn start_traversal(&mut self) {}

    fn start_elements(&mut self, _elements: Pairing<ElementRef<'_, E>>) {}

    fn end_elements(&mut self, _elements: Pairing<ElementRef<'_, E>>) {}

    fn end_traversal(&mut self) {}

    /// Whether the transform is interested in a difference code
    fn applies_to(&self, code: &str) -> bool {
        self.code_patterns().iter().any(|re| re.is_match(code))
    }
}
