//! Reports: the differences found for one element pair.

use super::difference::Difference;
use super::element::Element;
use super::forest::ElementRef;
use super::pairing::Pairing;

/// Differences found for one old/new element pair.
#[derive(Debug)]
pub struct Report<'f, E> {
    elements: Pairing<ElementRef<'f, E>>,
    differences: Vec<Difference>,
}

impl<E> Clone for Report<'_, E> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements,
            differences: self.differences.clone(),
        }
    }
}

impl<'f, E: Element> Report<'f, E> {
    /// Empty report for an element pair
    #[must_use]
    pub const fn new(elements: Pairing<ElementRef<'f, E>>) -> Self {
        Self {
            elements,
            differences: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_difference(mut self, difference: Difference) -> Self {
        self.differences.push(difference);
        self
    }

    #[must_use]
    pub fn with_differences(mut self, differences: impl IntoIterator<Item = Difference>) -> Self {
        self.differences.extend(differences);
        self
    }

    pub fn push(&mut self, difference: Difference) {
        self.differences.push(difference);
    }

    #[must_use]
    pub const fn elements(&self) -> Pairing<ElementRef<'f, E>> {
        self.elements
    }

    #[must_use]
    pub fn old(&self) -> Option<ElementRef<'f, E>> {
        self.elements.left().copied()
    }

    #[must_use]
    pub fn new_element(&self) -> Option<ElementRef<'f, E>> {
        self.elements.right().copied()
    }

    #[must_use]
    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }

    /// Swap in a new list of differences
    pub fn set_differences(&mut self, differences: Vec<Difference>) {
        self.differences = differences;
    }

    pub fn take_differences(&mut self) -> Vec<Difference> {
        std::mem::take(&mut self.differences)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }
}
