//! The tree filter protocol.

use super::result::{FilterFinishResult, FilterStartResult};
use crate::error::Result;
use crate::model::{Element, ElementId, ElementRef};
use crate::pipeline::Extension;
use std::collections::HashMap;

/// Decides, per element, whether it takes part in the comparison.
///
/// For every element `start` is called top-down before its children and
/// `finish` bottom-up after them. Once the whole forest of one API version
/// has been visited, `finish_all` lets the filter resolve elements it left
/// undecided using everything it has seen. `finish_all` also ends the
/// session: per-forest state must be dropped so the next forest starts
/// clean.
pub trait TreeFilter<E: Element>: Extension {
    fn start(&mut self, element: ElementRef<'_, E>) -> Result<FilterStartResult>;

    fn finish(&mut self, element: ElementRef<'_, E>) -> Result<FilterFinishResult>;

    /// Late resolutions, keyed by element
    fn finish_all(&mut self) -> Result<HashMap<ElementId, FilterFinishResult>>;
}
