//! Extension points driven by the comparison engine.
//!
//! Every extension carries a stable identifier and receives its typed
//! configuration through [`Extension::configure`] before first use.

use super::context::ExtensionContext;
use crate::error::Result;
use crate::filter::{FilterRegistry, FilterVerdicts};
use crate::matching::{CorrespondenceDeducer, NaturalOrder};
use crate::model::{Api, ApiSide, Element, ElementForest, ElementRef, Pairing, Report};

/// Identity and lifecycle shared by every extension.
pub trait Extension: Send {
    /// Stable identifier used by configuration and include/exclude lists
    fn extension_id(&self) -> &str;

    /// Receive configuration; called once before the first comparison
    fn configure(&mut self, _ctx: &ExtensionContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Release resources; called once the comparison is over, even after failures
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Builds the element forest of one API version.
pub trait ArchiveAnalyzer<E: Element> {
    /// Extract the element forest.
    ///
    /// Incremental builders may consult `filter` through its start/finish
    /// protocol to skip subtrees early; a session opened that way must be
    /// closed with [`FilterRegistry::finish_all`].
    fn analyze(&mut self, filter: &mut FilterRegistry<E>) -> Result<ElementForest<E>>;

    /// Final trimming pass over the forest once filter verdicts are known
    fn prune(&mut self, _forest: &mut ElementForest<E>, _verdicts: &FilterVerdicts) -> Result<()> {
        Ok(())
    }
}

/// Language or format specific analysis: forests, pairing order and difference detection.
pub trait ApiAnalyzer<E: Element>: Extension {
    /// Analyzer for one side of the comparison
    fn archive_analyzer(&self, api: &Api, side: ApiSide) -> Result<Box<dyn ArchiveAnalyzer<E>>>;

    /// Visitor detecting differences between paired elements
    fn difference_analyzer(&self) -> Result<Box<dyn DifferenceAnalyzer<E>>>;

    /// Order in which siblings of both versions are paired
    fn correspondence_deducer(&self) -> Box<dyn CorrespondenceDeducer<E>> {
        Box::new(NaturalOrder)
    }
}

/// Visitor invoked in depth-first order over the paired forests.
///
/// `begin_analysis` is called before the children of a pair are visited,
/// `end_analysis` after them.
pub trait DifferenceAnalyzer<E: Element> {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_analysis(&mut self, elements: Pairing<ElementRef<'_, E>>) -> Result<()>;

    /// Differences found for the pair
    fn end_analysis<'f>(&mut self, elements: Pairing<ElementRef<'f, E>>) -> Result<Report<'f, E>>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Receives every stabilized, non-empty report.
pub trait Reporter<E: Element>: Extension {
    fn report(&mut self, report: &Report<'_, E>) -> Result<()>;
}
