//! In-memory reporter.

use super::traits::{Extension, Reporter};
use crate::error::Result;
use crate::model::{Difference, Element, Report};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

/// Owned copy of a delivered report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectedReport {
    /// Display name of the old element, if any
    pub old: Option<String>,
    /// Display name of the new element, if any
    pub new: Option<String>,
    pub differences: Vec<Difference>,
}

impl<E: Element> From<&Report<'_, E>> for CollectedReport {
    fn from(report: &Report<'_, E>) -> Self {
        Self {
            old: report.old().map(|e| e.data().display_name()),
            new: report.new_element().map(|e| e.data().display_name()),
            differences: report.differences().to_vec(),
        }
    }
}

/// Shared handle to the reports received by a [`CollectingReporter`].
///
/// The handle stays usable after the reporter was moved into an engine.
#[derive(Debug, Clone, Default)]
pub struct ReportSink {
    reports: Arc<Mutex<Vec<CollectedReport>>>,
}

impl ReportSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, report: CollectedReport) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report);
    }

    /// Copy of every report received so far
    #[must_use]
    pub fn reports(&self) -> Vec<CollectedReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All received differences, in delivery order
    #[must_use]
    pub fn differences(&self) -> Vec<Difference> {
        self.reports()
            .into_iter()
            .flat_map(|r| r.differences)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reporter keeping every report in memory.
#[derive(Debug)]
pub struct CollectingReporter {
    id: String,
    sink: ReportSink,
}

impl CollectingReporter {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_sink(id, ReportSink::new())
    }

    /// Reporter writing into an existing sink
    pub fn with_sink(id: impl Into<String>, sink: ReportSink) -> Self {
        Self {
            id: id.into(),
            sink,
        }
    }

    #[must_use]
    pub fn sink(&self) -> ReportSink {
        self.sink.clone()
    }
}

impl Extension for CollectingReporter {
    fn extension_id(&self) -> &str {
        &self.id
    }
}

impl<E: Element> Reporter<E> for CollectingReporter {
    fn report(&mut self, report: &Report<'_, E>) -> Result<()> {
        self.sink.push(CollectedReport::from(report));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiSide, ElementForest, Pairing, SimpleElement};

    #[test]
    fn test_sink_outlives_reporter() {
        let mut old = ElementForest::new(ApiSide::Old);
        let a = old.insert_root(SimpleElement::of_kind("class", "A"));
        let report = Report::new(Pairing::Left(old.get(a).unwrap()))
            .with_difference(Difference::new("class.removed", "class removed"));

        let sink = {
            let mut reporter = CollectingReporter::new("collect");
            reporter.report(&report).unwrap();
            reporter.sink()
        };

        let reports = sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].old.as_deref(), Some("class A"));
        assert_eq!(reports[0].new, None);
        assert_eq!(sink.differences()[0].code, "class.removed");
    }
}
