//! The comparison engine.
//!
//! For every selected API analyzer the engine builds the old and new element
//! forests, evaluates the filters, walks both forests in pairs and collects
//! the differences found for each pair. Collected reports are then
//! stabilized by the transforms and handed to every reporter.

use super::cancel::CancellationToken;
use super::context::ExtensionContext;
use super::registry::{ExtensionKind, ExtensionRegistry, select};
use super::traits::{ApiAnalyzer, DifferenceAnalyzer, Extension, Reporter};
use crate::config::{ConfigError, PipelineConfiguration};
use crate::error::{
    ApiCompatError, ErrorContext, ExtensionErrorKind, Result, TraversalErrorKind,
};
use crate::filter::{FilterRegistry, FilterVerdicts};
use crate::matching::{CoIterator, CorrespondenceDeducer};
use crate::model::{
    Api, ApiSide, Element, ElementForest, ElementRef, Pairing, Report, SeverityMapping,
};
use crate::transform::TransformEngine;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

// ============================================================================
// Comparison summary
// ============================================================================

/// Counters describing a finished comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    /// API analyzers that ran
    pub analyzers: usize,
    /// Reports produced by difference analyzers
    pub reports_collected: usize,
    /// Non-empty reports handed to the reporters
    pub reports_delivered: usize,
    /// Differences contained in the delivered reports
    pub differences_delivered: usize,
    /// Most fixpoint passes any single report needed
    pub max_transform_iterations: usize,
    /// Reports whose transformations hit the iteration limit
    pub unstable_reports: usize,
}

// ============================================================================
// Engine
// ============================================================================

struct Extensions<E> {
    analyzers: Vec<Box<dyn ApiAnalyzer<E>>>,
    filters: FilterRegistry<E>,
    transforms: TransformEngine<E>,
    reporters: Vec<Box<dyn Reporter<E>>>,
}

impl<E: Element> Extensions<E> {
    fn each_mut(&mut self) -> impl Iterator<Item = (ExtensionKind, &mut dyn Extension)> {
        let analyzers = self
            .analyzers
            .iter_mut()
            .map(|a| (ExtensionKind::Analyzer, a.as_mut() as &mut dyn Extension));
        let filters = self
            .filters
            .iter_mut()
            .map(|f| (ExtensionKind::Filter, f.as_mut() as &mut dyn Extension));
        let transforms = self
            .transforms
            .transforms_mut()
            .map(|t| (ExtensionKind::Transform, t.as_mut() as &mut dyn Extension));
        let reporters = self
            .reporters
            .iter_mut()
            .map(|r| (ExtensionKind::Reporter, r.as_mut() as &mut dyn Extension));
        analyzers.chain(filters).chain(transforms).chain(reporters)
    }
}

/// A configured pipeline, ready to compare two APIs once.
///
/// # Example
///
/// ```ignore
/// let config = PipelineConfig::from_yaml(&yaml)?.resolve()?;
/// let registry = ExtensionRegistry::new()
///     .with_analyzer(Box::new(MyAnalyzer::default()))
///     .with_reporter(Box::new(reporter));
/// let summary = ComparisonEngine::build(config, registry)?.run(&old_api, &new_api)?;
/// ```
pub struct ComparisonEngine<E> {
    config: PipelineConfiguration,
    extensions: Extensions<E>,
    cancel: CancellationToken,
}

impl<E: Element> ComparisonEngine<E> {
    /// Select and configure the extensions named by `config`.
    ///
    /// Unknown or duplicate ids are reported together as
    /// [`ApiCompatError::InvalidConfig`]. The first extension failing to
    /// configure aborts the build after every selected extension is closed.
    pub fn build(config: PipelineConfiguration, registry: ExtensionRegistry<E>) -> Result<Self> {
        let ExtensionRegistry {
            analyzers,
            filters,
            transforms,
            reporters,
            conflicts,
        } = registry;

        let mut errors = conflicts;
        let analyzers = select(ExtensionKind::Analyzer, analyzers, &config.analyzers, &mut errors);
        let filters = select(ExtensionKind::Filter, filters, &config.filters, &mut errors);
        let transforms =
            select(ExtensionKind::Transform, transforms, &config.transforms, &mut errors);
        let reporters = select(ExtensionKind::Reporter, reporters, &config.reporters, &mut errors);
        errors.extend(unknown_block_members(&config.transform_blocks, &transforms));
        if !errors.is_empty() {
            return Err(ApiCompatError::invalid_config(errors));
        }

        let transforms = TransformEngine::new(transforms.into_iter().map(|(_, t)| t).collect())
            .with_blocks(&config.transform_blocks)?
            .with_limits(config.limits);
        let filters = filters
            .into_iter()
            .fold(FilterRegistry::new(), |registry, (_, f)| registry.with_filter(f));

        let mut engine = Self {
            extensions: Extensions {
                analyzers: analyzers.into_iter().map(|(_, a)| a).collect(),
                filters,
                transforms,
                reporters: reporters.into_iter().map(|(_, r)| r).collect(),
            },
            config,
            cancel: CancellationToken::new(),
        };

        if let Err(err) = engine.configure_all() {
            if let Err(close_err) = engine.close_all() {
                warn!(error = %close_err, "Failed to close extensions after configuration error");
            }
            return Err(err);
        }
        Ok(engine)
    }

    /// Use an externally controlled cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the comparison when cancelled
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[must_use]
    pub const fn configuration(&self) -> &PipelineConfiguration {
        &self.config
    }

    /// Compare two APIs and deliver the stabilized reports.
    ///
    /// Every extension is closed before this returns, whatever the outcome.
    pub fn run(mut self, old_api: &Api, new_api: &Api) -> Result<ComparisonSummary> {
        info!(
            analyzers = self.extensions.analyzers.len(),
            filters = self.extensions.filters.len(),
            transforms = self.extensions.transforms.len(),
            reporters = self.extensions.reporters.len(),
            "Starting API comparison"
        );
        self.extensions.transforms.reset();

        let outcome = self.compare(old_api, new_api);
        let closed = self.close_all();
        let summary = outcome?;
        closed?;

        info!(
            reports = summary.reports_delivered,
            differences = summary.differences_delivered,
            "API comparison finished"
        );
        Ok(summary)
    }

    fn configure_all(&mut self) -> Result<()> {
        let config = &self.config;
        for (kind, extension) in self.extensions.each_mut() {
            let id = extension.extension_id().to_string();
            let ctx = ExtensionContext::new(
                &id,
                config.extension_config(&id),
                &config.criticalities,
                &config.severity_mapping,
            );
            extension
                .configure(&ctx)
                .with_context(|| format!("configuring {kind} '{id}'"))?;
            debug!(%kind, extension = %id, "Configured extension");
        }
        Ok(())
    }

    /// Close every extension; the first failure is returned after all were tried
    fn close_all(&mut self) -> Result<()> {
        let mut first = None;
        for (kind, extension) in self.extensions.each_mut() {
            if let Err(err) = extension.close() {
                let id = extension.extension_id().to_string();
                warn!(%kind, extension = %id, error = %err, "Failed to close extension");
                first.get_or_insert_with(|| {
                    ApiCompatError::extension(
                        id,
                        format!("closing {kind}"),
                        ExtensionErrorKind::Close(err.to_string()),
                    )
                });
            }
        }
        first.map_or(Ok(()), Err)
    }

    fn compare(&mut self, old_api: &Api, new_api: &Api) -> Result<ComparisonSummary> {
        let Extensions {
            analyzers,
            filters,
            transforms,
            reporters,
        } = &mut self.extensions;
        let mut run = Run {
            filters,
            transforms,
            reporters,
            severity_mapping: &self.config.severity_mapping,
            cancel: &self.cancel,
            summary: ComparisonSummary::default(),
        };
        for analyzer in analyzers.iter_mut() {
            run.cancel.check()?;
            run.analyze(analyzer.as_mut(), old_api, new_api)?;
            run.summary.analyzers += 1;
        }
        Ok(run.summary)
    }
}

fn unknown_block_members<T: ?Sized>(
    blocks: &[Vec<String>],
    transforms: &[(String, Box<T>)],
) -> Vec<ConfigError> {
    let known: HashSet<&str> = transforms.iter().map(|(id, _)| id.as_str()).collect();
    blocks
        .iter()
        .enumerate()
        .flat_map(|(index, block)| {
            block
                .iter()
                .filter(|id| !known.contains(id.as_str()))
                .map(move |id| {
                    ConfigError::new(
                        format!("transformBlocks[{index}]"),
                        format!("no transform registered as '{id}'"),
                    )
                })
        })
        .collect()
}

/// Attribute a failure to an extension, leaving cancellation untouched
fn attribute(err: ApiCompatError, wrap: impl FnOnce(String) -> ApiCompatError) -> ApiCompatError {
    match err {
        ApiCompatError::Cancelled => err,
        other => wrap(other.to_string()),
    }
}

// ============================================================================
// One run
// ============================================================================

struct Run<'r, E> {
    filters: &'r mut FilterRegistry<E>,
    transforms: &'r mut TransformEngine<E>,
    reporters: &'r mut [Box<dyn Reporter<E>>],
    severity_mapping: &'r SeverityMapping,
    cancel: &'r CancellationToken,
    summary: ComparisonSummary,
}

impl<E: Element> Run<'_, E> {
    fn analyze(
        &mut self,
        analyzer: &mut dyn ApiAnalyzer<E>,
        old_api: &Api,
        new_api: &Api,
    ) -> Result<()> {
        let id = analyzer.extension_id().to_string();
        info!(analyzer = %id, "Running API analyzer");

        let (old_forest, old_verdicts) = self.build_forest(analyzer, &id, old_api, ApiSide::Old)?;
        let (new_forest, new_verdicts) = self.build_forest(analyzer, &id, new_api, ApiSide::New)?;

        let deducer = analyzer.correspondence_deducer();
        let mut visitor = analyzer.difference_analyzer().map_err(|e| {
            attribute(e, |msg| {
                ApiCompatError::extension(
                    &id,
                    "creating difference analyzer",
                    ExtensionErrorKind::Instantiation(msg),
                )
            })
        })?;

        let walked = visitor
            .open()
            .map_err(|e| visitor_error(&id, "opening", e))
            .and_then(|()| {
                Traversal {
                    analyzer_id: &id,
                    deducer: deducer.as_ref(),
                    visitor: visitor.as_mut(),
                    transforms: &mut *self.transforms,
                    old_verdicts: &old_verdicts,
                    new_verdicts: &new_verdicts,
                    cancel: self.cancel,
                }
                .run(&old_forest, &new_forest)
            });
        let closed = visitor
            .close()
            .map_err(|e| visitor_error(&id, "closing", e));
        let reports = walked?;
        closed?;

        debug!(analyzer = %id, reports = reports.len(), "Traversal finished");
        self.deliver(reports)
    }

    fn build_forest(
        &mut self,
        analyzer: &dyn ApiAnalyzer<E>,
        id: &str,
        api: &Api,
        side: ApiSide,
    ) -> Result<(ElementForest<E>, FilterVerdicts)> {
        let mut archives = analyzer.archive_analyzer(api, side).map_err(|e| {
            attribute(e, |msg| {
                ApiCompatError::extension(
                    id,
                    format!("creating {side} archive analyzer"),
                    ExtensionErrorKind::Instantiation(msg),
                )
            })
        })?;

        let mut forest = archives.analyze(&mut *self.filters).map_err(|e| {
            attribute(e, |msg| {
                ApiCompatError::traversal(
                    format!("analyzer '{id}' building {side} forest"),
                    TraversalErrorKind::ArchiveAnalysis(msg),
                )
            })
        })?;
        self.cancel.check()?;

        let verdicts = self.filters.evaluate(&forest)?;
        archives
            .prune(&mut forest, &verdicts)
            .with_context(|| format!("analyzer '{id}' pruning {side} forest"))?;

        debug!(
            analyzer = %id,
            %side,
            elements = forest.len(),
            included = if verdicts.is_permissive() {
                forest.len()
            } else {
                verdicts.included_count()
            },
            "Element forest ready"
        );
        Ok((forest, verdicts))
    }

    fn deliver(&mut self, reports: Vec<Report<'_, E>>) -> Result<()> {
        self.summary.reports_collected += reports.len();
        for mut report in reports {
            self.cancel.check()?;
            let outcome = self.transforms.stabilize(&mut report, self.cancel)?;
            self.summary.max_transform_iterations =
                self.summary.max_transform_iterations.max(outcome.iterations);
            if !outcome.converged {
                self.summary.unstable_reports += 1;
            }

            let assigned = report
                .take_differences()
                .into_iter()
                .map(|d| self.severity_mapping.assign(d))
                .collect();
            report.set_differences(assigned);
            if report.is_empty() {
                continue;
            }

            for reporter in self.reporters.iter_mut() {
                reporter.report(&report).map_err(|e| {
                    attribute(e, |msg| {
                        ApiCompatError::extension(
                            reporter.extension_id(),
                            "delivering report",
                            ExtensionErrorKind::Reporter(msg),
                        )
                    })
                })?;
            }
            self.summary.reports_delivered += 1;
            self.summary.differences_delivered += report.differences().len();
        }
        Ok(())
    }
}

fn visitor_error(analyzer_id: &str, stage: &str, err: ApiCompatError) -> ApiCompatError {
    attribute(err, |msg| {
        ApiCompatError::extension(
            analyzer_id,
            format!("difference analyzer {stage}"),
            ExtensionErrorKind::Visitor(msg),
        )
    })
}

// ============================================================================
// Paired traversal
// ============================================================================

struct Traversal<'t, E> {
    analyzer_id: &'t str,
    deducer: &'t dyn CorrespondenceDeducer<E>,
    visitor: &'t mut dyn DifferenceAnalyzer<E>,
    transforms: &'t mut TransformEngine<E>,
    old_verdicts: &'t FilterVerdicts,
    new_verdicts: &'t FilterVerdicts,
    cancel: &'t CancellationToken,
}

impl<E: Element> Traversal<'_, E> {
    fn run<'f>(
        mut self,
        old: &'f ElementForest<E>,
        new: &'f ElementForest<E>,
    ) -> Result<Vec<Report<'f, E>>> {
        let mut reports = Vec::new();
        self.transforms.start_traversal();
        let walked = self.walk_level(old.roots().collect(), new.roots().collect(), &mut reports);
        self.transforms.end_traversal();
        walked.map(|()| reports)
    }

    /// Pair up one level of siblings and visit each pair in order
    fn walk_level<'f>(
        &mut self,
        mut old: Vec<ElementRef<'f, E>>,
        mut new: Vec<ElementRef<'f, E>>,
        reports: &mut Vec<Report<'f, E>>,
    ) -> Result<()> {
        let correspondence = self.deducer.deduce(&old, &new);
        correspondence.sort(&mut old);
        correspondence.sort(&mut new);

        let pairs = CoIterator::new(old, new, |a: &ElementRef<'f, E>, b: &ElementRef<'f, E>| {
            correspondence.compare(a, b)
        });
        for pair in pairs {
            self.visit(pair, reports)?;
        }
        Ok(())
    }

    fn visit<'f>(
        &mut self,
        pair: Pairing<ElementRef<'f, E>>,
        reports: &mut Vec<Report<'f, E>>,
    ) -> Result<()> {
        self.cancel.check()?;
        let (old, new) = pair.into_options();

        let analyze = old.is_none_or(|e| self.old_verdicts.is_included(e.id()))
            && new.is_none_or(|e| self.new_verdicts.is_included(e.id()));
        if analyze {
            self.visitor
                .begin_analysis(pair)
                .map_err(|e| visitor_error(self.analyzer_id, "beginning analysis", e))?;
            self.transforms.start_elements(pair);
        }

        if let (Some(o), Some(n)) = (old, new)
            && self.old_verdicts.should_descend(o.id())
            && self.new_verdicts.should_descend(n.id())
        {
            self.walk_level(o.children().collect(), n.children().collect(), reports)?;
        }

        if analyze {
            let report = self
                .visitor
                .end_analysis(pair)
                .map_err(|e| visitor_error(self.analyzer_id, "ending analysis", e))?;
            self.transforms.end_elements(pair);
            reports.push(report);
        }
        Ok(())
    }
}
