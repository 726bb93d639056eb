use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use mqa_core::{CatalogGraph, DATASET, DISTRIBUTION};
use mqa_vocab::VocabularyProvider;
use tracing::{info, warn};

use crate::errors::{EvalError, IssueTarget, Result, ValidationIssue};
use crate::indicators::{IndicatorDescriptor, IndicatorTable};
use crate::model::{
    AuditRecord, EvaluateOptions, EvaluationReport, EvaluationTimings, IndicatorRow,
    PopulationCounts, ReportSummary,
};
use crate::reachability::{ReachabilityProber, UrlProbe};
use crate::scoring::{ScoreAccumulator, coverage, points, round2};
use crate::shacl::{ShaclOracle, ShapeFiles};
use crate::strategies::{StrategyContext, resolve_count};

/// Evaluate a catalog graph against an indicator table.
///
/// Indicators run strictly in table order; the only concurrency is inside
/// reachability probing. An indicator that fails yields a sentinel count
/// and the run continues, so every report has one row per indicator.
#[derive(Clone)]
pub struct EvaluationEngine {
    options: EvaluateOptions,
    table: IndicatorTable,
    vocabularies: Arc<dyn VocabularyProvider>,
    probe: Arc<dyn UrlProbe>,
    oracle: Option<Arc<dyn ShaclOracle>>,
}

impl std::fmt::Debug for EvaluationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationEngine")
            .field("options", &self.options)
            .field("indicators", &self.table.len())
            .field("oracle", &self.oracle.as_ref().map(|oracle| oracle.name()))
            .finish()
    }
}

impl EvaluationEngine {
    /// Build an engine after validating the table and rating scale.
    pub fn new(
        options: EvaluateOptions,
        table: IndicatorTable,
        vocabularies: Arc<dyn VocabularyProvider>,
        probe: Arc<dyn UrlProbe>,
    ) -> Result<Self> {
        let mut report = table.validate();
        report.merge(options.rating.validate());
        if table.weight_total() != options.rating.weight_total {
            report.push(ValidationIssue::warning(
                "weight_total_mismatch",
                IssueTarget::rating("weight_total"),
                format!(
                    "indicator weights sum to {} but the rating scale assumes {}",
                    table.weight_total(),
                    options.rating.weight_total
                ),
            ));
        }
        for issue in report.warnings() {
            warn!(
                event = "configuration_warning",
                code = %issue.code,
                target = %issue.target,
                "{}",
                issue.message
            );
        }
        if !report.is_ok() {
            return Err(EvalError::InvalidTable(report));
        }

        Ok(Self {
            options,
            table,
            vocabularies,
            probe,
            oracle: None,
        })
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn ShaclOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn options(&self) -> &EvaluateOptions {
        &self.options
    }

    pub fn table(&self) -> &IndicatorTable {
        &self.table
    }

    /// Run every indicator against `graph`.
    ///
    /// The engine is consumed: one instance evaluates one catalog, and no
    /// indicator runs after the report is returned. Clone the engine before
    /// calling this to evaluate another catalog with the same setup.
    ///
    /// Only population counting can fail the run; indicator failures are
    /// reported as sentinel counts.
    pub async fn evaluate(
        self,
        graph: &CatalogGraph,
        shapes: Option<&ShapeFiles>,
    ) -> Result<EvaluationReport> {
        let total_start = Instant::now();
        info!(
            event = "evaluation_started",
            catalog_type = %self.options.catalog_type,
            indicators = self.table.len(),
            "evaluation started"
        );

        let populations = PopulationCounts {
            datasets: graph.count_entities(DATASET)?,
            distributions: graph.count_entities(DISTRIBUTION)?,
        };
        let populations_ms = total_start.elapsed().as_millis() as u64;
        info!(
            event = "populations_counted",
            datasets = populations.datasets,
            distributions = populations.distributions,
            "populations counted"
        );

        let ctx = StrategyContext {
            graph,
            populations,
            catalog_type: self.options.catalog_type,
            vocabularies: self.vocabularies.as_ref(),
            prober: ReachabilityProber::new(self.probe.as_ref(), self.options.pool_size),
            oracle: self.oracle.as_deref(),
            shapes,
        };

        let indicators_start = Instant::now();
        let mut score = ScoreAccumulator::new();
        let mut rows = Vec::with_capacity(self.table.len());
        let mut audits = Vec::new();
        for descriptor in self.table.iter() {
            let (row, audit) = evaluate_indicator(descriptor, &ctx).await;
            score.add(row.points);
            rows.push(row);
            audits.extend(audit);
        }
        let indicators_ms = indicators_start.elapsed().as_millis() as u64;

        let total = score.total();
        let summary = ReportSummary {
            total_points: round2(total),
            weight_total: self.options.rating.weight_total,
            ratio: self.options.rating.ratio(total),
            rating: self.options.rating.rating_for(total).to_string(),
        };
        info!(
            event = "rating_computed",
            total_points = summary.total_points,
            weight_total = summary.weight_total,
            rating = %summary.rating,
            "rating computed"
        );

        Ok(EvaluationReport {
            generated_at: Utc::now(),
            catalog_type: self.options.catalog_type,
            populations,
            rows,
            summary,
            audits,
            timings: EvaluationTimings {
                populations_ms,
                indicators_ms,
                total_ms: total_start.elapsed().as_millis() as u64,
            },
        })
    }
}

async fn evaluate_indicator(
    descriptor: &IndicatorDescriptor,
    ctx: &StrategyContext<'_>,
) -> (IndicatorRow, Option<AuditRecord>) {
    let start = Instant::now();
    let resolved = resolve_count(descriptor, ctx).await;
    let row = IndicatorRow {
        key: descriptor.key.clone(),
        dimension: descriptor.dimension,
        label: descriptor.label(),
        count: resolved.count,
        population: resolved.population,
        percentage: round2(coverage(resolved.count, resolved.population)),
        points: points(resolved.count, resolved.population, descriptor.weight),
        weight: descriptor.weight,
    };

    match &resolved.failure {
        Some(failure) => warn!(
            event = "indicator_failed",
            indicator = %descriptor.key,
            strategy = descriptor.strategy.name(),
            count = row.count,
            error = %failure,
            "indicator failed"
        ),
        None => info!(
            event = "indicator_evaluated",
            indicator = %descriptor.key,
            strategy = descriptor.strategy.name(),
            count = row.count,
            population = row.population,
            points = row.points,
            duration_ms = start.elapsed().as_millis() as u64,
            "indicator evaluated"
        ),
    }
    (row, resolved.audit)
}
