use std::time::Duration;

use chrono::{DateTime, Utc};
use mqa_core::CatalogType;
use serde::{Deserialize, Serialize};

use crate::indicators::{Dimension, Population};
use crate::reachability::UnreachableUrl;
use crate::scoring::RatingScale;

/// Options for catalog evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateOptions {
    /// Exporter flavour; selects format vocabulary columns and matching.
    pub catalog_type: CatalogType,
    /// Per-request timeout for URL reachability probes.
    pub probe_timeout_secs: u64,
    /// Maximum number of concurrent probes.
    pub pool_size: usize,
    /// User agent sent with probes.
    pub user_agent: String,
    pub rating: RatingScale,
}

impl EvaluateOptions {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            catalog_type: CatalogType::default(),
            probe_timeout_secs: 10,
            pool_size: 10,
            user_agent: format!("mqa/{}", env!("CARGO_PKG_VERSION")),
            rating: RatingScale::default(),
        }
    }
}

/// Dataset and distribution counts, computed once per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub datasets: u64,
    pub distributions: u64,
}

impl PopulationCounts {
    pub fn get(&self, population: Population) -> u64 {
        match population {
            Population::Datasets => self.datasets,
            Population::Distributions => self.distributions,
        }
    }
}

/// One report row.
///
/// `count` is -1 when the indicator could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub key: String,
    pub dimension: Dimension,
    pub label: String,
    pub count: i64,
    pub population: u64,
    /// Coverage ratio rounded to two decimals.
    pub percentage: f64,
    pub points: f64,
    pub weight: u32,
}

/// Final report line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_points: f64,
    pub weight_total: u32,
    pub ratio: f64,
    pub rating: String,
}

/// Failure details produced by an indicator, for the caller to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditRecord {
    /// URLs of a reachability indicator that did not answer 2xx/3xx.
    UnreachableUrls {
        indicator: String,
        property: String,
        urls: Vec<UnreachableUrl>,
    },
    /// Validator output for a non-conforming catalog.
    ShaclReport { indicator: String, diagnostics: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationTimings {
    pub populations_ms: u64,
    pub indicators_ms: u64,
    pub total_ms: u64,
}

/// Result of evaluating one catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub generated_at: DateTime<Utc>,
    pub catalog_type: CatalogType,
    pub populations: PopulationCounts,
    pub rows: Vec<IndicatorRow>,
    pub summary: ReportSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audits: Vec<AuditRecord>,
    pub timings: EvaluationTimings,
}

impl EvaluationReport {
    pub fn row(&self, key: &str) -> Option<&IndicatorRow> {
        self.rows.iter().find(|row| row.key == key)
    }
}
