//! Metadata quality evaluation for DCAT-AP catalogs.
//!
//! The [`EvaluationEngine`] walks an [`IndicatorTable`] in order, resolves
//! each indicator's count through its counting strategy, converts counts
//! into weighted points and maps the total to a rating.

pub mod engine;
pub mod errors;
pub mod indicators;
pub mod matching;
pub mod model;
pub mod reachability;
pub mod report;
pub mod scoring;
pub mod shacl;
pub mod strategies;

pub use engine::EvaluationEngine;
pub use errors::{
    EvalError, IssueSeverity, IssueTarget, Result, ValidationIssue, ValidationReport,
};
pub use indicators::{
    CountingStrategy, Dimension, IndicatorDescriptor, IndicatorTable, Population, PropertyPath,
};
pub use matching::{
    MatchingStrategy, Vocabulary, contains_vocabulary_term, exact_set_membership,
    vocabulary_contains_value,
};
pub use model::{
    AuditRecord, EvaluateOptions, EvaluationReport, EvaluationTimings, IndicatorRow,
    PopulationCounts, ReportSummary,
};
pub use reachability::{HttpProbe, ReachabilityOutcome, ReachabilityProber, UnreachableUrl, UrlProbe};
pub use report::{ArtifactPaths, render_results, write_artifacts};
pub use scoring::{RatingBand, RatingScale, ScoreAccumulator};
pub use shacl::{CommandOracle, OracleError, ShaclOracle, ShaclOutcome, ShapeFiles};
