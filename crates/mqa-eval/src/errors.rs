use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a configuration issue blocks the engine from being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// Part of the evaluation configuration an issue refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum IssueTarget {
    Table,
    /// `position` is the zero-based row in the indicator table.
    Indicator { position: usize, field: String },
    Rating { field: String },
}

impl IssueTarget {
    pub fn indicator(position: usize, field: impl Into<String>) -> Self {
        IssueTarget::Indicator {
            position,
            field: field.into(),
        }
    }

    pub fn rating(field: impl Into<String>) -> Self {
        IssueTarget::Rating {
            field: field.into(),
        }
    }
}

impl fmt::Display for IssueTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueTarget::Table => f.write_str("indicator table"),
            IssueTarget::Indicator { position, field } => {
                write!(f, "indicator #{} {field}", position + 1)
            }
            IssueTarget::Rating { field } => write!(f, "rating {field}"),
        }
    }
}

/// A problem found in an indicator table or rating scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: String,
    pub target: IssueTarget,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(code: impl Into<String>, target: IssueTarget, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            code: code.into(),
            target,
            message: message.into(),
        }
    }

    pub fn warning(code: impl Into<String>, target: IssueTarget, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            ..Self::error(code, target, message)
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.target, self.message, self.code)
    }
}

/// Issues collected while checking a configuration, in discovery order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when no issue is an error; warnings alone do not block a run.
    pub fn is_ok(&self) -> bool {
        !self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }

    /// Error codes in discovery order.
    pub fn error_codes(&self) -> Vec<&str> {
        self.errors().map(|issue| issue.code.as_str()).collect()
    }
}

/// Errors emitted by the evaluation engine.
///
/// Indicator-level failures are never reported here; they become sentinel
/// counts in the report.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("graph error: {0}")]
    Graph(#[from] mqa_core::Error),
    #[error("invalid indicator configuration: {}", .0.error_codes().join(", "))]
    InvalidTable(ValidationReport),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_alone_keep_the_report_ok() {
        let mut report = ValidationReport::default();
        report.push(ValidationIssue::warning(
            "weight_total_mismatch",
            IssueTarget::rating("weight_total"),
            "weights sum to 400",
        ));
        assert!(report.is_ok());

        report.push(ValidationIssue::error(
            "invalid_weight",
            IssueTarget::indicator(2, "weight"),
            "'x' has weight 0",
        ));
        assert!(!report.is_ok());
        assert_eq!(report.error_codes(), ["invalid_weight"]);
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn issues_name_their_table_row() {
        let issue = ValidationIssue::error(
            "duplicate_key",
            IssueTarget::indicator(0, "key"),
            "'a' already names an earlier indicator",
        );
        assert_eq!(
            issue.to_string(),
            "indicator #1 key: 'a' already names an earlier indicator [duplicate_key]"
        );
        assert_eq!(
            EvalError::InvalidTable(ValidationReport {
                issues: vec![issue],
            })
            .to_string(),
            "invalid indicator configuration: duplicate_key"
        );
    }
}
