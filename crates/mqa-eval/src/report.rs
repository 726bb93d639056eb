use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::Result;
use crate::model::{AuditRecord, EvaluationReport, IndicatorRow};

pub const RESULTS_HEADER: &str =
    "Dimension\tIndicator/property\tCount\tPopulation\tPercentage\tPoints\tWeight";

/// Files written for one evaluated catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub results_path: PathBuf,
    pub metrics_path: PathBuf,
    pub audit_paths: Vec<PathBuf>,
}

/// Render the tab-separated results table with its summary line.
pub fn render_results(report: &EvaluationReport) -> String {
    let mut lines = Vec::with_capacity(report.rows.len() + 2);
    lines.push(RESULTS_HEADER.to_string());
    for row in &report.rows {
        lines.push(render_row(row));
    }
    lines.push(format!(
        "Total points\tRating: {}\t\t\t{}\t{}\t{}",
        report.summary.rating,
        format_decimal(report.summary.ratio),
        format_decimal(report.summary.total_points),
        report.summary.weight_total
    ));
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn render_row(row: &IndicatorRow) -> String {
    // Integral zeros print without a fractional part when nothing was computed.
    let percentage = if row.population == 0 {
        "0".to_string()
    } else {
        format_decimal(row.percentage)
    };
    let points = if row.count > 0 {
        format_decimal(row.points)
    } else {
        "0".to_string()
    };
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        row.dimension, row.label, row.count, row.population, percentage, points, row.weight
    )
}

/// Render a float the way decimal reports show it: shortest round-trip
/// digits, always with a fractional part (`30.0`, `0.67`).
pub fn format_decimal(value: f64) -> String {
    let text = format!("{value}");
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// File name and contents for an audit record.
pub fn render_audit(name: &str, audit: &AuditRecord) -> (String, String) {
    match audit {
        AuditRecord::UnreachableUrls { property, urls, .. } => {
            let body: String = urls
                .iter()
                .map(|entry| format!("{}\t{}\n", entry.url, entry.occurrences))
                .collect();
            (format!("{name}_errors_{}.txt", property.replace(':', "_")), body)
        }
        AuditRecord::ShaclReport { diagnostics, .. } => {
            (format!("{name}_errors_SHACL.txt"), diagnostics.clone())
        }
    }
}

/// Write `<name>_results.txt`, `metrics.json` and every audit file into `out_dir`.
///
/// Audit files are overwritten on each run.
pub fn write_artifacts(report: &EvaluationReport, out_dir: &Path, name: &str) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(out_dir)?;

    let results_path = out_dir.join(format!("{name}_results.txt"));
    std::fs::write(&results_path, render_results(report))?;

    let metrics_path = out_dir.join("metrics.json");
    std::fs::write(&metrics_path, serde_json::to_vec_pretty(report)?)?;

    let mut audit_paths = Vec::new();
    for audit in &report.audits {
        let (file_name, body) = render_audit(name, audit);
        let path = out_dir.join(file_name);
        std::fs::write(&path, body)?;
        audit_paths.push(path);
    }

    info!(
        event = "report_written",
        path = %results_path.display(),
        audits = audit_paths.len(),
        "report written"
    );
    Ok(ArtifactPaths {
        results_path,
        metrics_path,
        audit_paths,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mqa_core::CatalogType;

    use super::*;
    use crate::indicators::Dimension;
    use crate::model::{EvaluationTimings, PopulationCounts, ReportSummary};
    use crate::reachability::UnreachableUrl;

    fn row(label: &str, count: i64, population: u64, percentage: f64, points: f64, weight: u32) -> IndicatorRow {
        IndicatorRow {
            key: label.to_string(),
            dimension: Dimension::Findability,
            label: label.to_string(),
            count,
            population,
            percentage,
            points,
            weight,
        }
    }

    fn report(rows: Vec<IndicatorRow>) -> EvaluationReport {
        EvaluationReport {
            generated_at: Utc::now(),
            catalog_type: CatalogType::CkanUris,
            populations: PopulationCounts {
                datasets: 3,
                distributions: 0,
            },
            rows,
            summary: ReportSummary {
                total_points: 50.0,
                weight_total: 405,
                ratio: 0.12,
                rating: "Bad".to_string(),
            },
            audits: Vec::new(),
            timings: EvaluationTimings::default(),
        }
    }

    #[test]
    fn formats_decimals_with_fraction() {
        assert_eq!(format_decimal(30.0), "30.0");
        assert_eq!(format_decimal(0.67), "0.67");
        assert_eq!(format_decimal(33.33), "33.33");
        assert_eq!(format_decimal(0.0), "0.0");
    }

    #[test]
    fn renders_rows_and_summary() {
        let text = render_results(&report(vec![
            row("dcat:keyword", 3, 3, 1.0, 30.0, 30),
            row("dct:spatial", 0, 3, 0.0, 0.0, 20),
            row("dcat:byteSize", 0, 0, 0.0, 0.0, 5),
            row("DCAT-AP compliance", -1, 3, -0.33, 0.0, 30),
        ]));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], RESULTS_HEADER);
        assert_eq!(lines[1], "Findability\tdcat:keyword\t3\t3\t1.0\t30.0\t30");
        assert_eq!(lines[2], "Findability\tdct:spatial\t0\t3\t0.0\t0\t20");
        assert_eq!(lines[3], "Findability\tdcat:byteSize\t0\t0\t0\t0\t5");
        assert_eq!(lines[4], "Findability\tDCAT-AP compliance\t-1\t3\t-0.33\t0\t30");
        assert_eq!(lines[5], "Total points\tRating: Bad\t\t\t0.12\t50.0\t405");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn audit_files_follow_property_names() {
        let (file, body) = render_audit(
            "catalog",
            &AuditRecord::UnreachableUrls {
                indicator: "accessibility_access_url_code_200".to_string(),
                property: "dcat:accessURL".to_string(),
                urls: vec![UnreachableUrl {
                    url: "http://example.org/broken".to_string(),
                    occurrences: 2,
                }],
            },
        );
        assert_eq!(file, "catalog_errors_dcat_accessURL.txt");
        assert_eq!(body, "http://example.org/broken\t2\n");

        let (file, body) = render_audit(
            "catalog",
            &AuditRecord::ShaclReport {
                indicator: "interoperability_dcat_ap_compliance".to_string(),
                diagnostics: "Conforms: False".to_string(),
            },
        );
        assert_eq!(file, "catalog_errors_SHACL.txt");
        assert_eq!(body, "Conforms: False");
    }

    #[test]
    fn writes_results_metrics_and_audits() {
        let dir = std::env::temp_dir().join(format!("mqa_report_{}", uuid::Uuid::new_v4()));
        let mut evaluation = report(vec![row("dcat:keyword", 3, 3, 1.0, 30.0, 30)]);
        evaluation.audits.push(AuditRecord::UnreachableUrls {
            indicator: "reach".to_string(),
            property: "dcat:downloadURL".to_string(),
            urls: Vec::new(),
        });

        let paths = write_artifacts(&evaluation, &dir, "catalog").unwrap();
        assert_eq!(paths.results_path, dir.join("catalog_results.txt"));
        assert!(paths.metrics_path.is_file());
        assert_eq!(paths.audit_paths, vec![dir.join("catalog_errors_dcat_downloadURL.txt")]);
        assert_eq!(std::fs::read_to_string(&paths.audit_paths[0]).unwrap(), "");

        let metrics: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&paths.metrics_path).unwrap()).unwrap();
        assert_eq!(metrics["summary"]["rating"], "Bad");
        assert_eq!(metrics["rows"][0]["count"], 3);
    }
}
