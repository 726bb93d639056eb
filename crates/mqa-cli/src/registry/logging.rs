use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::Span;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

use super::{RegistryError, RegistryResult, RunContext};

// URL probing opens one connection per distinct URL; keep the HTTP stack quiet.
const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn,hyper_util=warn";

/// Append JSON events to the run's `logs.ndjson`.
///
/// Events recorded inside the returned span carry the run id and catalog
/// type, so a log file copied out of its run directory still identifies the run.
pub fn init_run_logging(path: &Path, ctx: &RunContext) -> RegistryResult<Span> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // One event per write under the lock, so concurrent probe completions
    // never interleave lines.
    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(Mutex::new(file));

    install(layer)?;

    Ok(tracing::info_span!(
        "run",
        run_id = %ctx.run_id,
        catalog_type = %ctx.catalog_type
    ))
}

/// Plain stderr logs for commands that do not open a run directory.
pub fn init_console_logging() -> RegistryResult<()> {
    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(io::stderr);
    install(layer)
}

fn install<L>(layer: L) -> RegistryResult<()>
where
    L: tracing_subscriber::Layer<tracing_subscriber::Registry> + Send + Sync,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|err| RegistryError::Logging(err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::Utc;
    use mqa_core::CatalogType;

    use super::*;
    use crate::registry::RunOptions;

    #[test]
    fn run_events_carry_run_identity() {
        let dir = std::env::temp_dir().join(format!("mqa_logs_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("logs.ndjson");
        let ctx = RunContext {
            run_id: "run-42".to_string(),
            started_at: Utc::now(),
            catalog: "catalog.ttl".to_string(),
            catalog_type: CatalogType::Edp,
            name: "catalog".to_string(),
            run_dir: dir.clone(),
            options: RunOptions {
                probe_timeout_secs: 10,
                pool_size: 10,
                shacl: false,
                vocabularies: PathBuf::from("vocabs"),
                indicators: None,
            },
        };

        let span = init_run_logging(&path, &ctx).unwrap();
        span.in_scope(|| tracing::info!(event = "indicator_counted", count = 3));

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let counted = lines
            .iter()
            .find(|line| line["fields"]["event"] == "indicator_counted")
            .unwrap();
        assert_eq!(counted["span"]["run_id"], "run-42");
        assert_eq!(counted["span"]["catalog_type"], "edp");
    }
}
