//! Run directories: `run.json` metadata, the archived catalog and the
//! NDJSON event log of one `mqa evaluate` invocation.

mod logging;
mod run;

use std::io;
use std::path::PathBuf;

pub use logging::{init_console_logging, init_run_logging};
pub use run::{RunContext, RunOptions, RunPaths, start_run};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot create run directory {}: {source}", path.display())]
    RunDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot encode run metadata: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot install logger: {0}")]
    Logging(String),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
