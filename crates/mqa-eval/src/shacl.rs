//! Seam to an external SHACL validator.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mqa_core::{CatalogGraph, RdfFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// The three DCAT-AP shape graphs a catalog is validated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeFiles {
    pub shapes: PathBuf,
    pub vocabularies: PathBuf,
    pub deprecated_uris: PathBuf,
}

impl ShapeFiles {
    pub fn new(
        shapes: impl Into<PathBuf>,
        vocabularies: impl Into<PathBuf>,
        deprecated_uris: impl Into<PathBuf>,
    ) -> Self {
        Self {
            shapes: shapes.into(),
            vocabularies: vocabularies.into(),
            deprecated_uris: deprecated_uris.into(),
        }
    }

    pub fn paths(&self) -> [&Path; 3] {
        [&self.shapes, &self.vocabularies, &self.deprecated_uris]
    }

    /// Shape files that do not exist on disk.
    pub fn missing(&self) -> Vec<&Path> {
        self.paths()
            .into_iter()
            .filter(|path| !path.is_file())
            .collect()
    }

    /// Merge the three shape files into one graph (Turtle unless the extension says otherwise).
    pub fn load_graph(&self) -> Result<CatalogGraph, mqa_core::Error> {
        let graph = CatalogGraph::empty()?;
        for path in self.paths() {
            let format = mqa_core::format_from_path(path).unwrap_or(RdfFormat::Turtle);
            graph.load(format, None, std::io::BufReader::new(File::open(path)?))?;
        }
        Ok(graph)
    }
}

/// Validator verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaclOutcome {
    pub conforms: bool,
    /// Validator report text; empty when the catalog conforms.
    pub diagnostics: String,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("graph error: {0}")]
    Graph(#[from] mqa_core::Error),
    #[error("validator failed: {0}")]
    Validator(String),
}

/// Validates a catalog graph against shape graphs.
///
/// Inference is RDFS and validation stops at the first violation.
#[async_trait]
pub trait ShaclOracle: Send + Sync {
    fn name(&self) -> &'static str;

    async fn validate(
        &self,
        graph: &CatalogGraph,
        shapes: &ShapeFiles,
    ) -> Result<ShaclOutcome, OracleError>;
}

/// Runs a pySHACL-compatible command line validator.
///
/// The catalog and the merged shapes are written as N-Triples to a
/// temporary directory. Exit code 0 means conforming, 1 non-conforming
/// (stdout is the report); anything else is a validator failure.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: String,
}

impl CommandOracle {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for CommandOracle {
    fn default() -> Self {
        Self::new("pyshacl")
    }
}

#[async_trait]
impl ShaclOracle for CommandOracle {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn validate(
        &self,
        graph: &CatalogGraph,
        shapes: &ShapeFiles,
    ) -> Result<ShaclOutcome, OracleError> {
        let workdir = tempfile::Builder::new().prefix("mqa-shacl-").tempdir()?;
        let data_path = workdir.path().join("data.nt");
        let shapes_path = workdir.path().join("shapes.nt");
        write_ntriples(graph, &data_path)?;
        write_ntriples(&shapes.load_graph()?, &shapes_path)?;

        debug!(program = %self.program, data = %data_path.display(), "running shacl validator");
        let output = Command::new(&self.program)
            .arg("-s")
            .arg(&shapes_path)
            .args(["-sf", "nt", "-df", "nt", "-i", "rdfs", "--abort"])
            .arg(&data_path)
            .kill_on_drop(true)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        match output.status.code() {
            Some(0) => Ok(ShaclOutcome {
                conforms: true,
                diagnostics: String::new(),
            }),
            Some(1) => Ok(ShaclOutcome {
                conforms: false,
                diagnostics: stdout,
            }),
            code => Err(OracleError::Validator(format!(
                "{} exited with {:?}: {}",
                self.program,
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

fn write_ntriples(graph: &CatalogGraph, path: &Path) -> Result<(), OracleError> {
    let mut writer = graph.write(RdfFormat::NTriples, BufWriter::new(File::create(path)?))?;
    writer.flush()?;
    Ok(())
}
