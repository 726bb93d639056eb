use std::path::{Path, PathBuf};

use mqa_core::CatalogType;
use mqa_eval::{EvaluateOptions, RatingScale, ShapeFiles};
use serde::{Deserialize, Serialize};

use super::atomic::write_bytes_atomic;
use super::{WorkspaceError, WorkspaceResult};

/// Settings file looked up in the working directory when `--config` is absent.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    pub catalog_type: CatalogType,
    /// DCAT-AP release whose SHACL shapes are used.
    pub dcat_ap_version: String,
    /// Replacement indicator table (`[[indicator]]` TOML).
    pub indicators: Option<PathBuf>,
    pub shacl: bool,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            catalog_type: CatalogType::default(),
            dcat_ap_version: "2.1.1".to_string(),
            indicators: None,
            shacl: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub timeout_secs: u64,
    pub pool_size: usize,
    pub user_agent: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        let defaults = EvaluateOptions::default();
        Self {
            timeout_secs: defaults.probe_timeout_secs,
            pool_size: defaults.pool_size,
            user_agent: defaults.user_agent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub vocabularies: PathBuf,
    pub shapes_dir: PathBuf,
    pub shacl_command: String,
    pub run_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            vocabularies: PathBuf::from("vocabs"),
            shapes_dir: PathBuf::from("shapes"),
            shacl_command: "pyshacl".to_string(),
            run_dir: PathBuf::from("runs"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub evaluation: EvaluationSettings,
    pub probe: ProbeSettings,
    pub rating: RatingScale,
    pub paths: PathSettings,
}

impl Settings {
    pub fn evaluate_options(&self) -> EvaluateOptions {
        EvaluateOptions {
            catalog_type: self.evaluation.catalog_type,
            probe_timeout_secs: self.probe.timeout_secs,
            pool_size: self.probe.pool_size,
            user_agent: self.probe.user_agent.clone(),
            rating: self.rating.clone(),
        }
    }

    /// DCAT-AP shape files for the configured release under `shapes_dir`.
    pub fn shape_files(&self) -> ShapeFiles {
        let version = &self.evaluation.dcat_ap_version;
        let dir = &self.paths.shapes_dir;
        ShapeFiles::new(
            dir.join(format!("dcat-ap_{version}_shacl_shapes.ttl")),
            dir.join(format!("dcat-ap_{version}_shacl_mdr-vocabularies.shape.ttl")),
            dir.join(format!("dcat-ap_{version}_shacl_deprecateduris.ttl")),
        )
    }
}

/// Read settings from `path`, or from [`DEFAULT_SETTINGS_FILE`] when it
/// exists, falling back to defaults. An explicit path must exist.
pub fn load_settings(path: Option<&Path>) -> WorkspaceResult<Settings> {
    let path = match path {
        Some(path) if !path.is_file() => {
            return Err(WorkspaceError::Invalid(format!(
                "settings file not found: {}",
                path.display()
            )));
        }
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
            if !fallback.is_file() {
                return Ok(Settings::default());
            }
            fallback
        }
    };

    let content = std::fs::read_to_string(&path)?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> WorkspaceResult<()> {
    let encoded = toml::to_string_pretty(settings)?;
    write_bytes_atomic(path, encoded.as_bytes())
}
