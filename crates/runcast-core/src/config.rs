// Configuration loading and validation (config/runcast.toml).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::weights::ModelWeights;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// runcast.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseSection,
    pub data: DataSection,
    #[serde(default)]
    pub projection: ProjectionSection,
    /// Overrides layered on the default calibration when the weight store
    /// is first seeded.
    #[serde(default)]
    pub weights: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSection {
    pub dataset: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionSection {
    #[serde(default = "default_park_factor")]
    pub default_park_factor: f64,
}

impl Default for ProjectionSection {
    fn default() -> Self {
        ProjectionSection {
            default_park_factor: default_park_factor(),
        }
    }
}

fn default_park_factor() -> f64 {
    1.0
}

impl Config {
    /// The default calibration with this config's overrides applied.
    pub fn seed_weights(&self) -> ModelWeights {
        ModelWeights::from_map(&self.weights)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and validate `config/runcast.toml` relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer [`load_config`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("runcast.toml");
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Copy each file in `defaults/` into `config/` unless a file of that name
/// is already there. `*.example` files stay behind. Returns the paths
/// written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (false, true) => return Ok(Vec::new()),
        (false, false) => {
            return Err(copy_error(format!(
                "neither defaults/ nor config/ found under {}",
                base_dir.display()
            )))
        }
        _ => {}
    }

    fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;
    let entries = fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?;

    let mut copied = Vec::new();
    for entry in entries {
        let source = entry
            .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?
            .path();
        let Some(file_name) = source.file_name() else {
            continue;
        };
        if !source.is_file() || source.extension().is_some_and(|ext| ext == "example") {
            continue;
        }
        let target = config_dir.join(file_name);
        if copy_if_absent(&source, &target)? {
            info!("Initialized {} from defaults", target.display());
            copied.push(target);
        }
    }
    Ok(copied)
}

/// Copy `source` to `target` only when `target` does not exist yet.
fn copy_if_absent(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match fs::OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("cannot create {}: {e}", target.display()))),
    };
    let mut src = fs::File::open(source)
        .map_err(|e| copy_error(format!("cannot read {}: {e}", source.display())))?;
    io::copy(&mut src, &mut dest)
        .map_err(|e| copy_error(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Load config relative to `base_dir`, copying defaults in first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.database.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.data.dataset.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.dataset".into(),
            message: "must not be empty".into(),
        });
    }

    let park = config.projection.default_park_factor;
    if !park.is_finite() || park <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "projection.default_park_factor".into(),
            message: format!("must be > 0, got {park}"),
        });
    }

    // Sorted so the reported field is deterministic.
    let mut names: Vec<&String> = config.weights.keys().collect();
    names.sort();
    for name in names {
        if !ModelWeights::is_known(name) {
            return Err(ConfigError::ValidationError {
                field: format!("weights.{name}"),
                message: "unknown model weight".into(),
            });
        }
        let value = config.weights[name];
        if !value.is_finite() {
            return Err(ConfigError::ValidationError {
                field: format!("weights.{name}"),
                message: format!("must be finite, got {value}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
