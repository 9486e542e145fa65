//! Configuration loading and value resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (API key only)
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the eBird API token
pub const API_KEY_ENV_VAR: &str = "EBIRDAPIKEY";

/// Default checkpoint location, relative to the working directory
pub const DEFAULT_CHECKPOINT_PATH: &str = "reports/continuation_data.dat";

/// Default output directory for result files
pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Default client-side request rate against the remote service
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;

/// Logging section of the TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive used when neither RUST_LOG nor --verbose is given
    #[serde(default)]
    pub level: Option<String>,
}

/// Contents of `ebrr.toml`
///
/// All keys are optional; a missing file yields `TomlConfig::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub checkpoint_path: Option<PathBuf>,
    #[serde(default)]
    pub reports_dir: Option<PathBuf>,
    #[serde(default)]
    pub requests_per_second: Option<u32>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file is not an error: a warning is logged and defaults are
    /// returned. A file that exists but cannot be read or parsed is a
    /// `Config` error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from an explicit path, or from the platform default location.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) => Self::load(&path),
                None => {
                    warn!("Could not determine config directory, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }
}

/// Platform config file location: `<config_dir>/ebrr/ebrr.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ebrr").join("ebrr.toml"))
}

/// Validate API key (non-empty, non-whitespace, not the "0" placeholder)
pub fn is_valid_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != "0"
}

/// Resolve the eBird API key.
///
/// **Priority:** CLI → ENV (`EBIRDAPIKEY`) → TOML
///
/// The binary's clap `env` binding may already have folded the variable
/// into `cli_arg`; it is read again here for library callers.
pub fn resolve_api_key(cli_arg: Option<&str>, toml_config: &TomlConfig) -> Result<String> {
    if let Some(key) = cli_arg {
        if is_valid_key(key) {
            info!("eBird API key taken from command line or {}", API_KEY_ENV_VAR);
            return Ok(key.trim().to_string());
        }
        warn!("Ignoring invalid eBird API key given on command line");
    }

    if let Ok(key) = std::env::var(API_KEY_ENV_VAR) {
        if is_valid_key(&key) {
            info!("eBird API key loaded from environment variable");
            return Ok(key.trim().to_string());
        }
        warn!("{} is set but empty or a placeholder", API_KEY_ENV_VAR);
    }

    if let Some(key) = toml_config.api_key.as_deref() {
        if is_valid_key(key) {
            info!("eBird API key loaded from TOML config");
            return Ok(key.trim().to_string());
        }
    }

    Err(Error::Config(format!(
        "eBird API key not configured. Please configure using one of:\n\
         1. Command line: --api-key your-key-here\n\
         2. Environment: {}=your-key-here\n\
         3. TOML config: ebrr.toml (api_key = \"your-key\")",
        API_KEY_ENV_VAR
    )))
}

/// Resolve the checkpoint file path
pub fn resolve_checkpoint_path(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    cli_arg
        .map(Path::to_path_buf)
        .or_else(|| toml_config.checkpoint_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CHECKPOINT_PATH))
}

/// Resolve the directory result files are written to
pub fn resolve_reports_dir(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    cli_arg
        .map(Path::to_path_buf)
        .or_else(|| toml_config.reports_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR))
}

/// Resolve the client-side request rate; zero falls back to the default
pub fn resolve_requests_per_second(toml_config: &TomlConfig) -> u32 {
    match toml_config.requests_per_second {
        Some(0) => {
            warn!("requests_per_second = 0 is not allowed, using default");
            DEFAULT_REQUESTS_PER_SECOND
        }
        Some(rate) => rate,
        None => DEFAULT_REQUESTS_PER_SECOND,
    }
}
