//! Configuration loading and data root resolution
//!
//! Bootstrap settings come from a small TOML file. The data root (where
//! partitions and wordlists live) is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `LINGUA_DATA_ROOT` environment variable
//! 3. TOML config file `data_root`
//! 4. Compiled default (fallback)
//!
//! A missing or malformed TOML file never stops startup: it is logged and
//! the compiled defaults are used.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable overriding the data root
pub const DATA_ROOT_ENV: &str = "LINGUA_DATA_ROOT";

/// Wordlist directory relative to the data root
pub const DEFAULT_WORDLIST_SUBDIR: &str = "wordlists/cefr";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Directory holding `<module>/lvl<n>.json` partitions
    #[serde(default)]
    pub data_root: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// CEFR wordlist directory (defaults to `<data_root>/wordlists/cefr`)
    #[serde(default)]
    pub wordlist_dir: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Built-in defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub data_root: PathBuf,
    pub port: u16,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("public").join("data"),
            port: 3000,
            log_level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load `path` (or the platform default location), falling back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let candidate = path.map(Path::to_path_buf).or_else(default_config_path);
        let Some(candidate) = candidate else {
            return Self::default();
        };
        if !candidate.exists() {
            if path.is_some() {
                warn!("Config file {} not found, using defaults", candidate.display());
            }
            return Self::default();
        }
        match Self::from_file(&candidate) {
            Ok(config) => {
                info!("Loaded config from {}", candidate.display());
                config
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }
}

/// `~/.config/lingua/config.toml` (platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lingua").join("config.toml"))
}

/// Resolves the data root from CLI, environment, TOML and compiled default
#[derive(Debug, Clone)]
pub struct DataRootResolver<'a> {
    cli_arg: Option<PathBuf>,
    toml: &'a TomlConfig,
}

impl<'a> DataRootResolver<'a> {
    pub fn new(cli_arg: Option<PathBuf>, toml: &'a TomlConfig) -> Self {
        Self { cli_arg, toml }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }
        if let Ok(path) = std::env::var(DATA_ROOT_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        if let Some(path) = &self.toml.data_root {
            return path.clone();
        }
        CompiledDefaults::default().data_root
    }
}

/// Wordlist directory for a resolved data root
pub fn wordlist_dir(toml: &TomlConfig, data_root: &Path) -> PathBuf {
    toml.wordlist_dir
        .clone()
        .unwrap_or_else(|| data_root.join(DEFAULT_WORDLIST_SUBDIR))
}
