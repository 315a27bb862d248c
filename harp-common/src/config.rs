//! Configuration loading and resolution
//!
//! Every setting follows the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is never fatal: the resolver logs a warning and
//! continues with defaults. A TOML file that exists but cannot be parsed
//! is a configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the listen host
pub const ENV_HOST: &str = "HARP_HOST";
/// Environment variable overriding the listen port
pub const ENV_PORT: &str = "HARP_PORT";
/// Environment variable overriding the classifier artifact path
pub const ENV_MODEL_PATH: &str = "HARP_MODEL_PATH";
/// Environment variable pointing at an explicit TOML config file
pub const ENV_CONFIG: &str = "HARP_CONFIG";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

/// Upload size limit applied when none is configured
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Bootstrap configuration loaded from TOML file
///
/// All keys are optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Listen host
    #[serde(default)]
    pub host: Option<String>,

    /// Listen port
    #[serde(default)]
    pub port: Option<u16>,

    /// Path to the classifier artifact (JSON)
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Maximum accepted upload size in bytes
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

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

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))
    }
}

/// OS-dependent compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was compiled for
    pub fn for_current_platform() -> Self {
        let model_path = dirs::data_local_dir()
            .map(|d| d.join("harp").join("model.json"))
            .unwrap_or_else(|| PathBuf::from("./harp_data/model.json"));

        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_level: default_log_level(),
        }
    }
}

/// Values supplied on the command line (highest priority)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub max_upload_bytes: usize,
    pub log_level: String,
    /// TOML file the configuration was read from, if any
    pub config_file: Option<PathBuf>,
}

impl ServiceConfig {
    /// `host:port` string suitable for binding a listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolves [`ServiceConfig`] for a named module
pub struct ConfigResolver {
    module_name: String,
}

impl ConfigResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// Resolve configuration from CLI → ENV → TOML → defaults
    pub fn resolve(&self, cli: &CliOverrides) -> Result<ServiceConfig> {
        let defaults = CompiledDefaults::for_current_platform();
        let (toml_config, config_file) = self.load_toml(cli)?;

        let host = cli
            .host
            .clone()
            .or_else(|| env_value(ENV_HOST))
            .or(toml_config.host)
            .unwrap_or(defaults.host);

        let port = match cli.port {
            Some(port) => port,
            None => match env_value(ENV_PORT) {
                Some(raw) => raw.parse::<u16>().map_err(|e| {
                    Error::Config(format!("{} must be a port number, got '{}': {}", ENV_PORT, raw, e))
                })?,
                None => toml_config.port.unwrap_or(defaults.port),
            },
        };

        let model_path = cli
            .model_path
            .clone()
            .or_else(|| env_value(ENV_MODEL_PATH).map(PathBuf::from))
            .or(toml_config.model_path)
            .unwrap_or(defaults.model_path);

        let max_upload_bytes = toml_config
            .max_upload_bytes
            .unwrap_or(defaults.max_upload_bytes);
        if max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes must be greater than 0".to_string()));
        }

        Ok(ServiceConfig {
            host,
            port,
            model_path,
            max_upload_bytes,
            log_level: toml_config.logging.level,
            config_file,
        })
    }

    /// Locate and parse the TOML file, tolerating its absence
    fn load_toml(&self, cli: &CliOverrides) -> Result<(TomlConfig, Option<PathBuf>)> {
        let explicit = cli
            .config_path
            .clone()
            .or_else(|| env_value(ENV_CONFIG).map(PathBuf::from));

        let path = match explicit {
            Some(path) if path.exists() => path,
            Some(path) => {
                warn!(
                    "Config file {} not found, using defaults",
                    path.display()
                );
                return Ok((TomlConfig::default(), None));
            }
            None => match self.default_config_path() {
                Some(path) => path,
                None => return Ok((TomlConfig::default(), None)),
            },
        };

        let config = TomlConfig::load(&path)?;
        info!("Loaded configuration from {}", path.display());
        Ok((config, Some(path)))
    }

    /// First existing platform config file for this module
    fn default_config_path(&self) -> Option<PathBuf> {
        let file_name = format!("{}.toml", self.module_name);
        let user_config = dirs::config_dir().map(|d| d.join("harp").join(&file_name));

        if let Some(path) = user_config {
            if path.exists() {
                return Some(path);
            }
        }

        if cfg!(target_os = "linux") {
            let system_config = PathBuf::from("/etc/harp").join(&file_name);
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
