//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (applied by the binary)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Built-in defaults
//!
//! A missing config file is not fatal: a warning is logged and defaults apply.
//! A config file named explicitly on the command line must exist.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const ENV_CONFIG: &str = "NCR_CONFIG";
/// Environment variable overriding `artifacts_dir`
pub const ENV_ARTIFACTS_DIR: &str = "NCR_ARTIFACTS_DIR";
/// Environment variable overriding `server.port`
pub const ENV_PORT: &str = "NCR_PORT";
/// Environment variable holding the LLM API key
pub const ENV_LLM_API_KEY: &str = "DASHSCOPE_API_KEY";
/// Environment variable overriding `llm.base_url`
pub const ENV_LLM_BASE_URL: &str = "DASHSCOPE_BASE_URL";

/// Root configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NcrConfig {
    /// Directory holding the model artifacts (manifest + JSON models)
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    #[serde(default)]
    pub cascade: CascadeConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

/// Gate and threshold settings for the prediction cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Stage-1 confidence below this yields the unknown triple
    #[serde(default = "default_unknown_threshold")]
    pub unknown_threshold: f32,

    /// Optional stage-2 confidence gate (absent = no gate)
    #[serde(default)]
    pub root_cause_threshold: Option<f32>,

    /// Optional stage-3 confidence gate (absent = no gate)
    #[serde(default)]
    pub corrective_action_threshold: Option<f32>,

    /// Minimum character count of meaningful text
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Minimum share of alphabetic characters in meaningful text
    #[serde(default = "default_min_alpha_ratio")]
    pub min_alpha_ratio: f32,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Free-text LLM predictor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_artifacts_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ncr").join("models"))
        .unwrap_or_else(|| PathBuf::from("./models"))
}

fn default_unknown_threshold() -> f32 {
    0.30
}

fn default_min_text_length() -> usize {
    5
}

fn default_min_alpha_ratio() -> f32 {
    0.3
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5790
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_base_url() -> String {
    "https://dashscope-intl.aliyuncs.com/compatible-mode/v1".to_string()
}

fn default_llm_model() -> String {
    "qwen-plus".to_string()
}

fn default_llm_temperature() -> f32 {
    0.3
}

fn default_llm_max_tokens() -> u32 {
    200
}

fn default_llm_timeout_secs() -> u64 {
    30
}

impl Default for NcrConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
            cascade: CascadeConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            unknown_threshold: default_unknown_threshold(),
            root_cause_threshold: None,
            corrective_action_threshold: None,
            min_text_length: default_min_text_length(),
            min_alpha_ratio: default_min_alpha_ratio(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl NcrConfig {
    /// Load configuration with full resolution
    ///
    /// `cli_path` is the `--config` argument if given. Environment overrides
    /// are applied after the file is read, then the result is validated.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_path(cli_path)? {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                warn!("No configuration file found, using built-in defaults");
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse a TOML document without environment overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(dir) = non_empty_env(ENV_ARTIFACTS_DIR) {
            self.artifacts_dir = PathBuf::from(dir);
        }

        if let Some(port) = non_empty_env(ENV_PORT) {
            self.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid {}='{}': {}", ENV_PORT, port, e)))?;
        }

        if let Some(key) = non_empty_env(ENV_LLM_API_KEY) {
            self.llm.api_key = Some(key);
        }

        if let Some(url) = non_empty_env(ENV_LLM_BASE_URL) {
            self.llm.base_url = url;
        }

        Ok(())
    }

    /// Reject out-of-range settings
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("cascade.unknown_threshold", self.cascade.unknown_threshold)?;
        if let Some(t) = self.cascade.root_cause_threshold {
            check_unit_interval("cascade.root_cause_threshold", t)?;
        }
        if let Some(t) = self.cascade.corrective_action_threshold {
            check_unit_interval("cascade.corrective_action_threshold", t)?;
        }
        check_unit_interval("cascade.min_alpha_ratio", self.cascade.min_alpha_ratio)?;

        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if self.llm.max_tokens == 0 {
            return Err(Error::Config("llm.max_tokens must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::Config(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Locate the config file
///
/// **Priority:** CLI argument → `NCR_CONFIG` → `<config_dir>/ncr/config.toml`
///
/// Returns `Ok(None)` when no file is configured and the default location is
/// absent. An explicitly named file (CLI or environment) must exist.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = cli_path {
        return require_existing(path.to_path_buf());
    }

    if let Some(path) = non_empty_env(ENV_CONFIG) {
        return require_existing(PathBuf::from(path));
    }

    Ok(default_config_path().filter(|p| p.exists()))
}

fn require_existing(path: PathBuf) -> Result<Option<PathBuf>> {
    if path.exists() {
        Ok(Some(path))
    } else {
        Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )))
    }
}

/// Platform config location (`~/.config/ncr/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ncr").join("config.toml"))
}
