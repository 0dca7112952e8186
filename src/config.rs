//! Configuration management for olist-query.
//!
//! Handles loading configuration from TOML files and environment variables.
//! Precedence, lowest to highest: built-in defaults, config file, environment,
//! command-line flags (applied by the caller).

use crate::error::{QueryError, Result};
use crate::llm::LlmProvider;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default row cap appended to queries without a LIMIT clause.
pub const DEFAULT_MAX_ROWS: usize = 500;

/// Default number of correction rounds after a failed execution.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Longest question accepted at the boundary.
pub const DEFAULT_QUESTION_MAX_CHARS: usize = 500;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Analytical database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Retry loop and result limits.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Validator settings.
    #[serde(default)]
    pub safety: SafetyConfig,
}

/// Analytical database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("olist.sqlite3")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "anthropic", "openai" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name (e.g., "claude-sonnet-4-20250514").
    #[serde(default)]
    pub model: Option<String>,

    /// API key. Usually supplied through the environment instead.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum tokens the oracle may generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_llm_timeout() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            api_key: None,
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    /// Parses the configured provider name.
    pub fn provider(&self) -> Result<LlmProvider> {
        self.provider.parse().map_err(QueryError::config)
    }

    /// Resolves the credential for the configured provider.
    ///
    /// An explicit `api_key` wins over the provider's environment variable.
    /// Empty strings count as absent.
    pub fn credential(&self) -> Option<String> {
        let from_env = || {
            self.provider()
                .ok()
                .and_then(|p| p.api_key_env())
                .and_then(|var| std::env::var(var).ok())
        };

        let present = |key: &String| !key.trim().is_empty();
        self.api_key
            .clone()
            .filter(present)
            .or_else(|| from_env().filter(present))
    }
}

/// Retry loop and result limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Row cap appended to queries without a LIMIT clause.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Correction rounds allowed after a failed execution.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Longest question accepted.
    #[serde(default = "default_question_max_chars")]
    pub question_max_chars: usize,

    /// Wall-clock budget for one question, in seconds.
    #[serde(default = "default_pipeline_timeout")]
    pub timeout_secs: u64,
}

fn default_max_rows() -> usize {
    DEFAULT_MAX_ROWS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_question_max_chars() -> usize {
    DEFAULT_QUESTION_MAX_CHARS
}

fn default_pipeline_timeout() -> u64 {
    60
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
            max_retries: default_max_retries(),
            question_max_chars: default_question_max_chars(),
            timeout_secs: default_pipeline_timeout(),
        }
    }
}

/// Validator settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct SafetyConfig {
    /// Also require the candidate to parse as exactly one query statement.
    #[serde(default)]
    pub strict_parse: bool,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("olist-query")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| QueryError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            QueryError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("OLIST_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(model) = std::env::var("OLIST_LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Ok(value) = std::env::var("OLIST_MAX_ROWS") {
            self.pipeline.max_rows = value
                .parse()
                .map_err(|_| QueryError::config(format!("Invalid OLIST_MAX_ROWS: '{value}'")))?;
        }
        if let Ok(value) = std::env::var("OLIST_MAX_RETRIES") {
            self.pipeline.max_retries = value.parse().map_err(|_| {
                QueryError::config(format!("Invalid OLIST_MAX_RETRIES: '{value}'"))
            })?;
        }
        self.validate()
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.max_rows == 0 {
            return Err(QueryError::config("max_rows must be greater than zero"));
        }
        if self.pipeline.question_max_chars == 0 {
            return Err(QueryError::config(
                "question_max_chars must be greater than zero",
            ));
        }
        self.llm.provider()?;
        Ok(())
    }
}
