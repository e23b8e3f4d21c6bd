//! Configuration loading, validation, and management for Switchback.
//!
//! Loads configuration from `~/.switchback/config.toml` with environment
//! variable overrides. Validates all settings before any run starts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use switchback_core::agent::{AgentConfig, PolicyMode};

/// The root configuration structure.
///
/// Maps directly to `~/.switchback/config.toml`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Strategy selection and rebranch behavior
    #[serde(default)]
    pub agent: AgentConfig,

    /// Per-run limits
    #[serde(default)]
    pub run: RunConfig,

    /// Completion service used by the reasoning strategy
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Code search service used by the retrieval strategy
    #[serde(default)]
    pub github: GithubConfig,

    /// Task pre-filter settings
    #[serde(default)]
    pub safety: SafetyConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("agent", &self.agent)
            .field("run", &self.run)
            .field("openai", &self.openai)
            .field("github", &self.github)
            .field("safety", &self.safety)
            .finish()
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("enabled", &self.enabled)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("enabled", &self.enabled)
            .field("token", &redact(&self.token))
            .field("api_url", &self.api_url)
            .field("per_page", &self.per_page)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Upper bound on steps per run
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_max_steps() -> u32 {
    12
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_openai_model() -> String {
    "gpt-4o-mini".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_openai_timeout() -> u64 {
    60
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_openai_model(),
            api_key: None,
            base_url: default_openai_base_url(),
            timeout_secs: default_openai_timeout(),
        }
    }
}

impl OpenAiConfig {
    /// Credentials present and not switched off.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Optional; unauthenticated search works at a lower rate limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    #[serde(default = "default_per_page")]
    pub per_page: usize,

    #[serde(default = "default_github_timeout")]
    pub timeout_secs: u64,
}

fn default_github_api_url() -> String {
    "https://api.github.com".into()
}
fn default_per_page() -> usize {
    3
}
fn default_github_timeout() -> u64 {
    10
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token: None,
            api_url: default_github_api_url(),
            per_page: default_per_page(),
            timeout_secs: default_github_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Terms blocked in addition to the built-in deny-list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_blocked_terms: Vec<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.switchback/config.toml).
    ///
    /// Environment variables override the file:
    /// - `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_MODEL`
    /// - `GITHUB_TOKEN`
    /// - `SWITCHBACK_POLICY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Credentials only fill gaps; model, base URL and policy replace file values.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.openai.api_key.is_none() {
            self.openai.api_key = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty());
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.openai.model = model;
        }
        if self.github.token.is_none() {
            self.github.token = lookup("GITHUB_TOKEN").filter(|t| !t.is_empty());
        }
        if let Some(policy) = lookup("SWITCHBACK_POLICY") {
            self.agent.policy.mode = policy
                .parse::<PolicyMode>()
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    ///
    /// `SWITCHBACK_HOME` wins over `~/.switchback`.
    pub fn config_dir() -> PathBuf {
        match std::env::var("SWITCHBACK_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs_home().join(".switchback"),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.agent
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if self.github.per_page == 0 || self.github.per_page > 100 {
            return Err(ConfigError::ValidationError(
                "github.per_page must be between 1 and 100".into(),
            ));
        }

        if self.safety.extra_blocked_terms.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "safety.extra_blocked_terms must not contain empty terms".into(),
            ));
        }

        Ok(())
    }

    /// Render as TOML with credentials stripped.
    pub fn to_redacted_toml(&self) -> String {
        let mut config = self.clone();
        config.openai.api_key = None;
        config.github.token = None;
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        Self::default().to_redacted_toml()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
