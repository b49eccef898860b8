//! Configuration loading and validation
//!
//! This module provides:
//! - `ExchangeConfig` - Runtime configuration for the exchange controller (library-public)
//! - `Config` - Full application configuration loaded from config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Origin the answer service listens on unless configured otherwise
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Port the bundled answer server binds by default
pub const DEFAULT_PORT: u16 = 5000;

/// Shown when a 2xx answer body has no `answer` field
pub const NO_ANSWER_PLACEHOLDER: &str = "(no answer)";

// =============================================================================
// Library-public types
// =============================================================================

/// What to do with an answer that arrives after a newer question was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Render every answer in the order they settle
    #[default]
    KeepAll,
    /// Drop answers to questions that were superseded by a newer one
    LatestOnly,
}

/// Runtime configuration for an [`ExchangeController`](crate::ExchangeController).
///
/// # Example
///
/// ```
/// use tutor::{ExchangeConfig, OverlapPolicy};
///
/// let config = ExchangeConfig {
///     overlap_policy: OverlapPolicy::LatestOnly,
///     ..ExchangeConfig::for_base_url("http://localhost:8080")
/// };
/// assert!(config.unreachable_message.contains("localhost:8080"));
/// ```
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Bot message shown when a cycle fails for any reason
    pub unreachable_message: String,
    /// Bot message shown when the startup liveness probe fails
    pub offline_message: String,
    pub overlap_policy: OverlapPolicy,
}

impl ExchangeConfig {
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            unreachable_message: format!(
                "❌ Error: Cannot connect to backend. Make sure the tutor service is running on {}",
                base_url
            ),
            offline_message: "⚠️ Backend is not running! Please run 'tutor --serve' in another terminal."
                .to_string(),
            overlap_policy: OverlapPolicy::default(),
        }
    }

    /// Build from the application config
    pub fn from_config(config: &Config) -> Self {
        let mut runtime = Self::for_base_url(&config.service.base_url);
        if let Some(ref msg) = config.chat.unreachable_message {
            runtime.unreachable_message = msg.clone();
        }
        if let Some(ref msg) = config.chat.offline_message {
            runtime.offline_message = msg.clone();
        }
        runtime.overlap_policy = config.chat.overlap_policy;
        runtime
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self::for_base_url(DEFAULT_BASE_URL)
    }
}

// =============================================================================
// Application config (config.toml)
// =============================================================================

/// Main configuration structure loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub chat: ChatConfig,
    pub ui: UiConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Get the config directory path (~/.config/tutor)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("tutor"))
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.service.base_url)
            .with_context(|| format!("Invalid service.base_url: {}", self.service.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Unsupported URL scheme for service.base_url: {}", url.scheme());
        }
        if self.service.timeout_secs == Some(0) {
            anyhow::bail!("service.timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

/// Where the answer service lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Request timeout; unset means a request may wait forever
    pub timeout_secs: Option<u64>,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub overlap_policy: OverlapPolicy,
    /// Overrides the default unreachable-backend message
    pub unreachable_message: Option<String>,
    /// Overrides the default liveness warning
    pub offline_message: Option<String>,
    /// Questions offered in the suggestion sidebar
    pub suggestions: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            overlap_policy: OverlapPolicy::default(),
            unreachable_message: None,
            offline_message: None,
            suggestions: vec![
                "What is photosynthesis?".to_string(),
                "Explain gravity".to_string(),
                "What is mitosis?".to_string(),
                "Help me with algebra".to_string(),
                "Tell me about the water cycle".to_string(),
                "What is the capital of France?".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Show the login screen before the chat
    pub show_login: bool,
    pub show_timestamps: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_login: true,
            show_timestamps: true,
        }
    }
}

/// Bundled answer server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}
