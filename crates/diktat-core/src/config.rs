use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the Diktat trainer.
///
/// Loaded from `~/.diktat/config.toml` by default. Each section is optional
/// in the file; missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiktatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl DiktatConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DiktatConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory holding the user database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// HTTP port (bound on 127.0.0.1).
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.diktat/data".to_string(),
            log_level: "info".to_string(),
            port: 5000,
        }
    }
}

/// Where dictation texts come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory containing one text file per dictation.
    pub dictations_dir: String,
    /// File extension that marks a dictation file.
    pub extension: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dictations_dir: "diktate".to_string(),
            extension: ".txt".to_string(),
        }
    }
}

/// Account and session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Minimum accepted password length at registration.
    pub min_password_length: usize,
    /// PBKDF2 rounds applied when hashing a new password.
    pub hash_iterations: u32,
    /// Idle sessions older than this are discarded.
    pub session_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_length: 8,
            hash_iterations: 600_000,
            session_ttl_hours: 24,
        }
    }
}

/// Presentation preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme used until a user picks one.
    pub default_theme: String,
    /// Themes a user may select.
    pub themes: Vec<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_theme: "light".to_string(),
            themes: vec!["light".to_string(), "dark".to_string()],
        }
    }
}

impl UiConfig {
    /// Whether `theme` is one of the selectable themes.
    pub fn is_known_theme(&self, theme: &str) -> bool {
        self.themes.iter().any(|t| t == theme)
    }
}
