//! CLI argument definitions for the Diktat application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use diktat_core::config::DiktatConfig;

/// Diktat - a dictation trainer served over HTTP.
#[derive(Parser, Debug, Default)]
#[command(name = "diktat", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Data directory for the user database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Directory containing the dictation text files.
    #[arg(long = "dictations-dir")]
    pub dictations_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > DIKTAT_CONFIG env var > ~/.diktat/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.resolve_config_path_with(env)
    }

    fn resolve_config_path_with(&self, env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env("DIKTAT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Apply flag and environment overrides on top of a loaded config.
    pub fn apply(&self, config: &mut DiktatConfig) {
        self.apply_with(config, env)
    }

    fn apply_with(&self, config: &mut DiktatConfig, env: impl Fn(&str) -> Option<String>) {
        if let Some(port) = self
            .port
            .or_else(|| env("DIKTAT_PORT").and_then(|v| v.parse::<u16>().ok()))
        {
            config.general.port = port;
        }
        if let Some(dir) = path_override(&self.data_dir, env("DIKTAT_DATA_DIR")) {
            config.general.data_dir = dir;
        }
        if let Some(dir) = path_override(&self.dictations_dir, env("DIKTAT_DICTATIONS_DIR")) {
            config.content.dictations_dir = dir;
        }
        if let Some(level) = self.log_level.clone().or_else(|| env("DIKTAT_LOG_LEVEL")) {
            config.general.log_level = level;
        }
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn path_override(flag: &Option<PathBuf>, env_value: Option<String>) -> Option<String> {
    flag.as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .or(env_value)
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".diktat").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".diktat").join("config.toml");
    }
    PathBuf::from("config.toml")
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}
