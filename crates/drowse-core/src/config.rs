//! Configuration system for drowse.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $DROWSE_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/drowse/config.toml
//!   3. ~/.config/drowse/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrowseConfig {
    pub server: ServerConfig,
    pub detection: DetectionConfig,
    pub sessions: SessionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Threshold used when a detect call does not supply one.
    pub default_threshold: f64,
    /// Auto-clear dwell for a raised alert, in ms. 0 = never auto-clear.
    pub dwell_ms: u64,
    /// Events retained per session.
    pub event_log_capacity: usize,
    pub source: SourceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Retire sessions with no activity for this long. 0 = never.
    pub idle_timeout_secs: u64,
    /// How often the sweeper runs auto-clear and idle expiry.
    pub sweep_interval_ms: u64,
    /// When false, an identity may hold only one live session.
    pub allow_concurrent_sessions: bool,
}

/// Which sample source feeds the detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Simulated,
    Landmarks,
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulated" | "simulation" => Ok(SourceKind::Simulated),
            "landmarks" => Ok(SourceKind::Landmarks),
            other => Err(format!("unknown source: {other}")),
        }
    }
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.20,
            dwell_ms: 3_000,
            event_log_capacity: 20,
            source: SourceKind::Simulated,
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 900,
            sweep_interval_ms: 500,
            allow_concurrent_sessions: true,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("drowse")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl DrowseConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            DrowseConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a config file without applying env overrides.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("DROWSE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&DrowseConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply DROWSE_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("DROWSE_SERVER__HOST") {
            self.server.host = v;
        }
        if let Some(p) = lookup("DROWSE_SERVER__PORT").and_then(|v| v.parse().ok()) {
            self.server.port = p;
        }
        if let Some(t) = lookup("DROWSE_DETECTION__DEFAULT_THRESHOLD").and_then(|v| v.parse().ok()) {
            self.detection.default_threshold = t;
        }
        if let Some(d) = lookup("DROWSE_DETECTION__DWELL_MS").and_then(|v| v.parse().ok()) {
            self.detection.dwell_ms = d;
        }
        if let Some(s) = lookup("DROWSE_DETECTION__SOURCE").and_then(|v| v.parse().ok()) {
            self.detection.source = s;
        }
        if let Some(t) = lookup("DROWSE_SESSIONS__IDLE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.sessions.idle_timeout_secs = t;
        }
        if let Some(v) = lookup("DROWSE_SESSIONS__ALLOW_CONCURRENT") {
            self.sessions.allow_concurrent_sessions = v == "true" || v == "1";
        }
    }
}
