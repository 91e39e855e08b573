//! Client configuration.
//!
//! Resolution order: environment variables → config file → defaults.
//! CLI flags are applied on top by the binary.
//!
//! Config file location:
//!   1. $COURIER_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/courier/config.toml
//!   3. ~/.config/courier/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use ulid::Ulid;

use crate::domain::ids::{ClientId, WorkerId};
use crate::ports::transport::Endpoint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Worker address, `host:port`.
    pub node: String,
    /// TLS certificate. The TCP transport refuses to start when this is set.
    pub cert: Option<PathBuf>,
    /// Stable client id. Generated per process when absent.
    pub client_id: Option<String>,
    pub intended_worker_id: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node: "127.0.0.1:50050".to_string(),
            cert: None,
            client_id: None,
            intended_worker_id: WorkerId::UNASSIGNED.to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl ClientConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_file(&Self::file_path())?;
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Read `path`, or fall back to defaults when it does not exist.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("COURIER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Apply COURIER_* overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(v) = lookup("COURIER_NODE") {
            self.node = v;
        }
        if let Some(v) = lookup("COURIER_CERT") {
            self.cert = (!v.is_empty()).then(|| PathBuf::from(v));
        }
        if let Some(v) = lookup("COURIER_CLIENT_ID") {
            self.client_id = (!v.is_empty()).then_some(v);
        }
        if let Some(v) = lookup("COURIER_INTENDED_WORKER_ID") {
            self.intended_worker_id = v;
        }
        if let Some(v) = lookup("COURIER_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = parse_ms("COURIER_CONNECT_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("COURIER_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = parse_ms("COURIER_REQUEST_TIMEOUT_MS", v)?;
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            address: self.node.clone(),
            cert: self.cert.clone(),
        }
    }

    /// Configured client id, or a fresh ULID-based one.
    pub fn client_id(&self) -> ClientId {
        match self.client_id.as_deref() {
            Some(id) if !id.is_empty() => ClientId::new(id),
            _ => ClientId::new(Ulid::new().to_string()),
        }
    }

    pub fn intended_worker(&self) -> WorkerId {
        if self.intended_worker_id.is_empty() {
            WorkerId::unassigned()
        } else {
            WorkerId::new(self.intended_worker_id.clone())
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_ms(var: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("courier")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
