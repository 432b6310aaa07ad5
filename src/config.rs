//! Application configuration
//!
//! Loaded from a TOML file; every section and field has a default so a
//! partial (or empty) file is valid.
//!
//! ```toml
//! [server]
//! api_host = "0.0.0.0"
//! api_port = 8080
//!
//! [lock_store]
//! backend = "redis"
//! redis_url = "redis://127.0.0.1:6379"
//! seat_lock_ttl_secs = 120
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::booking::BookingSettings;
use crate::application::payment::PaymentOutcome;
use crate::notifications::DispatcherSettings;
use crate::shared::retry::RetryConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Default config location: `~/.config/seat-booking/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seat-booking")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub lock_store: LockStoreConfig,
    pub notifications: NotificationConfig,
    pub payment: PaymentConfig,
    pub logging: LoggingConfig,
    pub seed: SeedConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.api_port == 0 {
            return Err(ConfigError::Invalid("server.api_port must be non-zero".into()));
        }
        if self.lock_store.seat_lock_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "lock_store.seat_lock_ttl_secs must be greater than zero".into(),
            ));
        }
        if self.lock_store.key_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("lock_store.key_prefix must not be empty".into()));
        }
        if self.lock_store.backend == LockBackend::Redis && self.lock_store.redis_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "lock_store.redis_url is required for the redis backend".into(),
            ));
        }
        if self.notifications.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "notifications.queue_capacity must be greater than zero".into(),
            ));
        }
        if self.notifications.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "notifications.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ── Sections ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight work after a shutdown signal
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Full connection URL; overrides `sqlite_path` when set
    pub url: Option<String>,
    pub sqlite_path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            sqlite_path: "./seat-booking.db".to_string(),
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => format!("sqlite://{}?mode=rwc", self.sqlite_path),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockStoreConfig {
    pub backend: LockBackend,
    pub redis_url: String,
    pub key_prefix: String,
    pub seat_lock_ttl_secs: u64,
    /// Only the holder may release a seat lock
    pub verify_owner_on_release: bool,
}

impl Default for LockStoreConfig {
    fn default() -> Self {
        Self {
            backend: LockBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "booking:lock".to_string(),
            seat_lock_ttl_secs: 120,
            verify_owner_on_release: true,
        }
    }
}

impl LockStoreConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.seat_lock_ttl_secs)
    }

    pub fn booking_settings(&self) -> BookingSettings {
        BookingSettings {
            verify_owner_on_release: self.verify_owner_on_release,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub queue_capacity: usize,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            timeout_secs: 5,
            max_attempts: 3,
            initial_backoff_ms: 200,
        }
    }
}

impl NotificationConfig {
    pub fn dispatcher_settings(&self) -> DispatcherSettings {
        DispatcherSettings {
            queue_capacity: self.queue_capacity,
            timeout: Duration::from_secs(self.timeout_secs),
            retry: RetryConfig {
                max_attempts: self.max_attempts,
                initial_delay: Duration::from_millis(self.initial_backoff_ms),
                ..RetryConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub outcome: PaymentOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Create a demo requester and show when the database is empty
    pub demo_data: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { demo_data: true }
    }
}
