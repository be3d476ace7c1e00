//! Configuration loading.
//!
//! Any `serde` type can be read from a TOML file through [`ConfigLoader`].
//! [`SharedConfig`] holds the `[shared]` section every servo tool accepts
//! (log level, instance name); the drive-specific sections live in
//! [`crate::drive_config`].
//!
//! ```rust
//! use servo_common::config::{ConfigLoader, LogLevel};
//! use servo_common::drive_config::DriveConfig;
//!
//! let config = DriveConfig::from_toml(
//!     r#"
//!     [shared]
//!     service_name = "bench"
//!     log_level = "warn"
//!
//!     [transport]
//!     kind = "hardware"
//!     ifname = "eth1"
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.shared.log_level, LogLevel::Warn);
//! ```

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures while reading or checking a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// File exists but could not be read.
    #[error("Cannot read configuration {}: {reason}", .path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// OS error text
        reason: String,
    },

    /// Not valid TOML, or does not match the expected structure.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Parsed but semantically invalid.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log verbosity, written lowercase in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including simulator reactions.
    Trace,
    /// Every register access.
    Debug,
    /// Session lifecycle and completed sequences.
    #[default]
    Info,
    /// Recoverable problems, e.g. a substituted digital-output read.
    Warn,
    /// Failed runs only.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// `[shared]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity; `RUST_LOG` takes precedence.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Name reported in the startup banner.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    crate::consts::SERVO_SERVICE_NAME.to_string()
}

impl SharedConfig {
    /// `service_name` must contain something other than whitespace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "shared.service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

/// TOML loading for any deserializable configuration type.
///
/// Loading does not validate; callers run the type's own `validate()`.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Read and parse `path`.
    ///
    /// # Errors
    /// `FileNotFound`, `Io` for other read failures, `ParseError`.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;
        Self::from_toml(&content)
    }

    /// Parse TOML text.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
