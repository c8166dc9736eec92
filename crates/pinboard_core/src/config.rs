//! Service configuration sourced from the process environment.
//!
//! # Responsibility
//! - Resolve the store descriptor, log level/target and busy timeout.
//! - Report unusable values with the offending variable name.
//!
//! # Invariants
//! - `PINBOARD_DATABASE_URL` wins over `DATABASE_URL`.
//! - Blank variables are treated as unset.

use crate::db::{DbResult, SqliteSource, DEFAULT_BUSY_TIMEOUT};
use crate::logging::{default_log_level, LogTarget};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DATABASE_URL_VAR: &str = "PINBOARD_DATABASE_URL";
pub const FALLBACK_DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const LOG_LEVEL_VAR: &str = "PINBOARD_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "PINBOARD_LOG_DIR";
pub const BUSY_TIMEOUT_VAR: &str = "PINBOARD_BUSY_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVariable(&'static str),
    InvalidValue {
        variable: &'static str,
        value: String,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVariable(variable) => {
                write!(f, "environment variable `{variable}` is not set")
            }
            Self::InvalidValue {
                variable,
                value,
                message,
            } => write!(f, "invalid `{variable}` value `{value}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Runtime configuration for one handler process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Connection descriptor, see [`crate::db::parse_descriptor`].
    pub database_url: String,
    pub log_level: String,
    pub log_target: LogTarget,
    pub busy_timeout: Duration,
}

impl ServiceConfig {
    /// Configuration with defaults for everything but the store descriptor.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            log_level: default_log_level().to_string(),
            log_target: LogTarget::Stderr,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url = read(DATABASE_URL_VAR)
            .or_else(|| read(FALLBACK_DATABASE_URL_VAR))
            .ok_or(ConfigError::MissingVariable(DATABASE_URL_VAR))?;
        let mut config = Self::new(database_url);

        if let Some(level) = read(LOG_LEVEL_VAR) {
            config.log_level = level;
        }

        if let Some(dir) = read(LOG_DIR_VAR) {
            let path = PathBuf::from(&dir);
            if !path.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    variable: LOG_DIR_VAR,
                    value: dir,
                    message: "must be an absolute path".to_string(),
                });
            }
            config.log_target = LogTarget::Directory(path);
        }

        if let Some(raw) = read(BUSY_TIMEOUT_VAR) {
            let millis = raw.parse::<u64>().map_err(|err| ConfigError::InvalidValue {
                variable: BUSY_TIMEOUT_VAR,
                value: raw.clone(),
                message: err.to_string(),
            })?;
            config.busy_timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// Connection source for the configured descriptor.
    pub fn connection_source(&self) -> DbResult<SqliteSource> {
        Ok(SqliteSource::from_descriptor(&self.database_url)?.with_busy_timeout(self.busy_timeout))
    }
}
