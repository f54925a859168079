//! Runtime configuration: database location, pool sizing, log level.

use crate::error::AppError;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "FINSIGHT_DB_PATH";
pub const ENV_POOL_SIZE: &str = "FINSIGHT_POOL_SIZE";
pub const ENV_BUSY_TIMEOUT_MS: &str = "FINSIGHT_BUSY_TIMEOUT_MS";
pub const ENV_LOG: &str = "FINSIGHT_LOG";

/// Default file name, resolved against the working directory.
pub const DEFAULT_DB_FILE: &str = "finsight.db";

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub db_path: PathBuf,
    pub pool_size: u32,
    pub busy_timeout: Duration,
    pub log_level: LevelFilter,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            pool_size: 4,
            busy_timeout: Duration::from_millis(5000),
            log_level: LevelFilter::Info,
        }
    }
}

impl LedgerConfig {
    /// Defaults with a different database file.
    pub fn with_db_path(path: impl AsRef<Path>) -> Self {
        Self {
            db_path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `FINSIGHT_*` environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH).filter(|s| !s.trim().is_empty()) {
            config.db_path = PathBuf::from(path.trim());
        }
        if let Some(raw) = lookup(ENV_POOL_SIZE) {
            config.pool_size = match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(AppError::InvalidInput(format!(
                        "{} must be a positive integer, got {:?}",
                        ENV_POOL_SIZE, raw
                    )))
                }
            };
        }
        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| {
                AppError::InvalidInput(format!(
                    "{} must be a number of milliseconds, got {:?}",
                    ENV_BUSY_TIMEOUT_MS, raw
                ))
            })?;
            config.busy_timeout = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup(ENV_LOG) {
            config.log_level = LevelFilter::from_str(raw.trim()).map_err(|_| {
                AppError::InvalidInput(format!("{} is not a log level: {:?}", ENV_LOG, raw))
            })?;
        }

        Ok(config)
    }
}
