//! Runtime configuration for hosts embedding the diary core.
//!
//! # Responsibility
//! - Collect database path, logging and view settings in one value.
//! - Read overrides from `DIARY_*` environment variables.

use crate::logging::default_log_level;
use crate::view::state::DEFAULT_SHOW_MORE_THRESHOLD;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "DIARY_DB_PATH";
pub const ENV_LOG_DIR: &str = "DIARY_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "DIARY_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "diary.sqlite3";

/// Settings for opening the store and bootstrapping logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiaryConfig {
    pub db_path: PathBuf,
    /// File logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub show_more_threshold: usize,
}

impl Default for DiaryConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_dir: None,
            log_level: default_log_level().to_string(),
            show_more_threshold: DEFAULT_SHOW_MORE_THRESHOLD,
        }
    }
}

impl DiaryConfig {
    /// Defaults overridden by `DIARY_DB_PATH`, `DIARY_LOG_DIR` and
    /// `DIARY_LOG_LEVEL`. Blank variables are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config
    }
}
