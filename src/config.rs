//! Runtime settings.
//!
//! Layered in this order, later layers winning:
//! - built-in defaults
//! - a JSON file named by `ANAGRAM_CONFIG`
//! - `ANAGRAM_PROGRESS_INTERVAL` and `ANAGRAM_LOG`
//!
//! ```
//! use anagram_core::config::Settings;
//!
//! let settings = Settings::default();
//! assert_eq!(settings.progress_interval, 1000);
//! ```

use crate::error::{AnagramError, AnagramResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_ENV: &str = "ANAGRAM_CONFIG";
pub const PROGRESS_INTERVAL_ENV: &str = "ANAGRAM_PROGRESS_INTERVAL";
pub const LOG_FILTER_ENV: &str = "ANAGRAM_LOG";

const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Lines between indexing progress reports; 0 turns them off.
    pub progress_interval: u64,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn load() -> AnagramResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads settings using `env` as the variable lookup.
    pub fn load_with<F>(env: F) -> AnagramResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match env(CONFIG_FILE_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(value) = env(PROGRESS_INTERVAL_ENV) {
            settings.progress_interval =
                value.trim().parse().map_err(|_| AnagramError::Config {
                    reason: format!("{PROGRESS_INTERVAL_ENV} must be a non-negative integer, got '{value}'"),
                })?;
        }
        if let Some(value) = env(LOG_FILTER_ENV) {
            settings.log_filter = value;
        }

        Ok(settings)
    }

    pub fn from_file(path: &Path) -> AnagramResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| AnagramError::Config {
            reason: format!("cannot read '{}': {}", path.display(), e),
        })?;
        serde_json::from_str(&text).map_err(|e| AnagramError::Config {
            reason: format!("cannot parse '{}': {}", path.display(), e),
        })
    }
}
