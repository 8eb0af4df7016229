//! Monitor configuration (TOML)

use crate::error::{MonitorError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CACHE_MAX_AGE_MS: u64 = 2000;
pub const DEFAULT_SAMPLE_BATCH_SIZE: usize = 20;
pub const DEFAULT_HISTORY_LEN: usize = 30;
pub const DEFAULT_PAGE_SIZE: usize = 15;
pub const DEFAULT_VALUE_CHANGE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_REBUILD_RATIO: f64 = 0.5;

/// Short-lived helpers that routinely vanish between listing and sampling.
pub const DEFAULT_EXCLUDED_NAMES: &[&str] = &[
    "wmic.exe",
    "fastlist-0.3.0-x64.exe",
    "lenovoVantage-(GenericTelemetryAddin).exe",
    "lenovoVantage-(ModernPreloadAddin).exe",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub cache_max_age_ms: u64,
    pub sample_batch_size: usize,
    pub history_len: usize,
    pub page_size: usize,
    pub value_change_threshold: f64,
    pub rebuild_ratio: f64,
    pub excluded_names: Vec<String>,
    /// 0 disables the timer; refreshes then only happen on request.
    pub refresh_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            cache_max_age_ms: DEFAULT_CACHE_MAX_AGE_MS,
            sample_batch_size: DEFAULT_SAMPLE_BATCH_SIZE,
            history_len: DEFAULT_HISTORY_LEN,
            page_size: DEFAULT_PAGE_SIZE,
            value_change_threshold: DEFAULT_VALUE_CHANGE_THRESHOLD,
            rebuild_ratio: DEFAULT_REBUILD_RATIO,
            excluded_names: DEFAULT_EXCLUDED_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            refresh_interval_ms: 0,
        }
    }
}

impl MonitorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: MonitorConfig =
            toml::from_str(&content).map_err(|e| MonitorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| MonitorError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Loads `path` if it exists, otherwise the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load config {}: {}, using defaults", path.display(), e);
            Self::default()
        })
    }

    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "procsight")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_batch_size == 0 {
            return Err(MonitorError::Config("sample_batch_size must be > 0".into()));
        }
        if self.history_len == 0 {
            return Err(MonitorError::Config("history_len must be > 0".into()));
        }
        if self.page_size == 0 {
            return Err(MonitorError::Config("page_size must be > 0".into()));
        }
        if !(self.value_change_threshold >= 0.0) || !(self.rebuild_ratio >= 0.0) {
            return Err(MonitorError::Config(
                "thresholds must be non-negative numbers".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_core_constants() {
        let config = MonitorConfig::default();
        assert_eq!(config.cache_max_age_ms, 2000);
        assert_eq!(config.sample_batch_size, 20);
        assert_eq!(config.history_len, 30);
        assert_eq!(config.page_size, 15);
        assert_eq!(config.value_change_threshold, 0.5);
        assert!(config.excluded_names.iter().any(|n| n == "wmic.exe"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let config: MonitorConfig = toml::from_str("page_size = 25\n").unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.history_len, DEFAULT_HISTORY_LEN);
    }

    #[test]
    fn validate_rejects_zero_sizes() {
        let config = MonitorConfig {
            sample_batch_size: 0,
            ..MonitorConfig::default()
        };
        assert!(matches!(config.validate(), Err(MonitorError::Config(_))));

        let config = MonitorConfig {
            value_change_threshold: f64::NAN,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
