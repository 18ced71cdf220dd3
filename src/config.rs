use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration failures. These are the only fatal errors in the
/// process; everything after the poll loop starts is per-tick recoverable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no watch directory configured; set watch.directory in the config file or pass --dir")]
    MissingWatchDirectory,
    #[error("watch directory does not exist: {0}")]
    WatchDirectoryNotFound(PathBuf),
    #[error("watch directory is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("poll interval must be at least 1 second")]
    ZeroPollInterval,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_max_pending_age")]
    pub max_pending_age_seconds: u64,
    #[serde(default = "default_no_pending_timeout")]
    pub no_pending_timeout_seconds: u64,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_max_pending_age() -> u64 {
    6 * 60
}

fn default_no_pending_timeout() -> u64 {
    5 * 60
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            max_pending_age_seconds: default_max_pending_age(),
            no_pending_timeout_seconds: default_no_pending_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_true")]
    pub desktop: bool,
}

fn default_app_name() -> String {
    "WSI Monitor".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            desktop: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wsimon")
            .join("config.toml")
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wsimon")
    }

    /// Resolve and check the watch directory, applying an optional CLI
    /// override. Called once at startup, before the poll loop begins.
    pub fn resolve_watch_directory(
        &self,
        cli_dir: Option<&PathBuf>,
    ) -> Result<PathBuf, ConfigError> {
        let dir = cli_dir
            .or(self.watch.directory.as_ref())
            .ok_or(ConfigError::MissingWatchDirectory)?;

        if !dir.exists() {
            return Err(ConfigError::WatchDirectoryNotFound(dir.clone()));
        }
        if !dir.is_dir() {
            return Err(ConfigError::NotADirectory(dir.clone()));
        }

        Ok(dir.clone())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.poll_interval_seconds == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch: WatchConfig::default(),
            monitor: MonitorConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.monitor.poll_interval_seconds, 30);
        assert_eq!(config.monitor.max_pending_age_seconds, 360);
        assert_eq!(config.monitor.no_pending_timeout_seconds, 300);
        assert_eq!(config.notify.app_name, "WSI Monitor");
        assert!(config.notify.desktop);
        assert!(config.watch.directory.is_none());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = toml::from_str("[watch]\ndirectory = \"/scans\"\n").unwrap();
        assert_eq!(config.watch.directory, Some(PathBuf::from("/scans")));
        assert_eq!(config.monitor.poll_interval_seconds, 30);
    }

    #[test]
    fn missing_watch_directory_is_fatal() {
        let config = Config::default();
        let err = config.resolve_watch_directory(None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingWatchDirectory));
    }

    #[test]
    fn cli_override_wins_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.watch.directory = Some(PathBuf::from("/nonexistent/from-config"));

        let override_dir = dir.path().to_path_buf();
        let resolved = config.resolve_watch_directory(Some(&override_dir)).unwrap();
        assert_eq!(resolved, override_dir);
    }

    #[test]
    fn nonexistent_watch_directory_is_rejected() {
        let mut config = Config::default();
        config.watch.directory = Some(PathBuf::from("/nonexistent/wsimon-test"));
        let err = config.resolve_watch_directory(None).unwrap_err();
        assert!(matches!(err, ConfigError::WatchDirectoryNotFound(_)));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut config = Config::default();
        config.monitor.poll_interval_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroPollInterval)
        ));
    }
}
