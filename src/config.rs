use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ConfigError;

/// Tunable timing parameters for the playback engine.
///
/// All values are milliseconds. The defaults reproduce the production
/// behavior; tests shrink them to keep scenarios fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sleep between arbitration scans of the track queues
    pub poll_interval_ms: u64,

    /// Sleep between guard-refresh rounds of a blocking playback unit
    pub guard_refresh_ms: u64,

    /// Settling delay before probing whether a track is busy; a clip started
    /// moments ago may not report as playing without it
    pub busy_settle_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 20,  // fast enough that queued clips feel immediate
            guard_refresh_ms: 500, // controls stay disabled with coarse refresh
            busy_settle_ms: 50,    // 20-50ms is enough for a sink to warm up
        }
    }
}

impl EngineConfig {
    /// Clamp every field into its supported range, warning about adjustments.
    pub fn validated(mut self) -> Self {
        self.poll_interval_ms = clamp_field("poll_interval_ms", self.poll_interval_ms, 1, 1000);
        self.guard_refresh_ms = clamp_field("guard_refresh_ms", self.guard_refresh_ms, 10, 5000);
        self.busy_settle_ms = clamp_field("busy_settle_ms", self.busy_settle_ms, 0, 1000);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn guard_refresh(&self) -> Duration {
        Duration::from_millis(self.guard_refresh_ms)
    }

    pub fn busy_settle(&self) -> Duration {
        Duration::from_millis(self.busy_settle_ms)
    }

    /// Load configuration from the platform-specific config directory.
    /// Creates a default config file if none exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, creating it with defaults
    /// when missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;
            let config: EngineConfig =
                serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.display().to_string(),
                    source: Box::new(e),
                })?;
            info!("Loaded engine config from: {}", path.display());
            Ok(config.validated())
        } else {
            let config = EngineConfig::default();
            config.save_to(path)?;
            info!("Created default engine config at: {}", path.display());
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        fs::write(path, json).map_err(|e| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        Ok(())
    }

    /// Get the config file path (in the platform config directory)
    fn config_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("soundboard").join("config.json"))
    }
}

fn clamp_field(name: &str, value: u64, min: u64, max: u64) -> u64 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!("Config {} = {} out of range, clamped to {}", name, value, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.poll_interval_ms, 20);
        assert_eq!(config.guard_refresh_ms, 500);
        assert_eq!(config.busy_settle_ms, 50);
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_validated_clamps_out_of_range_fields() {
        let config = EngineConfig {
            poll_interval_ms: 0,
            guard_refresh_ms: 60_000,
            busy_settle_ms: 5_000,
        }
        .validated();

        assert_eq!(config.poll_interval_ms, 1);
        assert_eq!(config.guard_refresh_ms, 5000);
        assert_eq!(config.busy_settle_ms, 1000);
    }

    #[test]
    fn test_validated_keeps_in_range_fields() {
        let config = EngineConfig::default().validated();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_duration_accessors() {
        let config = EngineConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(20));
        assert_eq!(config.guard_refresh(), Duration::from_millis(500));
        assert_eq!(config.busy_settle(), Duration::from_millis(50));
    }

    #[test]
    fn test_save_and_load_roundtrip() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join("soundboard_config_test");
        let path = dir.join("config.json");
        let _ = fs::remove_file(&path);

        let config = EngineConfig {
            poll_interval_ms: 10,
            guard_refresh_ms: 100,
            busy_settle_ms: 5,
        };
        config.save_to(&path)?;

        let loaded = EngineConfig::load_from(&path)?;
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir(&dir);
        Ok(())
    }

    #[test]
    fn test_load_missing_creates_default() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join("soundboard_config_create_test");
        let path = dir.join("config.json");
        let _ = fs::remove_file(&path);

        let loaded = EngineConfig::load_from(&path)?;
        assert_eq!(loaded, EngineConfig::default());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir(&dir);
        Ok(())
    }
}
