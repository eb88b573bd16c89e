//! Engine configuration.
//!
//! Every tunable constant lives here so that callers can override it from a
//! JSON or YAML file instead of patching literals spread across builders.
//!
//! ```rust
//! use tl_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.density.cell_size, 500.0);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use std::{env, fs};

use crate::error::{CoreError, Result};

/// Env var pointing at a config file (JSON or YAML by extension).
pub const ENGINE_CONFIG_PATH_ENV: &str = "TL_ENGINE_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub teams: TeamConfig,
    #[serde(default)]
    pub density: DensityConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub year: YearConfig,
}

/// Fixed partition used when the match summary carries no team id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    /// Players per side; ids `1..=team_size` are blue, the next block red.
    pub team_size: u32,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self { team_size: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    /// Grid cell edge in game units.
    pub cell_size: f64,
    /// Memoized density results kept before the memo is flushed.
    pub cache_capacity: usize,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self { cell_size: 500.0, cache_capacity: 64 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Tick period at 1x for single-match replay (ms).
    pub match_interval_ms: u64,
    /// Tick period at 1x for the year recap (ms per minute).
    pub year_interval_ms: u64,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { match_interval_ms: 2000, year_interval_ms: 1000, min_speed: 0.25, max_speed: 4.0 }
    }
}

impl PlaybackConfig {
    pub fn match_interval(&self) -> Duration {
        Duration::from_millis(self.match_interval_ms)
    }

    pub fn year_interval(&self) -> Duration {
        Duration::from_millis(self.year_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Slices on each side of the focus frame included in the bundle window.
    pub window_radius: usize,
    /// Frames on each side of the focus frame counted as "recent" events.
    pub recent_event_window: usize,
    /// Timeline summary keeps every N-th minute.
    pub sample_every_minutes: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { window_radius: 1, recent_event_window: 2, sample_every_minutes: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YearConfig {
    /// Playback length used when a category has no per-minute data.
    pub default_max_minute: u32,
}

impl Default for YearConfig {
    fn default() -> Self {
        Self { default_max_minute: 45 }
    }
}

impl EngineConfig {
    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file; `.yaml`/`.yml` are parsed as YAML, anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|source| CoreError::Io { path: path.to_path_buf(), source })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Config from [`ENGINE_CONFIG_PATH_ENV`], or defaults when the variable is unset or blank.
    pub fn from_env() -> Result<Self> {
        let Ok(path) = env::var(ENGINE_CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        tracing::debug!(path, "loading engine config from env");
        Self::from_file(Path::new(path))
    }

    pub fn validate(&self) -> Result<()> {
        if self.teams.team_size == 0 {
            return Err(CoreError::InvalidConfig("teams.team_size must be > 0".into()));
        }
        if !self.density.cell_size.is_finite() || self.density.cell_size <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "density.cell_size must be a positive number, got {}",
                self.density.cell_size
            )));
        }
        if self.playback.match_interval_ms == 0 || self.playback.year_interval_ms == 0 {
            return Err(CoreError::InvalidConfig("playback intervals must be > 0 ms".into()));
        }
        let PlaybackConfig { min_speed, max_speed, .. } = self.playback;
        if !(min_speed.is_finite() && max_speed.is_finite() && min_speed > 0.0 && min_speed <= max_speed)
        {
            return Err(CoreError::InvalidConfig(format!(
                "playback speed range must satisfy 0 < min <= max, got {min_speed}..{max_speed}"
            )));
        }
        if self.context.sample_every_minutes == 0 {
            return Err(CoreError::InvalidConfig("context.sample_every_minutes must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.teams.team_size, 5);
        assert_eq!(config.playback.match_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config = EngineConfig::from_json(r#"{ "density": { "cell_size": 250.0 } }"#).unwrap();
        assert_eq!(config.density.cell_size, 250.0);
        assert_eq!(config.density.cache_capacity, 64);
        assert_eq!(config.context, ContextConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_cell_size() {
        let mut config = EngineConfig::default();
        config.density.cell_size = 0.0;
        assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));

        config.density.cell_size = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_speed_range() {
        let mut config = EngineConfig::default();
        config.playback.min_speed = 3.0;
        config.playback.max_speed = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parsers_validate() {
        let json = EngineConfig::from_json(r#"{ "playback": { "min_speed": 3.0, "max_speed": 2.0 } }"#);
        assert!(matches!(json, Err(CoreError::InvalidConfig(_))));

        let yaml = EngineConfig::from_yaml("context:\n  sample_every_minutes: 0\n");
        assert!(matches!(yaml, Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_file_reads_yaml() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "teams:\n  team_size: 3\nyear:\n  default_max_minute: 30").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.teams.team_size, 3);
        assert_eq!(config.year.default_max_minute, 30);
    }

    #[test]
    fn test_from_file_missing_path_is_io_error() {
        let result = EngineConfig::from_file(Path::new("/nonexistent/engine.json"));
        assert!(matches!(result, Err(CoreError::Io { .. })));
    }
}
