//! Configuration file support for Luna.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/luna/config.toml`.

use crate::predictor::{DEFAULT_CYCLE_WINDOW, MAX_CYCLE_WINDOW};
use crate::{CycleConfig, Error, Goal, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub cycle: CycleProfile,

    #[serde(default)]
    pub prediction: PredictionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// The user's cycle profile, as entered during onboarding
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CycleProfile {
    #[serde(default = "default_cycle_length")]
    pub cycle_length: i64,

    #[serde(default = "default_period_length")]
    pub period_length: i64,

    #[serde(default)]
    pub goal: Goal,

    /// Start of the most recent period, used until days are logged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_period_start: Option<NaiveDate>,
}

impl Default for CycleProfile {
    fn default() -> Self {
        Self {
            cycle_length: default_cycle_length(),
            period_length: default_period_length(),
            goal: Goal::default(),
            last_period_start: None,
        }
    }
}

/// Prediction parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Cycles projected before and after the latest period
    #[serde(default = "default_cycle_window")]
    pub cycle_window: u32,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            cycle_window: default_cycle_window(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("luna")
}

fn default_cycle_length() -> i64 {
    CycleConfig::default().cycle_length
}

fn default_period_length() -> i64 {
    CycleConfig::default().period_length
}

fn default_cycle_window() -> u32 {
    DEFAULT_CYCLE_WINDOW
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        Self::load_or_default(&Self::default_config_path())
    }

    /// Load from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    ///
    /// Out-of-range cycle values are reported but not rejected here; the
    /// predictor answers them with an empty or clamped result and
    /// `luna setup` refuses to write them.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        if let Err(e) = config.validate() {
            tracing::warn!("Config at {:?} has unusual values: {}", path, e);
        }
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("luna").join("config.toml")
    }

    /// Cycle and period lengths for the predictor
    pub fn cycle_config(&self) -> CycleConfig {
        CycleConfig::new(self.cycle.cycle_length, self.cycle.period_length)
    }

    /// Check the cycle profile and prediction window
    pub fn validate(&self) -> Result<()> {
        self.cycle_config().validate()?;
        if !(1..=MAX_CYCLE_WINDOW).contains(&self.prediction.cycle_window) {
            return Err(Error::Config(format!(
                "cycle_window must be between 1 and {}, got {}",
                MAX_CYCLE_WINDOW, self.prediction.cycle_window
            )));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cycle.cycle_length, 28);
        assert_eq!(config.cycle.period_length, 5);
        assert_eq!(config.cycle.goal, Goal::Tracking);
        assert_eq!(config.prediction.cycle_window, 6);
        assert!(config.data.data_dir.ends_with("luna"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.cycle.last_period_start = NaiveDate::from_ymd_opt(2024, 1, 1);
        config.cycle.goal = Goal::Fertility;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.cycle.last_period_start, config.cycle.last_period_start);
        assert_eq!(parsed.cycle.goal, Goal::Fertility);
        assert_eq!(parsed.cycle_config(), config.cycle_config());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[cycle]
cycle_length = 32
goal = "fertility"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cycle.cycle_length, 32);
        assert_eq!(config.cycle.period_length, 5); // default
        assert_eq!(config.cycle.goal, Goal::Fertility);
        assert_eq!(config.prediction.cycle_window, 6); // default
    }

    #[test]
    fn test_validate_rejects_out_of_domain_values() {
        let mut config = Config::default();
        config.cycle.cycle_length = 60;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.cycle.period_length = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.prediction.cycle_window = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.prediction.cycle_window = MAX_CYCLE_WINDOW + 1;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_keeps_unusual_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[cycle]\ncycle_length = 0\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.cycle.cycle_length, 0);
    }

    #[test]
    fn test_damaged_period_length_does_not_stall_prediction() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[cycle]\nperiod_length = 3000000\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.cycle.period_length, 3_000_000);

        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let prediction = crate::predict_cycle(
            &[day],
            &crate::LoggedDays::new(),
            config.cycle_config(),
            day,
        );
        assert!(prediction.is_empty());
    }

    #[test]
    fn test_save_and_load_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.cycle.cycle_length = 30;
        config.save_to(&path).unwrap();

        let loaded = Config::load_or_default(&path).unwrap();
        assert_eq!(loaded.cycle.cycle_length, 30);

        let missing = Config::load_or_default(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing.cycle.cycle_length, 28);
    }
}
