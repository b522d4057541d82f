//! Simulation tuning loaded from a RON file.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::STARTING_MONEY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables shared by every domain plugin.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulated seconds in one in-game day.
    pub seconds_per_day: f32,
    /// Hour of day each morning starts at.
    pub start_hour: f32,
    pub farm_width: i32,
    pub farm_height: i32,
    /// Seed for mining reward rolls.
    pub mining_seed: u64,
    /// Gold lost when the player is still awake at midnight.
    pub pass_out_penalty: u32,
    pub starting_money: i64,
    pub save_dir: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seconds_per_day: 300.0,
            start_hour: 6.0,
            farm_width: 32,
            farm_height: 24,
            mining_seed: 0x5EED_CAFE,
            pass_out_penalty: 200,
            starting_money: STARTING_MONEY,
            save_dir: PathBuf::from("saves"),
        }
    }
}

impl SimConfig {
    pub fn from_ron(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the clock or the farm cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.seconds_per_day.is_finite() || self.seconds_per_day <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "seconds_per_day must be positive, got {}",
                self.seconds_per_day
            )));
        }
        if !(0.0..24.0).contains(&self.start_hour) {
            return Err(ConfigError::Invalid(format!(
                "start_hour must be in [0, 24), got {}",
                self.start_hour
            )));
        }
        if self.farm_width < 1 || self.farm_height < 1 {
            return Err(ConfigError::Invalid(format!(
                "farm must be at least 1x1, got {}x{}",
                self.farm_width, self.farm_height
            )));
        }
        if self.farm_width.checked_mul(self.farm_height).is_none() {
            return Err(ConfigError::Invalid(format!(
                "farm {}x{} has too many tiles",
                self.farm_width, self.farm_height
            )));
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text, path)
    }

    /// Loads the file, or falls back to defaults when it is missing or broken.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!("[Config] Loaded simulation config");
                config
            }
            Err(ConfigError::Io { path, .. }) => {
                info!("[Config] No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("[Config] {e}; using defaults");
                Self::default()
            }
        }
    }

    /// Seconds into the day at which each morning starts.
    pub fn start_offset(&self) -> f32 {
        self.seconds_per_day * (self.start_hour / 24.0)
    }
}
