use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::engine::clock::DEFAULT_MAX_DT;
use crate::engine::trigger::ResolutionTrigger;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max_dt must be a positive number of seconds, got {0}")]
    MaxDt(f64),
    #[error("target_fps must be between 1 and 240, got {0}")]
    TargetFps(u32),
    #[error("flick_strength must be finite and non-negative, got {0}")]
    FlickStrength(f64),
    #[error("idle_after must be finite and non-negative, got {0}")]
    IdleAfter(f64),
    #[error("rotation trigger needs a positive number of turns, got {0}")]
    Turns(f64),
    #[error("sector trigger needs at least two sectors, got {0}")]
    Sectors(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Upper bound on a single frame's delta, in seconds.
    pub max_dt: f64,
    pub target_fps: u32,
    /// Multiplier applied to captured drag velocity on release.
    pub flick_strength: f64,
    /// Seconds without input before `Interactive` falls back to `Idle`.
    pub idle_after: f64,
    pub resolution_trigger: ResolutionTrigger,
    /// Fixed seed for card shuffles and knob targets.
    pub seed: Option<u64>,
    pub audio: bool,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            max_dt: DEFAULT_MAX_DT,
            target_fps: 60,
            flick_strength: 1.0,
            idle_after: 1.0,
            resolution_trigger: ResolutionTrigger::default(),
            seed: None,
            audio: true,
        }
    }
}

impl SketchConfig {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Read `path`, falling back to defaults when it is missing, malformed
    /// or fails validation.
    pub fn load_from(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(_) => return Self::default(),
        };
        let config: Self = match serde_json::from_str(&json) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid sketch config, using defaults");
                return Self::default();
            }
        };
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "rejected sketch config, using defaults");
                Self::default()
            }
        }
    }

    pub fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("sketchbook");
        path.push("config.json");
        path
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_dt.is_finite() && self.max_dt > 0.0) {
            return Err(ConfigError::MaxDt(self.max_dt));
        }
        if !(1..=240).contains(&self.target_fps) {
            return Err(ConfigError::TargetFps(self.target_fps));
        }
        if !(self.flick_strength.is_finite() && self.flick_strength >= 0.0) {
            return Err(ConfigError::FlickStrength(self.flick_strength));
        }
        if !(self.idle_after.is_finite() && self.idle_after >= 0.0) {
            return Err(ConfigError::IdleAfter(self.idle_after));
        }
        match self.resolution_trigger {
            ResolutionTrigger::Rotation { turns } if !(turns.is_finite() && turns > 0.0) => {
                Err(ConfigError::Turns(turns))
            }
            ResolutionTrigger::Sectors { count } if count < 2 => Err(ConfigError::Sectors(count)),
            _ => Ok(()),
        }
    }

    /// Seconds per frame at the target rate.
    pub fn frame_interval(&self) -> f64 {
        1.0 / f64::from(self.target_fps.max(1))
    }
}
