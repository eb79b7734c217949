//! Animation manager configuration

use serde::{Deserialize, Serialize};

use crate::error::{AnimationError, Result};
use crate::stats::DEFAULT_FRAME_HISTORY;

/// Tuning for an [`AnimationManager`](crate::AnimationManager)
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ManagerConfig {
    /// Number of frame deltas kept for FPS reporting
    #[serde(default = "default_frame_history")]
    pub frame_history: usize,
    /// Target frame interval when the manager drives its own loop
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: f64,
}

fn default_frame_history() -> usize {
    DEFAULT_FRAME_HISTORY
}

fn default_frame_interval() -> f64 {
    1000.0 / 60.0
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            frame_history: default_frame_history(),
            frame_interval_ms: default_frame_interval(),
        }
    }
}

impl ManagerConfig {
    /// Parse from a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject a zero frame history and a frame interval that is not a
    /// finite positive number
    pub fn validate(&self) -> Result<()> {
        if self.frame_history == 0 {
            return Err(AnimationError::ConfigValue {
                field: "frame_history",
                value: 0.0,
            });
        }
        if !(self.frame_interval_ms.is_finite() && self.frame_interval_ms > 0.0) {
            return Err(AnimationError::ConfigValue {
                field: "frame_interval_ms",
                value: self.frame_interval_ms,
            });
        }
        Ok(())
    }

    /// Builder: frame interval from a target rate
    pub fn with_target_fps(mut self, fps: f64) -> Self {
        if fps.is_finite() && fps > 0.0 {
            self.frame_interval_ms = 1000.0 / fps;
        }
        self
    }
}
