use serde::{Deserialize, Serialize};

use crate::simulation::SimTime;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("time between shots must be finite, got {0}")]
    NonFiniteInterval(f32),
    #[error("time between shots must be positive, got {0}")]
    NonPositiveInterval(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponConfig {
    /// Seconds between consecutive shots, the inverse of the fire rate.
    pub time_between_shots: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            time_between_shots: 1.0,
        }
    }
}

impl WeaponConfig {
    pub fn new(time_between_shots: f32) -> Self {
        Self { time_between_shots }
    }

    pub fn from_rounds_per_minute(rpm: f32) -> Self {
        Self::new(60.0 / rpm)
    }

    pub fn rounds_per_minute(&self) -> f32 {
        60.0 / self.time_between_shots
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shot_interval().map(|_| ())
    }

    pub fn shot_interval(&self) -> Result<SimTime, ConfigError> {
        let t = self.time_between_shots;
        if !t.is_finite() {
            return Err(ConfigError::NonFiniteInterval(t));
        }
        if t <= 0.0 {
            return Err(ConfigError::NonPositiveInterval(t));
        }
        Ok(t as SimTime)
    }
}
