use serde::{Deserialize, Serialize};

use crate::simulation::SimTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FireState {
    #[default]
    Idle = 0,
    Firing = 1,
    Reloading = 2,
}

impl From<u8> for FireState {
    fn from(value: u8) -> Self {
        match value {
            1 => FireState::Firing,
            2 => FireState::Reloading,
            _ => FireState::Idle,
        }
    }
}

impl From<FireState> for u8 {
    fn from(state: FireState) -> Self {
        state as u8
    }
}

impl FireState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FireState::Idle => "idle",
            FireState::Firing => "firing",
            FireState::Reloading => "reloading",
        }
    }
}

/// Local timing for the current and next shot. Never replicated; each
/// participant derives its own copy from the same deterministic rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireTiming {
    pub next_firing_time: SimTime,
    pub start_firing_time: SimTime,
    pub wants_fire: bool,
}

impl Default for FireTiming {
    fn default() -> Self {
        // Negative infinity so the first shot of the first streak is not delayed.
        Self {
            next_firing_time: SimTime::NEG_INFINITY,
            start_firing_time: SimTime::NEG_INFINITY,
            wants_fire: false,
        }
    }
}

impl FireTiming {
    pub fn new() -> Self {
        Self::default()
    }
}
