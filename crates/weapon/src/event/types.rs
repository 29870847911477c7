use serde::{Deserialize, Serialize};

use crate::simulation::SimTime;
use crate::weapon::FireState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeaponId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChanged {
    pub weapon: WeaponId,
    pub old: FireState,
    pub new: FireState,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fired {
    pub weapon: WeaponId,
    pub time: SimTime,
    /// False for locally predicted shots that the authority may still correct.
    pub authoritative: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeaponEvent {
    StateChanged(StateChanged),
    Fired(Fired),
}

impl WeaponEvent {
    pub fn weapon(&self) -> WeaponId {
        match self {
            Self::StateChanged(e) => e.weapon,
            Self::Fired(e) => e.weapon,
        }
    }

    pub fn as_fired(&self) -> Option<&Fired> {
        match self {
            Self::Fired(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_state_changed(&self) -> Option<&StateChanged> {
        match self {
            Self::StateChanged(e) => Some(e),
            _ => None,
        }
    }
}
