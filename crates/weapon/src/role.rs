use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// How the local participant relates to the entity that owns a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetRole {
    /// Holds ground truth for the weapon state and timing.
    Authority,
    /// Remote owner that predicts its own fire ahead of the authority.
    Controller,
    /// Mirrors replicated state and relayed events, never decides anything.
    Observer,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RoleCaps: u8 {
        const MUTATE_STATE = 1 << 0;
        const LATCH_INTENT = 1 << 1;
        const FORWARD_INTENT = 1 << 2;
        const RUN_CADENCE = 1 << 3;
        const HAS_AUTHORITY = 1 << 4;
        const RECEIVE_REPLICATION = 1 << 5;
    }
}

impl NetRole {
    pub fn caps(self) -> RoleCaps {
        match self {
            Self::Authority => {
                RoleCaps::MUTATE_STATE
                    | RoleCaps::LATCH_INTENT
                    | RoleCaps::RUN_CADENCE
                    | RoleCaps::HAS_AUTHORITY
            }
            Self::Controller => {
                RoleCaps::MUTATE_STATE
                    | RoleCaps::LATCH_INTENT
                    | RoleCaps::FORWARD_INTENT
                    | RoleCaps::RUN_CADENCE
                    | RoleCaps::RECEIVE_REPLICATION
            }
            Self::Observer => RoleCaps::RECEIVE_REPLICATION,
        }
    }

    #[inline]
    pub fn has_authority(self) -> bool {
        self.caps().contains(RoleCaps::HAS_AUTHORITY)
    }

    #[inline]
    pub fn can_mutate(self) -> bool {
        self.caps().contains(RoleCaps::MUTATE_STATE)
    }

    #[inline]
    pub fn forwards_intent(self) -> bool {
        self.caps().contains(RoleCaps::FORWARD_INTENT)
    }

    #[inline]
    pub fn receives_replication(self) -> bool {
        self.caps().contains(RoleCaps::RECEIVE_REPLICATION)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authority => "authority",
            Self::Controller => "controller",
            Self::Observer => "observer",
        }
    }
}
