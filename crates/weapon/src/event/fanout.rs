use crate::role::NetRole;

/// Where a locally computed shot goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDelivery {
    /// Raise locally as authoritative and relay reliably to every remote.
    Multicast,
    /// Raise locally as authoritative only, e.g. headless damage resolution.
    AuthorityOnly,
    /// Raise locally as a non-authoritative prediction.
    Predicted,
    /// Never raised from local computation.
    Suppressed,
}

pub fn fire_delivery(role: NetRole, multicast_fire: bool) -> FireDelivery {
    match (role, multicast_fire) {
        (NetRole::Authority, true) => FireDelivery::Multicast,
        (NetRole::Authority, false) => FireDelivery::AuthorityOnly,
        (NetRole::Controller, _) => FireDelivery::Predicted,
        (NetRole::Observer, _) => FireDelivery::Suppressed,
    }
}

impl FireDelivery {
    pub fn raises_locally(self) -> bool {
        !matches!(self, Self::Suppressed)
    }

    pub fn is_authoritative(self) -> bool {
        matches!(self, Self::Multicast | Self::AuthorityOnly)
    }
}
