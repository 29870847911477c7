use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize, rancor};

use crate::event::WeaponId;
use crate::simulation::SimTime;
use crate::weapon::FireState;

pub const MAX_PACKET_SIZE: usize = 1200;
pub const PROTOCOL_VERSION: u32 = 1;
pub const PROTOCOL_MAGIC: u32 = 0x5750_4E31;

const SEQUENCE_WRAP_THRESHOLD: u32 = u32::MAX / 2;

#[inline]
pub fn sequence_greater_than(s1: u32, s2: u32) -> bool {
    ((s1 > s2) && (s1 - s2 <= SEQUENCE_WRAP_THRESHOLD))
        || ((s1 < s2) && (s2 - s1 > SEQUENCE_WRAP_THRESHOLD))
}

/// Delivery guarantee a message needs from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delivery {
    /// Every message arrives, in send order.
    ReliableOrdered,
    /// Only the newest value matters; stale arrivals are discarded.
    LatestWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum WeaponMessage {
    /// Controller -> authority: the owner started holding fire.
    StartFireRequest,
    /// Controller -> authority: the owner released fire.
    StopFireRequest,
    /// Authority -> everyone: a shot happened at `time`.
    FireRelay { time: SimTime },
    /// Authority -> everyone: replicated weapon state.
    StateSync { state: u8 },
}

impl WeaponMessage {
    pub fn state_sync(state: FireState) -> Self {
        Self::StateSync { state: state.into() }
    }

    pub fn delivery(&self) -> Delivery {
        match self {
            Self::StartFireRequest | Self::StopFireRequest | Self::FireRelay { .. } => {
                Delivery::ReliableOrdered
            }
            Self::StateSync { .. } => Delivery::LatestWins,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::StartFireRequest => "start_fire_request",
            Self::StopFireRequest => "stop_fire_request",
            Self::FireRelay { .. } => "fire_relay",
            Self::StateSync { .. } => "state_sync",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Authority,
    Remotes,
}

/// A message the component wants sent; routing is left to the transport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outgoing {
    pub destination: Destination,
    pub message: WeaponMessage,
}

impl Outgoing {
    pub fn to_authority(message: WeaponMessage) -> Self {
        Self {
            destination: Destination::Authority,
            message,
        }
    }

    pub fn to_remotes(message: WeaponMessage) -> Self {
        Self {
            destination: Destination::Remotes,
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct PacketHeader {
    pub magic: u32,
    pub version: u32,
    pub weapon_id: u32,
    pub sequence: u32,
}

impl PacketHeader {
    pub fn new(weapon: WeaponId, sequence: u32) -> Self {
        Self {
            magic: PROTOCOL_MAGIC,
            version: PROTOCOL_VERSION,
            weapon_id: weapon.0,
            sequence,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == PROTOCOL_MAGIC && self.version == PROTOCOL_VERSION
    }

    pub fn weapon(&self) -> WeaponId {
        WeaponId(self.weapon_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: WeaponMessage,
}

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
    #[error("invalid header (magic {magic:#x}, version {version})")]
    InvalidHeader { magic: u32, version: u32 },
    #[error("packet of {0} bytes exceeds MTU")]
    TooLarge(usize),
}

impl Packet {
    pub fn new(header: PacketHeader, payload: WeaponMessage) -> Self {
        Self { header, payload }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        let bytes = rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(PacketError::Serialize)?;

        if bytes.len() > MAX_PACKET_SIZE {
            return Err(PacketError::TooLarge(bytes.len()));
        }
        Ok(bytes)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, PacketError> {
        if data.len() > MAX_PACKET_SIZE {
            return Err(PacketError::TooLarge(data.len()));
        }

        // Received buffers carry no alignment guarantee.
        let mut aligned = AlignedVec::<16>::with_capacity(data.len());
        aligned.extend_from_slice(data);

        let packet = rkyv::from_bytes::<Self, rancor::Error>(&aligned)
            .map_err(PacketError::Deserialize)?;

        if !packet.header.is_valid() {
            return Err(PacketError::InvalidHeader {
                magic: packet.header.magic,
                version: packet.header.version,
            });
        }
        Ok(packet)
    }
}
