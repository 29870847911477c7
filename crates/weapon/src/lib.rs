pub mod event;
pub mod net;
pub mod role;
pub mod simulation;
pub mod weapon;

pub use event::{
    EventBus, EventRecorder, FireDelivery, Fired, ListenerId, StateChanged, WeaponEvent, WeaponId,
    fire_delivery,
};
pub use net::{
    Delivered, Delivery, Destination, LinkConditions, LinkStats, NetworkSimulator, Outgoing,
    Packet, PacketError, PacketHeader, PeerId, WeaponEndpoint, WeaponMessage,
};
pub use role::{NetRole, RoleCaps};
pub use simulation::{ClockSampler, FALLBACK_TIME, FixedTimestep, SimTime, StepClock, TimeSource};
pub use weapon::{
    ConfigError, FireDedup, FireGate, FireState, FireTiming, GateFn, IdleGate, StepReport,
    WeaponComponent, WeaponConfig,
};
