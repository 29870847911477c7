mod bus;
mod fanout;
mod queue;
mod types;

pub use bus::{EventBus, ListenerId};
pub use fanout::{FireDelivery, fire_delivery};
pub use queue::EventRecorder;
pub use types::{Fired, StateChanged, WeaponEvent, WeaponId};
