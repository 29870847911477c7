mod endpoint;
mod link;
mod ordering;
mod protocol;
mod simulator;

pub use endpoint::{PeerId, WeaponEndpoint};
pub use link::{LinkConditions, LinkRng, LinkStats};
pub use ordering::{LatestWins, OrderedReceiver};
pub use protocol::{
    Delivery, Destination, MAX_PACKET_SIZE, Outgoing, PROTOCOL_MAGIC, PROTOCOL_VERSION, Packet,
    PacketError, PacketHeader, WeaponMessage, sequence_greater_than,
};
pub use simulator::{Delivered, NetworkSimulator};
