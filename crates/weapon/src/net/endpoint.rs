use std::collections::HashMap;

use crate::event::WeaponId;

use super::link::LinkStats;
use super::ordering::{LatestWins, OrderedReceiver};
use super::protocol::{
    Delivery, Destination, Outgoing, Packet, PacketError, PacketHeader, WeaponMessage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u32);

/// Per-participant transport glue: resolves [`Destination`]s to peers,
/// stamps sequences and enforces each message's [`Delivery`] on receipt.
#[derive(Debug)]
pub struct WeaponEndpoint {
    local: PeerId,
    authority: PeerId,
    remotes: Vec<PeerId>,
    send_sequences: HashMap<(PeerId, WeaponId, Delivery), u32>,
    ordered: HashMap<(PeerId, WeaponId), OrderedReceiver<WeaponMessage>>,
    latest: HashMap<(PeerId, WeaponId), LatestWins>,
    stats: LinkStats,
}

impl WeaponEndpoint {
    pub fn new(local: PeerId, authority: PeerId) -> Self {
        Self {
            local,
            authority,
            remotes: Vec::new(),
            send_sequences: HashMap::new(),
            ordered: HashMap::new(),
            latest: HashMap::new(),
            stats: LinkStats::default(),
        }
    }

    pub fn local(&self) -> PeerId {
        self.local
    }

    pub fn authority(&self) -> PeerId {
        self.authority
    }

    pub fn is_authority(&self) -> bool {
        self.local == self.authority
    }

    pub fn add_remote(&mut self, peer: PeerId) {
        if peer != self.local && !self.remotes.contains(&peer) {
            self.remotes.push(peer);
        }
    }

    pub fn remove_remote(&mut self, peer: PeerId) {
        self.remotes.retain(|p| *p != peer);
        self.ordered.retain(|(from, _), _| *from != peer);
        self.latest.retain(|(from, _), _| *from != peer);
    }

    pub fn remotes(&self) -> &[PeerId] {
        &self.remotes
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    fn targets(&self, destination: Destination) -> Vec<PeerId> {
        match destination {
            Destination::Authority if self.is_authority() => Vec::new(),
            Destination::Authority => vec![self.authority],
            Destination::Remotes => self.remotes.clone(),
        }
    }

    /// Encodes one outgoing message into a packet per target peer.
    pub fn encode(
        &mut self,
        weapon: WeaponId,
        outgoing: Outgoing,
    ) -> Result<Vec<(PeerId, Vec<u8>)>, PacketError> {
        let delivery = outgoing.message.delivery();
        let mut packets = Vec::new();

        for peer in self.targets(outgoing.destination) {
            let sequence = self.send_sequences.entry((peer, weapon, delivery)).or_insert(0);
            let header = PacketHeader::new(weapon, *sequence);
            *sequence = sequence.wrapping_add(1);

            let data = Packet::new(header, outgoing.message).serialize()?;
            self.stats.packets_sent += 1;
            self.stats.bytes_sent += data.len() as u64;
            packets.push((peer, data));
        }

        Ok(packets)
    }

    /// Decodes a packet from `from` and returns the messages that are now
    /// deliverable, in order.
    pub fn receive(
        &mut self,
        from: PeerId,
        data: &[u8],
    ) -> Result<Vec<(WeaponId, WeaponMessage)>, PacketError> {
        let packet = match Packet::deserialize(data) {
            Ok(packet) => packet,
            Err(e) => {
                self.stats.packets_rejected += 1;
                return Err(e);
            }
        };

        self.stats.packets_received += 1;
        self.stats.bytes_received += data.len() as u64;

        let weapon = packet.header.weapon();
        let sequence = packet.header.sequence;

        let released = match packet.payload.delivery() {
            Delivery::ReliableOrdered => self
                .ordered
                .entry((from, weapon))
                .or_default()
                .accept(sequence, packet.payload),
            Delivery::LatestWins => {
                if self.latest.entry((from, weapon)).or_default().accept(sequence) {
                    vec![packet.payload]
                } else {
                    log::trace!(
                        "{:?}: stale {} #{sequence} from {:?}",
                        self.local,
                        packet.payload.name(),
                        from
                    );
                    Vec::new()
                }
            }
        };

        Ok(released.into_iter().map(|message| (weapon, message)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weapon::FireState;

    fn pair() -> (WeaponEndpoint, WeaponEndpoint) {
        let mut server = WeaponEndpoint::new(PeerId(0), PeerId(0));
        server.add_remote(PeerId(1));
        server.add_remote(PeerId(2));
        let client = WeaponEndpoint::new(PeerId(1), PeerId(0));
        (server, client)
    }

    #[test]
    fn requests_route_to_authority() {
        let (_, mut client) = pair();
        let packets = client
            .encode(WeaponId(1), Outgoing::to_authority(WeaponMessage::StartFireRequest))
            .unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].0, PeerId(0));
    }

    #[test]
    fn authority_never_sends_to_itself() {
        let (mut server, _) = pair();
        let packets = server
            .encode(WeaponId(1), Outgoing::to_authority(WeaponMessage::StartFireRequest))
            .unwrap();
        assert!(packets.is_empty());

        server.add_remote(PeerId(0));
        assert_eq!(server.remotes(), &[PeerId(1), PeerId(2)]);
    }

    #[test]
    fn relays_fan_out_to_every_remote() {
        let (mut server, _) = pair();
        let packets = server
            .encode(WeaponId(1), Outgoing::to_remotes(WeaponMessage::FireRelay { time: 0.5 }))
            .unwrap();
        let peers: Vec<_> = packets.iter().map(|(peer, _)| *peer).collect();
        assert_eq!(peers, vec![PeerId(1), PeerId(2)]);
    }

    #[test]
    fn reordered_relays_are_released_in_order() {
        let (mut server, mut client) = pair();
        let weapon = WeaponId(4);

        let mut to_client = Vec::new();
        for time in [0.0, 0.5, 1.0] {
            let packets = server
                .encode(weapon, Outgoing::to_remotes(WeaponMessage::FireRelay { time }))
                .unwrap();
            to_client.extend(packets.into_iter().filter(|(peer, _)| *peer == PeerId(1)));
        }

        assert!(client.receive(PeerId(0), &to_client[2].1).unwrap().is_empty());
        assert_eq!(
            client.receive(PeerId(0), &to_client[0].1).unwrap(),
            vec![(weapon, WeaponMessage::FireRelay { time: 0.0 })]
        );
        let released = client.receive(PeerId(0), &to_client[1].1).unwrap();
        assert_eq!(
            released,
            vec![
                (weapon, WeaponMessage::FireRelay { time: 0.5 }),
                (weapon, WeaponMessage::FireRelay { time: 1.0 }),
            ]
        );
    }

    #[test]
    fn stale_state_sync_is_dropped() {
        let (mut server, mut client) = pair();
        let weapon = WeaponId(1);

        let first = server
            .encode(weapon, Outgoing::to_remotes(WeaponMessage::state_sync(FireState::Firing)))
            .unwrap();
        let second = server
            .encode(weapon, Outgoing::to_remotes(WeaponMessage::state_sync(FireState::Idle)))
            .unwrap();

        let released = client.receive(PeerId(0), &second[0].1).unwrap();
        assert_eq!(released, vec![(weapon, WeaponMessage::state_sync(FireState::Idle))]);
        assert!(client.receive(PeerId(0), &first[0].1).unwrap().is_empty());
    }

    #[test]
    fn garbage_is_counted_and_rejected() {
        let (_, mut client) = pair();
        assert!(client.receive(PeerId(0), &[0u8; 4]).is_err());
        assert_eq!(client.stats().packets_rejected, 1);
        assert_eq!(client.stats().packets_received, 0);
    }
}
