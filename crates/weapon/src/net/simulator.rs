use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::simulation::SimTime;

use super::endpoint::PeerId;
use super::link::{LinkConditions, LinkRng};

#[derive(Debug)]
struct DelayedPacket {
    release_time: SimTime,
    order: u64,
    from: PeerId,
    to: PeerId,
    data: Vec<u8>,
}

impl PartialEq for DelayedPacket {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DelayedPacket {}

impl PartialOrd for DelayedPacket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DelayedPacket {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .release_time
            .total_cmp(&self.release_time)
            .then_with(|| other.order.cmp(&self.order))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub from: PeerId,
    pub to: PeerId,
    pub data: Vec<u8>,
}

/// In-memory stand-in for the wire. Packets are held back by the latency of
/// their link, measured on the simulation clock; jitter may reorder them.
#[derive(Debug)]
pub struct NetworkSimulator {
    default_link: LinkConditions,
    links: HashMap<(PeerId, PeerId), LinkConditions>,
    queue: BinaryHeap<DelayedPacket>,
    rng: LinkRng,
    next_order: u64,
}

impl NetworkSimulator {
    pub fn new(default_link: LinkConditions, seed: u64) -> Self {
        Self {
            default_link,
            links: HashMap::new(),
            queue: BinaryHeap::new(),
            rng: LinkRng::new(seed),
            next_order: 0,
        }
    }

    pub fn set_link(&mut self, from: PeerId, to: PeerId, conditions: LinkConditions) {
        self.links.insert((from, to), conditions);
    }

    pub fn link(&self, from: PeerId, to: PeerId) -> &LinkConditions {
        self.links.get(&(from, to)).unwrap_or(&self.default_link)
    }

    pub fn send(&mut self, from: PeerId, to: PeerId, data: Vec<u8>, now: SimTime) {
        let conditions = *self.link(from, to);
        let delay_ms = conditions.delay_ms(&mut self.rng);
        let release_time = now + delay_ms as SimTime / 1000.0;

        let order = self.next_order;
        self.next_order += 1;

        self.queue.push(DelayedPacket {
            release_time,
            order,
            from,
            to,
            data,
        });
    }

    pub fn take_ready(&mut self, now: SimTime) -> Vec<Delivered> {
        let mut delivered = Vec::new();
        while self.queue.peek().is_some_and(|p| p.release_time <= now) {
            if let Some(packet) = self.queue.pop() {
                delivered.push(Delivered {
                    from: packet.from,
                    to: packet.to,
                    data: packet.data,
                });
            }
        }
        delivered
    }

    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}
