use std::collections::HashMap;

use super::protocol::sequence_greater_than;

/// Reassembles a reliable stream: items are released strictly in sequence
/// order, duplicates and already-delivered sequences are dropped.
#[derive(Debug)]
pub struct OrderedReceiver<T> {
    next_expected: u32,
    buffered: HashMap<u32, T>,
}

impl<T> Default for OrderedReceiver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedReceiver<T> {
    pub fn new() -> Self {
        Self {
            next_expected: 0,
            buffered: HashMap::new(),
        }
    }

    pub fn accept(&mut self, sequence: u32, item: T) -> Vec<T> {
        if sequence != self.next_expected && !sequence_greater_than(sequence, self.next_expected)
        {
            log::trace!("dropping already delivered sequence {sequence}");
            return Vec::new();
        }

        if sequence != self.next_expected {
            self.buffered.entry(sequence).or_insert(item);
            return Vec::new();
        }

        let mut released = vec![item];
        self.next_expected = self.next_expected.wrapping_add(1);
        while let Some(next) = self.buffered.remove(&self.next_expected) {
            released.push(next);
            self.next_expected = self.next_expected.wrapping_add(1);
        }
        released
    }

    pub fn next_expected(&self) -> u32 {
        self.next_expected
    }

    pub fn buffered_len(&self) -> usize {
        self.buffered.len()
    }
}

/// Accepts a sequence only if it is newer than every one seen before.
#[derive(Debug, Default)]
pub struct LatestWins {
    last: Option<u32>,
}

impl LatestWins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, sequence: u32) -> bool {
        match self.last {
            Some(last) if !sequence_greater_than(sequence, last) => false,
            _ => {
                self.last = Some(sequence);
                true
            }
        }
    }

    pub fn last(&self) -> Option<u32> {
        self.last
    }
}
