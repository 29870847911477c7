use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::simulation::SimTime;

const MAX_PENDING_PREDICTIONS: usize = 128;

/// What a predicting controller does with relayed authoritative shots.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum FireDedup {
    /// Raise every relayed shot, even ones already predicted locally.
    #[default]
    DeliverAll,
    /// Drop a relayed shot when a local prediction lies within `tolerance`
    /// seconds of it. Unmatched relays are still raised.
    SuppressConfirmed { tolerance: SimTime },
}

#[derive(Debug, Default)]
pub struct PredictionLedger {
    pending: VecDeque<SimTime>,
}

impl PredictionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time: SimTime) {
        if self.pending.len() >= MAX_PENDING_PREDICTIONS {
            self.pending.pop_front();
        }
        self.pending.push_back(time);
    }

    /// Consumes the prediction matching an authoritative shot, if any.
    pub fn confirm(&mut self, time: SimTime, tolerance: SimTime) -> bool {
        // Predictions are recorded in order, so anything too old can never match.
        while self
            .pending
            .front()
            .is_some_and(|&predicted| predicted < time - tolerance)
        {
            self.pending.pop_front();
        }

        match self.pending.front() {
            Some(&predicted) if (predicted - time).abs() <= tolerance => {
                self.pending.pop_front();
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
