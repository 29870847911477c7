use crate::simulation::SimTime;

use super::state::FireTiming;

/// Drains every shot that became due up to `now`, advancing the timing as
/// each one is yielded. Shots left unconsumed stay due for the next step.
pub struct DueShots<'a> {
    timing: &'a mut FireTiming,
    interval: SimTime,
    now: SimTime,
}

impl<'a> DueShots<'a> {
    pub fn new(timing: &'a mut FireTiming, interval: SimTime, now: SimTime) -> Self {
        debug_assert!(interval > 0.0);
        Self {
            timing,
            interval,
            now,
        }
    }
}

impl Iterator for DueShots<'_> {
    type Item = SimTime;

    fn next(&mut self) -> Option<SimTime> {
        if self.timing.next_firing_time > self.now {
            return None;
        }

        // First shot of a streak lands on the streak start, later ones on the cadence.
        let mut firing_time = self.timing.start_firing_time.max(self.timing.next_firing_time);
        if !firing_time.is_finite() {
            // Firing was entered without a recorded streak start.
            firing_time = self.now;
        }

        let next = firing_time + self.interval;
        if next <= firing_time {
            log::warn!("shot interval {} lost to precision at t={firing_time}", self.interval);
            return None;
        }

        self.timing.next_firing_time = next;
        Some(firing_time)
    }
}

impl FireTiming {
    pub fn due_shots(&mut self, interval: SimTime, now: SimTime) -> DueShots<'_> {
        DueShots::new(self, interval, now)
    }
}
