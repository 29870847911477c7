use super::clock::{SimTime, TimeSource};

/// Longest frame the accumulator takes in; anything beyond is dropped
/// instead of replayed as a burst of steps.
pub const MAX_FRAME: SimTime = 0.25;

/// Turns variable frame deltas into whole simulation steps.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick_rate: u32,
    step: SimTime,
    pending: SimTime,
}

impl FixedTimestep {
    pub fn new(tick_rate: u32) -> Self {
        let tick_rate = tick_rate.max(1);
        Self {
            tick_rate,
            step: 1.0 / tick_rate as SimTime,
            pending: 0.0,
        }
    }

    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    pub fn step_length(&self) -> SimTime {
        self.step
    }

    pub fn accumulate(&mut self, delta: SimTime) {
        if delta.is_finite() && delta > 0.0 {
            self.pending += delta.min(MAX_FRAME);
        }
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.pending >= self.step {
            self.pending -= self.step;
            true
        } else {
            false
        }
    }

    /// Consumes every whole step currently pending.
    pub fn drain_steps(&mut self) -> u32 {
        let mut steps = 0;
        while self.consume_tick() {
            steps += 1;
        }
        steps
    }
}

/// Server clock derived from a tick counter, so time never accumulates
/// rounding error from repeated `dt` additions.
#[derive(Debug, Clone, Copy)]
pub struct StepClock {
    tick: u64,
    tick_rate: u32,
}

impl StepClock {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick: 0,
            tick_rate: tick_rate.max(1),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    pub fn now(&self) -> SimTime {
        self.tick as SimTime / self.tick_rate as SimTime
    }
}

impl TimeSource for StepClock {
    fn server_time(&self) -> Option<SimTime> {
        Some(self.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_frames_of_half_step_make_one_tick() {
        let mut ts = FixedTimestep::new(50);
        ts.accumulate(0.01);
        assert!(!ts.consume_tick());
        ts.accumulate(0.01);
        assert!(ts.consume_tick());
        assert!(!ts.consume_tick());
    }

    #[test]
    fn stalls_are_capped() {
        let mut ts = FixedTimestep::new(10);
        ts.accumulate(5.0);
        assert_eq!(ts.drain_steps(), 2);
    }

    #[test]
    fn bad_deltas_are_ignored() {
        let mut ts = FixedTimestep::new(10);
        ts.accumulate(-1.0);
        ts.accumulate(SimTime::NAN);
        assert_eq!(ts.drain_steps(), 0);
    }

    #[test]
    fn step_clock_is_exact() {
        let mut clock = StepClock::new(4);
        for _ in 0..6 {
            clock.advance();
        }
        assert_eq!(clock.now(), 1.5);
        assert_eq!(clock.server_time(), Some(1.5));
    }
}
