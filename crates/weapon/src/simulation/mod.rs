mod clock;
mod tick;

pub use clock::{ClockSampler, FALLBACK_TIME, SimTime, TimeSource};
pub use tick::{FixedTimestep, StepClock};
