/// Seconds on the authority-synchronized simulation clock.
pub type SimTime = f64;

/// Used when no synchronized time has ever been observed.
pub const FALLBACK_TIME: SimTime = 0.0;

/// Supplies the synchronized server time, if one is currently known.
pub trait TimeSource {
    fn server_time(&self) -> Option<SimTime>;
}

impl TimeSource for SimTime {
    fn server_time(&self) -> Option<SimTime> {
        Some(*self)
    }
}

impl TimeSource for Option<SimTime> {
    fn server_time(&self) -> Option<SimTime> {
        *self
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn server_time(&self) -> Option<SimTime> {
        (**self).server_time()
    }
}

/// Turns raw [`TimeSource`] samples into a monotonically non-decreasing
/// value, falling back to the last known sample when the source is missing.
#[derive(Debug, Clone, Default)]
pub struct ClockSampler {
    last_known: Option<SimTime>,
}

impl ClockSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, source: &impl TimeSource) -> SimTime {
        let sampled = source.server_time().filter(|t| !t.is_nan());

        let now = match (sampled, self.last_known) {
            (Some(t), Some(last)) if t < last => {
                log::debug!("server time went backwards ({t} < {last}), holding at {last}");
                last
            }
            (Some(t), _) => t,
            (None, Some(last)) => {
                log::debug!("no server time available, reusing {last}");
                last
            }
            (None, None) => {
                log::debug!("no server time available, using fallback {FALLBACK_TIME}");
                FALLBACK_TIME
            }
        };

        self.last_known = Some(now);
        now
    }

    pub fn last_known(&self) -> Option<SimTime> {
        self.last_known
    }
}
