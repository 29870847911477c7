use serde::{Deserialize, Serialize};

/// Simulated one-way latency for a link, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkConditions {
    pub enabled: bool,
    pub min_latency_ms: u32,
    pub max_latency_ms: u32,
    pub jitter_ms: u32,
}

impl LinkConditions {
    pub fn latency(min_latency_ms: u32, max_latency_ms: u32, jitter_ms: u32) -> Self {
        Self {
            enabled: true,
            min_latency_ms,
            max_latency_ms: max_latency_ms.max(min_latency_ms),
            jitter_ms,
        }
    }

    pub fn delay_ms(&self, rng: &mut LinkRng) -> u32 {
        if !self.enabled || (self.max_latency_ms == 0 && self.jitter_ms == 0) {
            return 0;
        }
        let base = self.min_latency_ms;
        let range = self.max_latency_ms.saturating_sub(self.min_latency_ms);
        let jitter = if self.jitter_ms > 0 {
            (rng.next_percent() * self.jitter_ms as f32) as u32
        } else {
            0
        };
        base + (rng.next_percent() * range as f32) as u32 + jitter
    }
}

/// Small deterministic generator so simulated runs are reproducible.
#[derive(Debug, Clone)]
pub struct LinkRng {
    state: u64,
}

impl LinkRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        // splitmix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_percent(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_rejected: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_link_has_no_delay() {
        let mut rng = LinkRng::new(1);
        let link = LinkConditions {
            enabled: false,
            min_latency_ms: 50,
            max_latency_ms: 100,
            jitter_ms: 10,
        };
        assert_eq!(link.delay_ms(&mut rng), 0);
    }

    #[test]
    fn delay_stays_in_bounds() {
        let mut rng = LinkRng::new(42);
        let link = LinkConditions::latency(40, 80, 10);
        for _ in 0..1000 {
            let delay = link.delay_ms(&mut rng);
            assert!((40..90).contains(&delay), "delay {delay} out of bounds");
        }
    }

    #[test]
    fn rng_is_deterministic() {
        let mut a = LinkRng::new(7);
        let mut b = LinkRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        let p = a.next_percent();
        assert!((0.0..1.0).contains(&p));
    }
}
