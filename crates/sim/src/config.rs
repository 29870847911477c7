use weapon_logic::{FireDedup, LinkConditions, SimTime, WeaponConfig};

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub tick_rate: u32,
    /// Render-style frame length fed into the fixed timestep.
    pub frame_ms: u32,
    pub duration: SimTime,
    pub hold_at: SimTime,
    pub release_at: SimTime,
    pub weapon: WeaponConfig,
    pub multicast_fire: bool,
    pub fire_dedup: FireDedup,
    pub link: LinkConditions,
    pub seed: u64,
    /// Extra simulated time allowed for in-flight packets after `duration`.
    pub settle_limit: SimTime,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            frame_ms: 16,
            duration: 3.0,
            hold_at: 0.0,
            release_at: 2.0,
            weapon: WeaponConfig::default(),
            multicast_fire: true,
            fire_dedup: FireDedup::DeliverAll,
            link: LinkConditions::default(),
            seed: 0x5EED,
            settle_limit: 5.0,
        }
    }
}
