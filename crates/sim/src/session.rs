use weapon_logic::{
    EventRecorder, FireState, FixedTimestep, NetRole, NetworkSimulator, PeerId, SimTime,
    StepClock, WeaponComponent, WeaponEndpoint, WeaponEvent, WeaponId,
};

use crate::config::SimConfig;

const WEAPON: WeaponId = WeaponId(1);
const AUTHORITY: PeerId = PeerId(0);
const CONTROLLER: PeerId = PeerId(1);
const OBSERVER: PeerId = PeerId(2);

struct Participant {
    weapon: WeaponComponent,
    endpoint: WeaponEndpoint,
    recorder: EventRecorder,
    tally: Tally,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Tally {
    pub predicted: usize,
    pub authoritative: usize,
    pub state_changes: usize,
    pub first_shot: Option<SimTime>,
    pub last_shot: Option<SimTime>,
}

impl Tally {
    fn record(&mut self, event: &WeaponEvent) {
        match event {
            WeaponEvent::StateChanged(_) => self.state_changes += 1,
            WeaponEvent::Fired(fired) => {
                if fired.authoritative {
                    self.authoritative += 1;
                } else {
                    self.predicted += 1;
                }
                self.first_shot.get_or_insert(fired.time);
                self.last_shot = Some(fired.time);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParticipantSummary {
    pub peer: PeerId,
    pub role: NetRole,
    pub state: FireState,
    pub tally: Tally,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_rejected: u64,
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub elapsed: SimTime,
    pub steps: u64,
    pub participants: Vec<ParticipantSummary>,
}

impl Summary {
    pub fn authority_state(&self) -> Option<FireState> {
        self.participants
            .iter()
            .find(|p| p.role == NetRole::Authority)
            .map(|p| p.state)
    }

    pub fn converged(&self) -> bool {
        match self.authority_state() {
            Some(state) => self.participants.iter().all(|p| p.state == state),
            None => false,
        }
    }
}

/// One authority, one predicting controller and one observer sharing a
/// single weapon over a simulated link.
pub struct Session {
    config: SimConfig,
    participants: Vec<Participant>,
    network: NetworkSimulator,
    clock: StepClock,
    timestep: FixedTimestep,
    holding: bool,
}

impl Session {
    pub fn new(config: SimConfig) -> Self {
        let roles = [
            (AUTHORITY, NetRole::Authority),
            (CONTROLLER, NetRole::Controller),
            (OBSERVER, NetRole::Observer),
        ];

        let participants = roles
            .into_iter()
            .map(|(peer, role)| {
                let mut weapon = WeaponComponent::new(WEAPON, role, config.weapon)
                    .with_multicast_fire(config.multicast_fire)
                    .with_fire_dedup(config.fire_dedup);
                let recorder = EventRecorder::attach(weapon.events_mut());

                let mut endpoint = WeaponEndpoint::new(peer, AUTHORITY);
                if role == NetRole::Authority {
                    endpoint.add_remote(CONTROLLER);
                    endpoint.add_remote(OBSERVER);
                }

                Participant {
                    weapon,
                    endpoint,
                    recorder,
                    tally: Tally::default(),
                }
            })
            .collect();

        Self {
            network: NetworkSimulator::new(config.link, config.seed),
            clock: StepClock::new(config.tick_rate),
            timestep: FixedTimestep::new(config.tick_rate),
            participants,
            holding: false,
            config,
        }
    }

    /// Feeds frames into the fixed timestep until `duration`, then keeps
    /// stepping until the link drains or the settle limit runs out.
    pub fn run(&mut self) -> Summary {
        let frame = self.config.frame_ms.max(1) as SimTime / 1000.0;

        while self.clock.now() < self.config.duration {
            self.timestep.accumulate(frame);
            for _ in 0..self.timestep.drain_steps() {
                self.step();
            }
        }

        let deadline = self.clock.now() + self.config.settle_limit;
        while !self.network.is_idle() && self.clock.now() < deadline {
            self.step();
        }
        if !self.network.is_idle() {
            log::warn!(
                "{} packets still in flight after settle limit",
                self.network.in_flight()
            );
        }
        // One more step so replicated state applied by the last delivery
        // has been seen by every tick.
        self.step();

        self.summary()
    }

    fn step(&mut self) {
        let now = self.clock.now();

        self.deliver(now);
        self.drive_input(now);

        for participant in &mut self.participants {
            let report = participant.weapon.tick(&self.clock);
            if let Some((old, new)) = report.transition {
                log::debug!(
                    "[{:.3}] {} {} -> {}",
                    now,
                    participant.weapon.role().as_str(),
                    old.as_str(),
                    new.as_str()
                );
            }
        }

        for participant in &mut self.participants {
            for event in participant.recorder.drain() {
                participant.tally.record(&event);
            }
        }

        self.flush(now);
        self.clock.advance();
    }

    fn drive_input(&mut self, now: SimTime) {
        let in_window = now >= self.config.hold_at && now < self.config.release_at;
        let controller = &mut self.participants[CONTROLLER.0 as usize].weapon;

        if in_window && !self.holding {
            log::info!("[{:.3}] controller presses fire", now);
            controller.start_fire();
            self.holding = true;
        } else if !in_window && self.holding {
            log::info!("[{:.3}] controller releases fire", now);
            controller.stop_fire();
            self.holding = false;
        }
    }

    fn deliver(&mut self, now: SimTime) {
        for delivered in self.network.take_ready(now) {
            let participant = &mut self.participants[delivered.to.0 as usize];
            match participant.endpoint.receive(delivered.from, &delivered.data) {
                Ok(messages) => {
                    for (weapon, message) in messages {
                        if weapon != participant.weapon.id() {
                            log::trace!("message for unknown weapon {}", weapon.0);
                            continue;
                        }
                        participant.weapon.handle_message(message);
                    }
                }
                Err(e) => log::warn!(
                    "peer {} dropped packet from {}: {e}",
                    delivered.to.0,
                    delivered.from.0
                ),
            }
        }
    }

    fn flush(&mut self, now: SimTime) {
        for participant in &mut self.participants {
            let from = participant.endpoint.local();
            let outgoing: Vec<_> = participant.weapon.drain_outgoing().collect();

            for message in outgoing {
                match participant.endpoint.encode(participant.weapon.id(), message) {
                    Ok(packets) => {
                        for (to, data) in packets {
                            self.network.send(from, to, data, now);
                        }
                    }
                    Err(e) => log::warn!(
                        "peer {} failed to encode {}: {e}",
                        from.0,
                        message.message.name()
                    ),
                }
            }
        }
    }

    fn summary(&self) -> Summary {
        Summary {
            elapsed: self.clock.now(),
            steps: self.clock.tick(),
            participants: self
                .participants
                .iter()
                .map(|p| {
                    let stats = p.endpoint.stats();
                    ParticipantSummary {
                        peer: p.endpoint.local(),
                        role: p.weapon.role(),
                        state: p.weapon.weapon_state(),
                        tally: p.tally,
                        packets_sent: stats.packets_sent,
                        packets_received: stats.packets_received,
                        packets_rejected: stats.packets_rejected,
                    }
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weapon_logic::{FireDedup, LinkConditions, WeaponConfig};

    fn summary_for(config: SimConfig) -> Summary {
        Session::new(config).run()
    }

    fn by_role(summary: &Summary, role: NetRole) -> &ParticipantSummary {
        summary
            .participants
            .iter()
            .find(|p| p.role == role)
            .unwrap()
    }

    #[test]
    fn default_session_converges() {
        let summary = summary_for(SimConfig {
            weapon: WeaponConfig::new(0.25),
            link: LinkConditions::latency(30, 60, 10),
            ..SimConfig::default()
        });

        assert!(summary.converged());
        assert_eq!(summary.authority_state(), Some(FireState::Idle));

        let authority = by_role(&summary, NetRole::Authority);
        let observer = by_role(&summary, NetRole::Observer);
        let controller = by_role(&summary, NetRole::Controller);
        assert!(authority.tally.authoritative > 0);
        assert_eq!(observer.tally.authoritative, authority.tally.authoritative);
        assert_eq!(observer.tally.predicted, 0);
        assert!(controller.tally.predicted > 0);
    }

    #[test]
    fn zero_latency_controller_predicts_same_count() {
        let summary = summary_for(SimConfig {
            weapon: WeaponConfig::new(0.5),
            ..SimConfig::default()
        });

        let authority = by_role(&summary, NetRole::Authority);
        let controller = by_role(&summary, NetRole::Controller);
        assert_eq!(controller.tally.predicted, authority.tally.authoritative);
    }

    #[test]
    fn dedup_hides_confirmed_relays_from_controller() {
        let summary = summary_for(SimConfig {
            weapon: WeaponConfig::new(0.25),
            link: LinkConditions::latency(20, 20, 0),
            fire_dedup: FireDedup::SuppressConfirmed { tolerance: 0.05 },
            ..SimConfig::default()
        });

        let controller = by_role(&summary, NetRole::Controller);
        assert!(controller.tally.predicted > 0);
        assert!(controller.tally.authoritative < controller.tally.predicted);
    }

    #[test]
    fn invalid_weapon_config_fires_nothing() {
        let summary = summary_for(SimConfig {
            weapon: WeaponConfig::new(0.0),
            ..SimConfig::default()
        });

        assert!(summary.converged());
        for participant in &summary.participants {
            assert_eq!(participant.tally.predicted, 0);
            assert_eq!(participant.tally.authoritative, 0);
        }
    }
}
