use std::collections::VecDeque;

use crate::event::{EventBus, FireDelivery, Fired, ListenerId, StateChanged, WeaponId, fire_delivery};
use crate::net::{Outgoing, WeaponMessage};
use crate::role::NetRole;
use crate::simulation::{ClockSampler, SimTime, TimeSource};

use super::config::{ConfigError, WeaponConfig};
use super::gate::{FireGate, IdleGate};
use super::prediction::{FireDedup, PredictionLedger};
use super::replicated::Replicated;
use super::state::{FireState, FireTiming};

/// What a single [`WeaponComponent::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepReport {
    pub time: SimTime,
    pub transition: Option<(FireState, FireState)>,
    pub shots: usize,
    /// Set on the first step that hit a bad config, not on later ones.
    pub config_fault: Option<ConfigError>,
}

/// Fire-control state machine for one weapon on one participant.
///
/// The authority owns the weapon state; a controller predicts its own fire
/// and forwards intent; an observer only applies replicated state and
/// relayed shots. Messages for other participants queue up in an outbox
/// that the transport drains with [`WeaponComponent::drain_outgoing`].
pub struct WeaponComponent {
    id: WeaponId,
    role: NetRole,
    config: WeaponConfig,
    multicast_fire: bool,
    dedup: FireDedup,
    state: Replicated<FireState>,
    timing: FireTiming,
    gate: Box<dyn FireGate>,
    clock: ClockSampler,
    events: EventBus,
    outbox: VecDeque<Outgoing>,
    predictions: PredictionLedger,
    config_fault_reported: bool,
}

impl WeaponComponent {
    pub fn new(id: WeaponId, role: NetRole, config: WeaponConfig) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("weapon {}: created with invalid config: {e}", id.0);
        }

        Self {
            id,
            role,
            config,
            multicast_fire: true,
            dedup: FireDedup::default(),
            state: Replicated::new(FireState::Idle),
            timing: FireTiming::default(),
            gate: Box::new(IdleGate),
            clock: ClockSampler::new(),
            events: EventBus::new(),
            outbox: VecDeque::new(),
            predictions: PredictionLedger::new(),
            config_fault_reported: false,
        }
    }

    /// When false the authority raises Fired locally only and relays nothing.
    pub fn with_multicast_fire(mut self, enabled: bool) -> Self {
        self.multicast_fire = enabled;
        self
    }

    pub fn with_gate(mut self, gate: impl FireGate + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    pub fn with_fire_dedup(mut self, dedup: FireDedup) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn id(&self) -> WeaponId {
        self.id
    }

    pub fn role(&self) -> NetRole {
        self.role
    }

    pub fn weapon_state(&self) -> FireState {
        self.state.get()
    }

    pub fn weapon_config(&self) -> WeaponConfig {
        self.config
    }

    pub fn timing(&self) -> &FireTiming {
        &self.timing
    }

    pub fn wants_fire(&self) -> bool {
        self.timing.wants_fire
    }

    pub fn multicast_fire(&self) -> bool {
        self.multicast_fire
    }

    pub fn fire_dedup(&self) -> FireDedup {
        self.dedup
    }

    pub fn pending_predictions(&self) -> usize {
        self.predictions.len()
    }

    pub fn set_weapon_config(&mut self, config: WeaponConfig) {
        if let Err(e) = config.validate() {
            log::warn!("weapon {}: invalid config applied: {e}", self.id.0);
        }
        self.config = config;
        self.config_fault_reported = false;
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn on_state_changed(
        &mut self,
        listener: impl FnMut(&StateChanged) + 'static,
    ) -> ListenerId {
        self.events.on_state_changed(listener)
    }

    pub fn on_fired(&mut self, listener: impl FnMut(&Fired) + 'static) -> ListenerId {
        self.events.on_fired(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn can_start_firing(&self) -> bool {
        self.gate.can_start_firing(self.state.get())
    }

    /// Latches fire intent. Returns false when the local role may not.
    pub fn start_fire(&mut self) -> bool {
        self.latch_intent(true, WeaponMessage::StartFireRequest)
    }

    pub fn stop_fire(&mut self) -> bool {
        self.latch_intent(false, WeaponMessage::StopFireRequest)
    }

    fn latch_intent(&mut self, wants_fire: bool, request: WeaponMessage) -> bool {
        if !self.role.can_mutate() {
            log::trace!(
                "weapon {}: {} ignored on {}",
                self.id.0,
                request.name(),
                self.role.as_str()
            );
            return false;
        }

        if self.role.forwards_intent() {
            self.outbox.push_back(Outgoing::to_authority(request));
        }

        self.timing.wants_fire = wants_fire;
        true
    }

    /// Runs one simulation step: state transition first, then every shot
    /// that became due since the previous step.
    pub fn tick(&mut self, clock: &impl TimeSource) -> StepReport {
        let now = self.clock.sample(clock);
        let mut report = StepReport {
            time: now,
            ..StepReport::default()
        };

        if !self.role.can_mutate() {
            return report;
        }

        let state = self.state.get();
        if self.timing.wants_fire {
            if state != FireState::Firing && self.gate.can_start_firing(state) {
                self.timing.start_firing_time = now;
                report.transition = self.change_state(FireState::Firing);
            }
        } else if state == FireState::Firing {
            report.transition = self.change_state(FireState::Idle);
        }

        if self.state.get() != FireState::Firing {
            return report;
        }

        match self.config.shot_interval() {
            Ok(interval) => {
                let shots: Vec<SimTime> = self.timing.due_shots(interval, now).collect();
                report.shots = shots.len();
                for time in shots {
                    self.fire(time);
                }
            }
            Err(e) => {
                if !self.config_fault_reported {
                    log::warn!("weapon {}: firing disabled: {e}", self.id.0);
                    self.config_fault_reported = true;
                    report.config_fault = Some(e);
                }
            }
        }

        report
    }

    /// Explicit state change, e.g. from a reload system. Ignored on observers.
    pub fn set_weapon_state(&mut self, state: FireState) -> bool {
        if !self.role.can_mutate() {
            log::trace!("weapon {}: state change ignored on observer", self.id.0);
            return false;
        }
        self.change_state(state).is_some()
    }

    /// Applies a replicated state value from the authority, raising
    /// StateChanged against the locally cached value.
    pub fn apply_replicated_state(&mut self, state: FireState) -> bool {
        if !self.role.receives_replication() {
            log::trace!("weapon {}: replicated state ignored on authority", self.id.0);
            return false;
        }

        match self.state.apply_incoming(state) {
            Some((old, new)) => {
                log::debug!(
                    "weapon {}: replicated {} -> {} on {}",
                    self.id.0,
                    old.as_str(),
                    new.as_str(),
                    self.role.as_str()
                );
                self.events.emit_state_changed(&StateChanged {
                    weapon: self.id,
                    old,
                    new,
                });
                true
            }
            None => false,
        }
    }

    /// Entry point for messages delivered by the transport.
    pub fn handle_message(&mut self, message: WeaponMessage) -> bool {
        match (message, self.role) {
            (WeaponMessage::StartFireRequest, NetRole::Authority) => self.start_fire(),
            (WeaponMessage::StopFireRequest, NetRole::Authority) => self.stop_fire(),
            (WeaponMessage::FireRelay { time }, NetRole::Controller | NetRole::Observer) => {
                self.receive_fire_relay(time)
            }
            (WeaponMessage::StateSync { state }, NetRole::Controller | NetRole::Observer) => {
                self.apply_replicated_state(FireState::from(state))
            }
            (message, role) => {
                log::trace!(
                    "weapon {}: {} not accepted on {}",
                    self.id.0,
                    message.name(),
                    role.as_str()
                );
                false
            }
        }
    }

    fn receive_fire_relay(&mut self, time: SimTime) -> bool {
        if self.role == NetRole::Controller {
            if let FireDedup::SuppressConfirmed { tolerance } = self.dedup {
                if self.predictions.confirm(time, tolerance) {
                    log::trace!("weapon {}: relayed shot at {time} already predicted", self.id.0);
                    return false;
                }
            }
        }

        self.emit_fired(time, true);
        true
    }

    fn change_state(&mut self, new: FireState) -> Option<(FireState, FireState)> {
        let (old, new) = self.state.set(new)?;

        log::debug!(
            "weapon {}: {} -> {} on {}",
            self.id.0,
            old.as_str(),
            new.as_str(),
            self.role.as_str()
        );

        if self.role.has_authority() {
            self.outbox
                .push_back(Outgoing::to_remotes(WeaponMessage::state_sync(new)));
        }

        self.events.emit_state_changed(&StateChanged {
            weapon: self.id,
            old,
            new,
        });

        Some((old, new))
    }

    fn fire(&mut self, time: SimTime) {
        match fire_delivery(self.role, self.multicast_fire) {
            FireDelivery::Multicast => {
                self.outbox
                    .push_back(Outgoing::to_remotes(WeaponMessage::FireRelay { time }));
                self.emit_fired(time, true);
            }
            FireDelivery::AuthorityOnly => self.emit_fired(time, true),
            FireDelivery::Predicted => {
                if matches!(self.dedup, FireDedup::SuppressConfirmed { .. }) {
                    self.predictions.record(time);
                }
                self.emit_fired(time, false);
            }
            FireDelivery::Suppressed => {}
        }
    }

    fn emit_fired(&mut self, time: SimTime, authoritative: bool) {
        log::trace!(
            "weapon {}: fired at {time} ({})",
            self.id.0,
            if authoritative { "authoritative" } else { "predicted" }
        );
        self.events.emit_fired(&Fired {
            weapon: self.id,
            time,
            authoritative,
        });
    }

    pub fn drain_outgoing(&mut self) -> impl Iterator<Item = Outgoing> + '_ {
        self.outbox.drain(..)
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outbox.is_empty()
    }
}

impl std::fmt::Debug for WeaponComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeaponComponent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("state", &self.state.get())
            .field("config", &self.config)
            .field("timing", &self.timing)
            .field("multicast_fire", &self.multicast_fire)
            .field("outbox", &self.outbox.len())
            .finish()
    }
}
