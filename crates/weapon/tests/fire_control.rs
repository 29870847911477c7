use std::cell::RefCell;
use std::rc::Rc;

use weapon_logic::{
    EventRecorder, FireState, GateFn, NetRole, SimTime, StateChanged, WeaponComponent,
    WeaponConfig, WeaponEvent, WeaponId,
};

fn armed(role: NetRole, interval: f32) -> (WeaponComponent, EventRecorder) {
    let mut weapon = WeaponComponent::new(WeaponId(1), role, WeaponConfig::new(interval));
    let recorder = EventRecorder::attach(weapon.events_mut());
    (weapon, recorder)
}

fn state_changes(events: &[WeaponEvent]) -> Vec<(FireState, FireState)> {
    events
        .iter()
        .filter_map(|e| e.as_state_changed())
        .map(|e| (e.old, e.new))
        .collect()
}

#[test]
fn scenario_a_sparse_steps() {
    let (mut weapon, recorder) = armed(NetRole::Authority, 0.5);
    weapon.start_fire();

    let shots_per_step: Vec<usize> = [0.0, 0.2, 0.5, 1.3]
        .iter()
        .map(|t| weapon.tick(t).shots)
        .collect();

    assert_eq!(shots_per_step, vec![1, 0, 1, 1]);
    assert_eq!(recorder.fired_times(), vec![0.0, 0.5, 1.0]);
    assert_eq!(weapon.timing().next_firing_time, 1.5);
}

#[test]
fn scenario_b_zero_interval_never_fires() {
    let (mut weapon, recorder) = armed(NetRole::Authority, 0.0);
    weapon.start_fire();

    let mut faults = 0;
    for step in 0..100 {
        let report = weapon.tick(&(step as SimTime * 0.05));
        if report.config_fault.is_some() {
            faults += 1;
        }
        assert_eq!(report.shots, 0);
    }

    assert_eq!(faults, 1);
    assert_eq!(weapon.weapon_state(), FireState::Firing);
    assert!(recorder.fired_times().is_empty());
    assert_eq!(
        state_changes(&recorder.drain()),
        vec![(FireState::Idle, FireState::Firing)]
    );
}

#[test]
fn scenario_c_release_mid_streak() {
    // An always-open gate shows that release does not consult the gate.
    let mut weapon = WeaponComponent::new(WeaponId(1), NetRole::Authority, WeaponConfig::new(0.5))
        .with_gate(GateFn(|_| true));
    let recorder = EventRecorder::attach(weapon.events_mut());

    weapon.start_fire();
    for step in 0..12 {
        weapon.tick(&(step as SimTime * 0.1));
    }
    assert_eq!(recorder.fired_times(), vec![0.0, 0.5, 1.0]);

    weapon.stop_fire();
    let report = weapon.tick(&1.2);
    assert_eq!(report.transition, Some((FireState::Firing, FireState::Idle)));
    assert_eq!(report.shots, 0);

    for step in 13..40 {
        weapon.tick(&(step as SimTime * 0.1));
    }
    assert_eq!(recorder.fired_times(), vec![0.0, 0.5, 1.0]);
    assert_eq!(weapon.weapon_state(), FireState::Idle);
}

#[test]
fn stall_is_caught_up_in_one_step() {
    let (mut weapon, recorder) = armed(NetRole::Authority, 0.25);
    weapon.start_fire();
    weapon.tick(&0.0);
    recorder.clear();

    // Four intervals pass without an evaluation.
    let report = weapon.tick(&1.0);
    assert_eq!(report.shots, 4);
    assert_eq!(recorder.fired_times(), vec![0.25, 0.5, 0.75, 1.0]);

    assert_eq!(weapon.tick(&1.0).shots, 0);
    assert_eq!(weapon.tick(&1.1).shots, 0);
    assert_eq!(weapon.tick(&1.25).shots, 1);
}

#[test]
fn tap_fire_is_rate_limited_by_previous_streak() {
    let (mut weapon, recorder) = armed(NetRole::Authority, 1.0);

    weapon.start_fire();
    weapon.tick(&0.0);
    weapon.stop_fire();
    weapon.tick(&0.1);

    weapon.start_fire();
    weapon.tick(&0.2);
    weapon.tick(&0.9);
    assert_eq!(recorder.fired_times(), vec![0.0]);

    weapon.tick(&1.0);
    assert_eq!(recorder.fired_times(), vec![0.0, 1.0]);
}

#[test]
fn streak_restart_after_cooldown_fires_immediately() {
    let (mut weapon, recorder) = armed(NetRole::Authority, 0.5);

    weapon.start_fire();
    weapon.tick(&0.0);
    weapon.stop_fire();
    weapon.tick(&0.1);

    weapon.start_fire();
    weapon.tick(&2.0);
    assert_eq!(recorder.fired_times(), vec![0.0, 2.0]);
}

#[test]
fn state_notifications_carry_old_and_new() {
    let (mut weapon, recorder) = armed(NetRole::Authority, 0.5);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    weapon.on_state_changed(move |e: &StateChanged| sink.borrow_mut().push(*e));

    weapon.start_fire();
    weapon.tick(&0.0);
    weapon.tick(&0.1);
    weapon.stop_fire();
    weapon.tick(&0.2);
    weapon.tick(&0.3);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].old, FireState::Idle);
    assert_eq!(seen[0].new, FireState::Firing);
    assert_eq!(seen[1].old, FireState::Firing);
    assert_eq!(seen[1].new, FireState::Idle);
    assert!(seen.iter().all(|e| e.weapon == WeaponId(1)));

    assert_eq!(state_changes(&recorder.drain()).len(), 2);
}

#[test]
fn observer_ignores_every_input() {
    let (mut weapon, recorder) = armed(NetRole::Observer, 0.1);

    for step in 0..50 {
        if step % 3 == 0 {
            weapon.start_fire();
        } else if step % 7 == 0 {
            weapon.stop_fire();
        }
        weapon.tick(&(step as SimTime * 0.1));
    }

    assert_eq!(weapon.weapon_state(), FireState::Idle);
    assert!(recorder.is_empty());
    assert!(!weapon.has_outgoing());
}

#[test]
fn unsubscribed_listener_stops_receiving() {
    let (mut weapon, _recorder) = armed(NetRole::Authority, 0.5);
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    let id = weapon.on_fired(move |_| *sink.borrow_mut() += 1);

    weapon.start_fire();
    weapon.tick(&0.0);
    assert!(weapon.unsubscribe(id));
    weapon.tick(&0.5);

    assert_eq!(*count.borrow(), 1);
}
