use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::simulation::SimTime;

use super::bus::{EventBus, ListenerId};
use super::types::WeaponEvent;

/// Subscribes to both event channels of a bus and queues what it sees,
/// for callers that prefer polling over callbacks.
#[derive(Debug, Clone)]
pub struct EventRecorder {
    events: Rc<RefCell<VecDeque<WeaponEvent>>>,
    listeners: [ListenerId; 2],
}

impl EventRecorder {
    pub fn attach(bus: &mut EventBus) -> Self {
        let events = Rc::new(RefCell::new(VecDeque::new()));

        let sink = Rc::clone(&events);
        let state_listener = bus.on_state_changed(move |event| {
            sink.borrow_mut().push_back(WeaponEvent::StateChanged(*event));
        });

        let sink = Rc::clone(&events);
        let fired_listener = bus.on_fired(move |event| {
            sink.borrow_mut().push_back(WeaponEvent::Fired(*event));
        });

        Self {
            events,
            listeners: [state_listener, fired_listener],
        }
    }

    pub fn detach(self, bus: &mut EventBus) {
        for id in self.listeners {
            bus.unsubscribe(id);
        }
    }

    pub fn drain(&self) -> Vec<WeaponEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn snapshot(&self) -> Vec<WeaponEvent> {
        self.events.borrow().iter().copied().collect()
    }

    pub fn fired_times(&self) -> Vec<SimTime> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| e.as_fired().map(|f| f.time))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Fired, StateChanged, WeaponId};
    use crate::weapon::FireState;

    #[test]
    fn records_in_emission_order() {
        let mut bus = EventBus::new();
        let recorder = EventRecorder::attach(&mut bus);

        bus.emit_state_changed(&StateChanged {
            weapon: WeaponId(3),
            old: FireState::Idle,
            new: FireState::Firing,
        });
        bus.emit_fired(&Fired {
            weapon: WeaponId(3),
            time: 1.0,
            authoritative: false,
        });

        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.fired_times(), vec![1.0]);

        let events = recorder.drain();
        assert!(events[0].as_state_changed().is_some());
        assert!(recorder.is_empty());
    }

    #[test]
    fn detach_stops_recording() {
        let mut bus = EventBus::new();
        let recorder = EventRecorder::attach(&mut bus);
        let handle = recorder.clone();
        recorder.detach(&mut bus);

        assert_eq!(bus.listener_count(), 0);
        bus.emit_fired(&Fired {
            weapon: WeaponId(1),
            time: 0.0,
            authoritative: true,
        });
        assert!(handle.is_empty());
    }
}
