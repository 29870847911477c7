use super::types::{Fired, StateChanged};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type StateChangedFn = Box<dyn FnMut(&StateChanged)>;
type FiredFn = Box<dyn FnMut(&Fired)>;

#[derive(Default)]
pub struct EventBus {
    state_changed: Vec<(ListenerId, StateChangedFn)>,
    fired: Vec<(ListenerId, FiredFn)>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_state_changed(
        &mut self,
        listener: impl FnMut(&StateChanged) + 'static,
    ) -> ListenerId {
        let id = self.allocate_id();
        self.state_changed.push((id, Box::new(listener)));
        id
    }

    pub fn on_fired(&mut self, listener: impl FnMut(&Fired) + 'static) -> ListenerId {
        let id = self.allocate_id();
        self.fired.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listener_count();
        self.state_changed.retain(|(listener, _)| *listener != id);
        self.fired.retain(|(listener, _)| *listener != id);
        self.listener_count() != before
    }

    pub fn emit_state_changed(&mut self, event: &StateChanged) {
        for (_, listener) in &mut self.state_changed {
            listener(event);
        }
    }

    pub fn emit_fired(&mut self, event: &Fired) {
        for (_, listener) in &mut self.fired {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state_changed.len() + self.fired.len()
    }

    fn allocate_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("state_changed", &self.state_changed.len())
            .field("fired", &self.fired.len())
            .finish()
    }
}
