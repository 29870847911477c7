use super::state::FireState;

/// Decides whether a weapon may enter the Firing state this step.
///
/// Ammo, cooldown or reload systems implement this to add their own gating.
/// Releasing fire never consults the gate.
pub trait FireGate {
    fn can_start_firing(&self, state: FireState) -> bool {
        state == FireState::Idle
    }
}

/// Fires from Idle only.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleGate;

impl FireGate for IdleGate {}

/// Adapts a closure into a [`FireGate`].
pub struct GateFn<F>(pub F);

impl<F> FireGate for GateFn<F>
where
    F: Fn(FireState) -> bool,
{
    fn can_start_firing(&self, state: FireState) -> bool {
        (self.0)(state)
    }
}
