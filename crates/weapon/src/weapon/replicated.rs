/// A value owned by the authority and mirrored everywhere else.
///
/// Both local writes and incoming updates are diffed against the cached
/// value, so a change is reported only when the value actually moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Replicated<T> {
    value: T,
}

impl<T: Copy + PartialEq> Replicated<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    #[inline]
    pub fn get(&self) -> T {
        self.value
    }

    /// Returns `(old, new)` when the value changed.
    pub fn set(&mut self, value: T) -> Option<(T, T)> {
        if value == self.value {
            return None;
        }
        let old = std::mem::replace(&mut self.value, value);
        Some((old, value))
    }

    /// Same diffing as [`Replicated::set`]; kept separate so call sites read
    /// as "received from the authority" rather than "decided locally".
    pub fn apply_incoming(&mut self, value: T) -> Option<(T, T)> {
        self.set(value)
    }
}
