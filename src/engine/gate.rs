//! One-shot completion signal.

use std::fmt;

use tracing::info;

/// Holds the host's `finish` callback and invokes it at most once.
///
/// The callback is stored as an `FnOnce` and taken out on first use, so a
/// second `fire` has nothing left to call.
pub struct CompletionGate {
    callback: Option<Box<dyn FnOnce()>>,
    fired: bool,
}

impl CompletionGate {
    pub fn new(finish: impl FnOnce() + 'static) -> Self {
        Self {
            callback: Some(Box::new(finish)),
            fired: false,
        }
    }

    /// A gate with no host callback; still tracks whether it fired.
    pub fn detached() -> Self {
        Self {
            callback: None,
            fired: false,
        }
    }

    /// Returns `true` only on the call that actually fired.
    pub fn fire(&mut self) -> bool {
        if self.fired {
            return false;
        }
        self.fired = true;
        info!("completion gate fired");
        if let Some(finish) = self.callback.take() {
            finish();
        }
        true
    }

    pub fn is_fired(&self) -> bool {
        self.fired
    }
}

impl fmt::Debug for CompletionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionGate")
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn fires_exactly_once() {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let mut gate = CompletionGate::new(move || seen.set(seen.get() + 1));

        assert!(gate.fire());
        for _ in 0..10 {
            assert!(!gate.fire());
        }
        assert_eq!(count.get(), 1);
        assert!(gate.is_fired());
    }

    #[test]
    fn detached_gate_tracks_state() {
        let mut gate = CompletionGate::detached();
        assert!(!gate.is_fired());
        assert!(gate.fire());
        assert!(!gate.fire());
    }
}
