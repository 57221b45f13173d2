#![forbid(unsafe_code)]

//! One-shot gate for "background image finished loading".
//!
//! The image may already be cached when the host subscribes, and browsers
//! may deliver `load` more than once if the source is reassigned. The gate
//! turns both into a single callback invocation.
//!
//! # Invariants
//!
//! 1. At most one callback is buffered; later subscriptions are dropped.
//! 2. The buffered callback fires exactly once, on the first of
//!    [`ReadyGate::notify_loaded`] or a subscription made after loading.
//! 3. Further load notifications are no-ops.

use tracing::{trace, warn};

type ReadyCallback = Box<dyn FnOnce()>;

/// Gate state.
enum GateState {
    /// Nothing loaded yet; holds the buffered callback, if any.
    Waiting(Option<ReadyCallback>),
    /// Image loaded but nobody subscribed yet.
    Loaded,
    /// Callback has run.
    Fired,
}

/// Buffers one ready callback until the image has loaded.
pub struct ReadyGate {
    state: GateState,
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReadyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            GateState::Waiting(None) => "waiting",
            GateState::Waiting(Some(_)) => "waiting (subscribed)",
            GateState::Loaded => "loaded",
            GateState::Fired => "fired",
        };
        f.debug_struct("ReadyGate").field("state", &state).finish()
    }
}

impl ReadyGate {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: GateState::Waiting(None),
        }
    }

    /// Register the callback to run once the image is loaded.
    ///
    /// Runs it immediately when the load has already been observed.
    pub fn subscribe(&mut self, callback: impl FnOnce() + 'static) {
        match &mut self.state {
            GateState::Waiting(slot @ None) => *slot = Some(Box::new(callback)),
            GateState::Waiting(Some(_)) | GateState::Fired => {
                warn!("ready callback already registered; ignoring");
            }
            GateState::Loaded => {
                self.state = GateState::Fired;
                callback();
            }
        }
    }

    /// Record that the image finished loading.
    pub fn notify_loaded(&mut self) {
        match std::mem::replace(&mut self.state, GateState::Fired) {
            GateState::Waiting(Some(callback)) => {
                trace!("background image loaded; firing ready callback");
                callback();
            }
            GateState::Waiting(None) => self.state = GateState::Loaded,
            previous @ (GateState::Loaded | GateState::Fired) => {
                trace!("duplicate image load notification");
                self.state = previous;
            }
        }
    }

    /// Whether the image load has been observed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, GateState::Loaded | GateState::Fired)
    }

    /// Whether the callback has run.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        matches!(self.state, GateState::Fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        (count, move || handle.set(handle.get() + 1))
    }

    #[test]
    fn fires_on_load_after_subscribe() {
        let mut gate = ReadyGate::new();
        let (count, callback) = counter();
        gate.subscribe(callback);
        assert_eq!(count.get(), 0);
        assert!(!gate.is_loaded());

        gate.notify_loaded();
        assert_eq!(count.get(), 1);
        assert!(gate.has_fired());
    }

    #[test]
    fn fires_immediately_when_already_loaded() {
        let mut gate = ReadyGate::new();
        gate.notify_loaded();
        assert!(gate.is_loaded());
        assert!(!gate.has_fired());

        let (count, callback) = counter();
        gate.subscribe(callback);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn repeated_load_notifications_fire_once() {
        let mut gate = ReadyGate::new();
        let (count, callback) = counter();
        gate.subscribe(callback);
        gate.notify_loaded();
        gate.notify_loaded();
        gate.notify_loaded();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn second_subscription_is_ignored() {
        let mut gate = ReadyGate::new();
        let (first, first_cb) = counter();
        let (second, second_cb) = counter();
        gate.subscribe(first_cb);
        gate.subscribe(second_cb);
        gate.notify_loaded();
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0);

        let (late, late_cb) = counter();
        gate.subscribe(late_cb);
        assert_eq!(late.get(), 0);
    }
}
