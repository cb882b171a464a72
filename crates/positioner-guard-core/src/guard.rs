//! Suppression flag and deferred-event slot.
//!
//! ```text
//! Idle --set_size(bad)--> Rejected --reposition--> DeferredPending --next request--> Idle
//!                         Rejected --set_size(ok)--> Idle
//! ```
//!
//! The flag remembers only the most recent `set_size`: every `set_size`
//! overwrites it. At most one deferred event exists; it is taken before any
//! other request is looked at.

use positioner_guard_membrane::GuardAction;

/// A `repositioned` event owed to a popup whose reposition was suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredEvent<P> {
    pub popup: P,
    pub token: u32,
}

/// Observable position in the positioning state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Rejected,
    DeferredPending,
}

/// Returns true if both dimensions are strictly positive.
#[must_use]
pub const fn size_is_valid(width: i32, height: i32) -> bool {
    width > 0 && height > 0
}

#[derive(Debug)]
pub struct GuardState<P> {
    reposition_blocked: bool,
    deferred: Option<DeferredEvent<P>>,
}

impl<P: Copy> GuardState<P> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reposition_blocked: false,
            deferred: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.deferred.is_some() {
            Phase::DeferredPending
        } else if self.reposition_blocked {
            Phase::Rejected
        } else {
            Phase::Idle
        }
    }

    /// Returns true if the next reposition will be suppressed.
    #[must_use]
    pub const fn reposition_blocked(&self) -> bool {
        self.reposition_blocked
    }

    #[must_use]
    pub const fn pending(&self) -> Option<&DeferredEvent<P>> {
        self.deferred.as_ref()
    }

    /// Remove and return the deferred event, if any.
    pub fn take_deferred(&mut self) -> Option<DeferredEvent<P>> {
        self.deferred.take()
    }

    /// Record a `set_size` and decide its fate.
    pub fn on_set_size(&mut self, width: i32, height: i32) -> GuardAction {
        if size_is_valid(width, height) {
            self.reposition_blocked = false;
            GuardAction::AcceptSize { width, height }
        } else {
            self.reposition_blocked = true;
            GuardAction::RejectSize { width, height }
        }
    }

    /// Record a `reposition` on `popup` and decide its fate.
    pub fn on_reposition(&mut self, popup: P, token: u32) -> GuardAction {
        if !self.reposition_blocked {
            return GuardAction::None;
        }
        debug_assert!(
            self.deferred.is_none(),
            "deferred event must be drained before the next request"
        );
        self.reposition_blocked = false;
        self.deferred = Some(DeferredEvent { popup, token });
        GuardAction::SuppressReposition { token }
    }
}

impl<P: Copy> Default for GuardState<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POPUP: u32 = 0xA0;

    #[test]
    fn starts_idle() {
        let state = GuardState::<u32>::new();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.reposition_blocked());
        assert!(state.pending().is_none());
    }

    #[test]
    fn size_validity() {
        assert!(size_is_valid(1, 1));
        assert!(size_is_valid(i32::MAX, 20));
        assert!(!size_is_valid(0, 0));
        assert!(!size_is_valid(0, 50));
        assert!(!size_is_valid(50, 0));
        assert!(!size_is_valid(-1, 10));
        assert!(!size_is_valid(10, i32::MIN));
    }

    #[test]
    fn rejected_size_blocks_next_reposition() {
        let mut state = GuardState::new();
        assert_eq!(
            state.on_set_size(0, 0),
            GuardAction::RejectSize {
                width: 0,
                height: 0
            }
        );
        assert_eq!(state.phase(), Phase::Rejected);

        assert_eq!(
            state.on_reposition(POPUP, 7),
            GuardAction::SuppressReposition { token: 7 }
        );
        assert_eq!(state.phase(), Phase::DeferredPending);
        assert!(!state.reposition_blocked());
        assert_eq!(
            state.pending(),
            Some(&DeferredEvent {
                popup: POPUP,
                token: 7
            })
        );

        assert_eq!(
            state.take_deferred(),
            Some(DeferredEvent {
                popup: POPUP,
                token: 7
            })
        );
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.take_deferred(), None);
    }

    #[test]
    fn accepted_size_leaves_reposition_alone() {
        let mut state = GuardState::new();
        assert_eq!(
            state.on_set_size(100, 200),
            GuardAction::AcceptSize {
                width: 100,
                height: 200
            }
        );
        assert_eq!(state.on_reposition(POPUP, 3), GuardAction::None);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.pending().is_none());
    }

    #[test]
    fn later_size_overwrites_rejection() {
        let mut state = GuardState::new();
        state.on_set_size(0, 50);
        assert_eq!(state.phase(), Phase::Rejected);
        state.on_set_size(10, 10);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.on_reposition(POPUP, 1), GuardAction::None);
    }

    #[test]
    fn repeated_rejections_do_not_accumulate() {
        let mut state = GuardState::new();
        state.on_set_size(0, 0);
        state.on_set_size(-3, 4);
        assert_eq!(
            state.on_reposition(POPUP, 2),
            GuardAction::SuppressReposition { token: 2 }
        );
        state.take_deferred();
        assert_eq!(state.on_reposition(POPUP, 3), GuardAction::None);
    }
}
