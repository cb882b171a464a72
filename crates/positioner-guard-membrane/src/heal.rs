//! Corrective actions taken by the guard.
//!
//! Every decision the interceptor makes about a tracked request maps to exactly
//! one [`GuardAction`]. Actions are plain data: they are recorded in
//! [`crate::metrics::GuardMetrics`] and attached to trace events, never
//! interpreted a second time.

use serde::{Deserialize, Serialize};

/// Action applied to one outgoing request (or to a deferred event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GuardAction {
    /// A positioner size was accepted and forwarded.
    AcceptSize { width: i32, height: i32 },
    /// A positioner size with a non-positive dimension was dropped.
    RejectSize { width: i32, height: i32 },
    /// A popup reposition following a rejected size was dropped; its token is kept.
    SuppressReposition { token: u32 },
    /// A `repositioned` event was synthesized for a suppressed reposition.
    SynthesizeRepositioned { token: u32 },
    /// A deferred `repositioned` event had no registered handler and was discarded.
    DropRepositioned { token: u32 },
    /// A tracked request carried arguments of an unexpected shape and was forwarded.
    ForwardMalformed,
    /// Nothing to do.
    None,
}

impl GuardAction {
    /// Returns true if this action changed what reached the compositor or the client.
    #[must_use]
    pub const fn is_heal(&self) -> bool {
        matches!(
            self,
            Self::RejectSize { .. }
                | Self::SuppressReposition { .. }
                | Self::SynthesizeRepositioned { .. }
        )
    }

    /// Returns true if the request that produced this action must not be forwarded.
    #[must_use]
    pub const fn suppresses_request(&self) -> bool {
        matches!(self, Self::RejectSize { .. } | Self::SuppressReposition { .. })
    }

    /// Short stable label used in logs and reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AcceptSize { .. } => "accept_size",
            Self::RejectSize { .. } => "reject_size",
            Self::SuppressReposition { .. } => "suppress_reposition",
            Self::SynthesizeRepositioned { .. } => "synthesize_repositioned",
            Self::DropRepositioned { .. } => "drop_repositioned",
            Self::ForwardMalformed => "forward_malformed",
            Self::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_suppressions_and_synthesis_are_heals() {
        assert!(
            GuardAction::RejectSize {
                width: 0,
                height: 0
            }
            .is_heal()
        );
        assert!(GuardAction::SuppressReposition { token: 1 }.is_heal());
        assert!(GuardAction::SynthesizeRepositioned { token: 1 }.is_heal());
        assert!(
            !GuardAction::AcceptSize {
                width: 1,
                height: 1
            }
            .is_heal()
        );
        assert!(!GuardAction::DropRepositioned { token: 1 }.is_heal());
        assert!(!GuardAction::ForwardMalformed.is_heal());
        assert!(!GuardAction::None.is_heal());
    }

    #[test]
    fn suppressing_actions() {
        assert!(
            GuardAction::RejectSize {
                width: -1,
                height: 5
            }
            .suppresses_request()
        );
        assert!(GuardAction::SuppressReposition { token: 9 }.suppresses_request());
        assert!(!GuardAction::SynthesizeRepositioned { token: 9 }.suppresses_request());
        assert!(!GuardAction::ForwardMalformed.suppresses_request());
    }

    #[test]
    fn serializes_with_action_tag() {
        let json = serde_json::to_value(GuardAction::SuppressReposition { token: 7 }).unwrap();
        assert_eq!(json["action"], "suppress_reposition");
        assert_eq!(json["token"], 7);
        assert_eq!(
            GuardAction::SuppressReposition { token: 7 }.label(),
            "suppress_reposition"
        );
    }
}
