//! Atomic counters for guard observability.
//!
//! All counters use relaxed ordering; they are diagnostic, not synchronization
//! primitives.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::heal::GuardAction;

/// Per-interceptor decision counters.
pub struct GuardMetrics {
    /// Outgoing requests seen by the interceptor.
    pub calls_intercepted: AtomicU64,
    /// Requests handed to the real marshaling entry point.
    pub calls_forwarded: AtomicU64,
    /// Positioner sizes accepted.
    pub sizes_accepted: AtomicU64,
    /// Positioner sizes rejected.
    pub sizes_rejected: AtomicU64,
    /// Popup repositions suppressed.
    pub repositions_suppressed: AtomicU64,
    /// `repositioned` events synthesized and delivered.
    pub events_synthesized: AtomicU64,
    /// Deferred events discarded for lack of a handler.
    pub events_dropped: AtomicU64,
    /// Tracked requests with unexpected argument shapes.
    pub malformed_calls: AtomicU64,
}

impl GuardMetrics {
    /// Create a new zeroed metrics instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calls_intercepted: AtomicU64::new(0),
            calls_forwarded: AtomicU64::new(0),
            sizes_accepted: AtomicU64::new(0),
            sizes_rejected: AtomicU64::new(0),
            repositions_suppressed: AtomicU64::new(0),
            events_synthesized: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
            malformed_calls: AtomicU64::new(0),
        }
    }

    /// Increment a counter by 1.
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read a counter value.
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    /// Count one guard action.
    pub fn record(&self, action: &GuardAction) {
        let counter = match action {
            GuardAction::AcceptSize { .. } => &self.sizes_accepted,
            GuardAction::RejectSize { .. } => &self.sizes_rejected,
            GuardAction::SuppressReposition { .. } => &self.repositions_suppressed,
            GuardAction::SynthesizeRepositioned { .. } => &self.events_synthesized,
            GuardAction::DropRepositioned { .. } => &self.events_dropped,
            GuardAction::ForwardMalformed => &self.malformed_calls,
            GuardAction::None => return,
        };
        Self::inc(counter);
    }

    /// Snapshot all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls_intercepted: Self::get(&self.calls_intercepted),
            calls_forwarded: Self::get(&self.calls_forwarded),
            sizes_accepted: Self::get(&self.sizes_accepted),
            sizes_rejected: Self::get(&self.sizes_rejected),
            repositions_suppressed: Self::get(&self.repositions_suppressed),
            events_synthesized: Self::get(&self.events_synthesized),
            events_dropped: Self::get(&self.events_dropped),
            malformed_calls: Self::get(&self.malformed_calls),
        }
    }
}

impl Default for GuardMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of all guard counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub calls_intercepted: u64,
    pub calls_forwarded: u64,
    pub sizes_accepted: u64,
    pub sizes_rejected: u64,
    pub repositions_suppressed: u64,
    pub events_synthesized: u64,
    pub events_dropped: u64,
    pub malformed_calls: u64,
}

impl MetricsSnapshot {
    /// Requests the guard kept away from the compositor.
    #[must_use]
    pub const fn suppressed_total(&self) -> u64 {
        self.sizes_rejected + self.repositions_suppressed
    }
}
