//! # positioner-guard-membrane
//!
//! Policy substrate shared by the interceptor and the ABI boundary.
//!
//! - [`config`]: process-wide runtime mode (`POSITIONER_GUARD_MODE`).
//! - [`heal`]: the vocabulary of corrective actions the guard can take.
//! - [`metrics`]: relaxed atomic counters for every decision.

pub mod config;
pub mod heal;
pub mod metrics;

pub use config::{GuardMode, ParseModeError, guard_mode};
pub use heal::GuardAction;
pub use metrics::{GuardMetrics, MetricsSnapshot};
