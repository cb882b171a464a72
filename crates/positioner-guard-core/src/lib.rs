//! # positioner-guard-core
//!
//! Safe Rust model of the outgoing-request guard that sits in front of
//! libwayland-client's marshaling entry point.
//!
//! ```text
//! request -> deliver pending repositioned -> classify -> validate / gate -> forward
//! ```
//!
//! Nothing here touches raw pointers. The ABI crate supplies a [`Host`] that
//! knows how to read proxies and reach the real marshaling function; tests
//! supply an in-memory one.

#![deny(unsafe_code)]

pub mod call;
pub mod classify;
pub mod guard;
pub mod interceptor;

pub use call::{ArgKind, Argument, ArgumentError, Arguments, ObjectRef};
pub use classify::{CallKind, classify};
pub use guard::{DeferredEvent, GuardState, Phase};
pub use interceptor::{Delivery, Host, Interceptor};
pub use positioner_guard_membrane::{GuardAction, GuardMode, MetricsSnapshot};
