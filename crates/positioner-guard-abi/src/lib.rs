// Exported entry points receive raw pointers straight from libwayland-client;
// per-function safety docs would restate the C ABI contract each time.
#![allow(clippy::missing_safety_doc)]
//! # positioner-guard-abi
//!
//! `LD_PRELOAD` boundary for the positioner guard. The `cdylib` exports
//! `wl_proxy_marshal_array_flags`, so every request libwayland-client marshals
//! passes through the guard before reaching the real implementation.
//!
//! ```text
//! Qt -> wl_proxy_marshal_array_flags (this crate) -> Interceptor -> real libwayland
//! ```
//!
//! The real entry point and the proxy introspection helpers are resolved once
//! with `dlsym` and injected into the interceptor; tests inject fakes through
//! [`marshal_abi::install`].

pub mod host;
pub mod logging;
pub mod marshal_abi;
pub mod symbols;
pub mod wayland;

pub use host::{MarshalCall, WaylandHost};
pub use symbols::{ResolveError, WaylandSymbols};
pub use wayland::ProxyPtr;
