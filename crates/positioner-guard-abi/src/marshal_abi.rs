//! Exported C entry points.
//!
//! The process holds a single [`Interceptor`] for libwayland-client's request
//! stream. It is built once, either explicitly through [`install`] or on the
//! first intercepted request from symbols resolved in the running process.

use std::ffi::c_int;
use std::ptr;
use std::sync::OnceLock;

use positioner_guard_core::Interceptor;
use positioner_guard_membrane::{GuardMode, MetricsSnapshot, guard_mode};

use crate::host::{MarshalCall, WaylandHost};
use crate::logging;
use crate::symbols::WaylandSymbols;
use crate::wayland::{ProxyPtr, WlArgument, WlInterface, WlProxy};

static GUARD: OnceLock<Interceptor<WaylandHost>> = OnceLock::new();

fn build(symbols: WaylandSymbols, mode: GuardMode) -> Interceptor<WaylandHost> {
    logging::init();
    tracing::debug!(mode = mode.as_str(), "positioner guard installed");
    Interceptor::with_mode(WaylandHost::new(symbols), mode)
}

/// Install the process-wide interceptor with explicit entry points.
///
/// Returns false if an interceptor already exists; the first one stays.
pub fn install(symbols: WaylandSymbols) -> bool {
    let mut installed = false;
    GUARD.get_or_init(|| {
        installed = true;
        build(symbols, guard_mode())
    });
    installed
}

/// The installed interceptor, if any.
pub fn installed() -> Option<&'static Interceptor<WaylandHost>> {
    GUARD.get()
}

fn guard() -> &'static Interceptor<WaylandHost> {
    GUARD.get_or_init(|| match WaylandSymbols::resolve() {
        Ok(symbols) => build(symbols, guard_mode()),
        Err(err) => {
            logging::init();
            tracing::error!(error = %err, "cannot reach libwayland-client");
            eprintln!("positioner-guard: {err}");
            // Forwarding to an unresolved entry point is not an option.
            std::process::abort();
        }
    })
}

/// Interposed `wl_proxy_marshal_array_flags`.
///
/// Suppressed requests return null, exactly as a request that creates no
/// object would.
#[cfg_attr(not(test), unsafe(no_mangle))]
pub unsafe extern "C" fn wl_proxy_marshal_array_flags(
    proxy: *mut WlProxy,
    opcode: u32,
    interface: *const WlInterface,
    version: u32,
    flags: u32,
    args: *mut WlArgument,
) -> *mut WlProxy {
    let call = MarshalCall {
        proxy: ProxyPtr::from_raw(proxy),
        opcode,
        interface,
        version,
        flags,
        args,
    };
    guard()
        .intercept(call)
        .map_or(ptr::null_mut(), ProxyPtr::as_ptr)
}

/// C view of [`MetricsSnapshot`].
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GuardMetricsSnapshot {
    pub calls_intercepted: u64,
    pub calls_forwarded: u64,
    pub sizes_accepted: u64,
    pub sizes_rejected: u64,
    pub repositions_suppressed: u64,
    pub events_synthesized: u64,
    pub events_dropped: u64,
    pub malformed_calls: u64,
}

impl From<MetricsSnapshot> for GuardMetricsSnapshot {
    fn from(s: MetricsSnapshot) -> Self {
        Self {
            calls_intercepted: s.calls_intercepted,
            calls_forwarded: s.calls_forwarded,
            sizes_accepted: s.sizes_accepted,
            sizes_rejected: s.sizes_rejected,
            repositions_suppressed: s.repositions_suppressed,
            events_synthesized: s.events_synthesized,
            events_dropped: s.events_dropped,
            malformed_calls: s.malformed_calls,
        }
    }
}

/// Copy the guard's counters into `out`. All zero before the first request.
///
/// Returns 0 on success, -1 if `out` is null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn positioner_guard_metrics_snapshot(out: *mut GuardMetricsSnapshot) -> c_int {
    if out.is_null() {
        return -1;
    }
    let snapshot = installed()
        .map(|g| GuardMetricsSnapshot::from(g.metrics()))
        .unwrap_or_default();
    // SAFETY: caller provides a writable snapshot struct.
    unsafe { out.write(snapshot) };
    0
}
