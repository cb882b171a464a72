//! Resolution of the libwayland-client functions the guard depends on.
//!
//! `wl_proxy_marshal_array_flags` is looked up with `RTLD_NEXT` so the
//! interposed definition in this library is skipped. The introspection
//! helpers are not interposed and are looked up globally first.

use std::ffi::{CStr, c_char, c_void};

use thiserror::Error;

use crate::wayland::{GetClassFn, GetListenerFn, GetUserDataFn, MarshalArrayFlagsFn};

pub const MARSHAL_ARRAY_FLAGS: &CStr = c"wl_proxy_marshal_array_flags";
pub const GET_CLASS: &CStr = c"wl_proxy_get_class";
pub const GET_LISTENER: &CStr = c"wl_proxy_get_listener";
pub const GET_USER_DATA: &CStr = c"wl_proxy_get_user_data";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("symbol `{symbol}` not found: {reason}")]
    Missing { symbol: String, reason: String },
}

/// Entry points injected into [`crate::WaylandHost`].
#[derive(Clone, Copy)]
pub struct WaylandSymbols {
    pub marshal_array_flags: MarshalArrayFlagsFn,
    pub get_class: GetClassFn,
    pub get_listener: GetListenerFn,
    pub get_user_data: GetUserDataFn,
}

impl WaylandSymbols {
    /// Resolve every entry point from the running process.
    pub fn resolve() -> Result<Self, ResolveError> {
        let marshal = lookup(MARSHAL_ARRAY_FLAGS, &[libc::RTLD_NEXT])?;
        let get_class = lookup(GET_CLASS, &[libc::RTLD_DEFAULT, libc::RTLD_NEXT])?;
        let get_listener = lookup(GET_LISTENER, &[libc::RTLD_DEFAULT, libc::RTLD_NEXT])?;
        let get_user_data = lookup(GET_USER_DATA, &[libc::RTLD_DEFAULT, libc::RTLD_NEXT])?;

        // SAFETY: each symbol is the libwayland-client function of the same
        // name, whose C signature the target type mirrors.
        unsafe {
            Ok(Self {
                marshal_array_flags: std::mem::transmute::<*mut c_void, MarshalArrayFlagsFn>(
                    marshal,
                ),
                get_class: std::mem::transmute::<*mut c_void, GetClassFn>(get_class),
                get_listener: std::mem::transmute::<*mut c_void, GetListenerFn>(get_listener),
                get_user_data: std::mem::transmute::<*mut c_void, GetUserDataFn>(get_user_data),
            })
        }
    }
}

fn lookup(symbol: &CStr, handles: &[*mut c_void]) -> Result<*mut c_void, ResolveError> {
    let mut reason = String::from("no search scope");
    for &handle in handles {
        // SAFETY: `symbol` is NUL-terminated; `handle` is a dlsym pseudo-handle.
        let ptr = unsafe { libc::dlsym(handle, symbol.as_ptr()) };
        if !ptr.is_null() {
            return Ok(ptr);
        }
        reason = last_dl_error();
    }
    Err(ResolveError::Missing {
        symbol: symbol.to_string_lossy().into_owned(),
        reason,
    })
}

fn last_dl_error() -> String {
    // SAFETY: dlerror returns null or a NUL-terminated thread-local message.
    let msg: *const c_char = unsafe { libc::dlerror() };
    if msg.is_null() {
        String::from("symbol resolved to null")
    } else {
        // SAFETY: non-null dlerror result is a valid C string until the next dl* call.
        unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
    }
}
