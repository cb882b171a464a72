//! libwayland-client ABI types used at the interposition boundary.
//!
//! Layouts follow `wayland-util.h`, `wayland-client-core.h` and the
//! scanner-generated `xdg-shell-client-protocol.h`.

use std::ffi::{c_char, c_void};
use std::fmt;

/// Opaque `struct wl_proxy`.
#[repr(C)]
pub struct WlProxy {
    _private: [u8; 0],
}

/// Opaque `struct wl_interface`.
#[repr(C)]
pub struct WlInterface {
    _private: [u8; 0],
}

/// `struct wl_array`.
#[repr(C)]
pub struct WlArray {
    pub size: usize,
    pub alloc: usize,
    pub data: *mut c_void,
}

/// `union wl_argument`.
#[repr(C)]
#[derive(Clone, Copy)]
pub union WlArgument {
    pub i: i32,
    pub u: u32,
    /// `wl_fixed_t`.
    pub f: i32,
    pub s: *const c_char,
    pub o: *mut c_void,
    pub n: u32,
    pub a: *mut WlArray,
    pub h: i32,
}

pub type MarshalArrayFlagsFn = unsafe extern "C" fn(
    proxy: *mut WlProxy,
    opcode: u32,
    interface: *const WlInterface,
    version: u32,
    flags: u32,
    args: *mut WlArgument,
) -> *mut WlProxy;
pub type GetClassFn = unsafe extern "C" fn(proxy: *mut WlProxy) -> *const c_char;
pub type GetListenerFn = unsafe extern "C" fn(proxy: *mut WlProxy) -> *const c_void;
pub type GetUserDataFn = unsafe extern "C" fn(proxy: *mut WlProxy) -> *mut c_void;

pub type PopupConfigureFn = unsafe extern "C" fn(
    data: *mut c_void,
    popup: *mut WlProxy,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
);
pub type PopupDoneFn = unsafe extern "C" fn(data: *mut c_void, popup: *mut WlProxy);
pub type RepositionedFn = unsafe extern "C" fn(data: *mut c_void, popup: *mut WlProxy, token: u32);

/// `struct xdg_popup_listener`.
///
/// A null function pointer in C maps to `None` here.
#[repr(C)]
pub struct XdgPopupListener {
    pub configure: Option<PopupConfigureFn>,
    pub popup_done: Option<PopupDoneFn>,
    /// Since xdg_popup version 3.
    pub repositioned: Option<RepositionedFn>,
}

/// Proxy pointer as an interceptor handle.
///
/// The guard only compares and stores the address; every dereference happens
/// inside libwayland-client or the client's own callbacks.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyPtr(*mut WlProxy);

// SAFETY: the address is used as an identity token and handed back to
// libwayland, which owns the object and its locking.
unsafe impl Send for ProxyPtr {}
// SAFETY: see above.
unsafe impl Sync for ProxyPtr {}

impl ProxyPtr {
    /// Wrap a raw proxy pointer, keeping null as-is.
    #[must_use]
    pub const fn from_raw(ptr: *mut WlProxy) -> Self {
        Self(ptr)
    }

    /// Wrap a non-null pointer; `None` for null.
    #[must_use]
    pub fn new(ptr: *mut WlProxy) -> Option<Self> {
        if ptr.is_null() { None } else { Some(Self(ptr)) }
    }

    #[must_use]
    pub const fn as_ptr(self) -> *mut WlProxy {
        self.0
    }

    #[must_use]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl fmt::Debug for ProxyPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProxyPtr({:p})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_union_is_pointer_sized() {
        assert_eq!(
            std::mem::size_of::<WlArgument>(),
            std::mem::size_of::<*mut c_void>()
        );
    }

    #[test]
    fn listener_slots_are_in_protocol_order() {
        let word = std::mem::size_of::<*const c_void>();
        assert_eq!(std::mem::offset_of!(XdgPopupListener, configure), 0);
        assert_eq!(std::mem::offset_of!(XdgPopupListener, popup_done), word);
        assert_eq!(std::mem::offset_of!(XdgPopupListener, repositioned), 2 * word);
    }

    #[test]
    fn null_proxy_handling() {
        assert!(ProxyPtr::new(std::ptr::null_mut()).is_none());
        assert!(ProxyPtr::from_raw(std::ptr::null_mut()).is_null());
        let mut byte = 0u8;
        let raw = (&mut byte as *mut u8).cast::<WlProxy>();
        assert_eq!(ProxyPtr::new(raw).map(ProxyPtr::as_ptr), Some(raw));
    }
}
