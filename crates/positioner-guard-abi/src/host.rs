//! [`Host`] implementation over libwayland-client function pointers.

use std::ffi::{CStr, c_void};

use positioner_guard_core::{
    ArgKind, Argument, Arguments, DeferredEvent, Delivery, Host, ObjectRef,
};

use crate::symbols::WaylandSymbols;
use crate::wayland::{WlArgument, WlInterface, XdgPopupListener};
use crate::ProxyPtr;

/// The arguments of one `wl_proxy_marshal_array_flags` call, untouched.
#[derive(Debug, Clone, Copy)]
pub struct MarshalCall {
    pub proxy: ProxyPtr,
    pub opcode: u32,
    pub interface: *const WlInterface,
    pub version: u32,
    pub flags: u32,
    pub args: *mut WlArgument,
}

pub struct WaylandHost {
    symbols: WaylandSymbols,
}

impl WaylandHost {
    #[must_use]
    pub const fn new(symbols: WaylandSymbols) -> Self {
        Self { symbols }
    }
}

impl Host for WaylandHost {
    type Proxy = ProxyPtr;
    type Call = MarshalCall;

    fn target(&self, call: &MarshalCall) -> ProxyPtr {
        call.proxy
    }

    fn opcode(&self, call: &MarshalCall) -> u32 {
        call.opcode
    }

    fn interface_name(&self, proxy: ProxyPtr) -> Option<&str> {
        if proxy.is_null() {
            return None;
        }
        // SAFETY: `proxy` is a live proxy handed to us by libwayland's caller.
        let name = unsafe { (self.symbols.get_class)(proxy.as_ptr()) };
        if name.is_null() {
            return None;
        }
        // SAFETY: interface names are static NUL-terminated strings owned by
        // the protocol's `wl_interface`.
        unsafe { CStr::from_ptr(name) }.to_str().ok()
    }

    fn arguments(&self, call: &MarshalCall, shape: &[ArgKind]) -> Option<Arguments> {
        if call.args.is_null() {
            return None;
        }
        let values = shape
            .iter()
            .enumerate()
            .map(|(index, kind)| {
                // SAFETY: the caller's signature for this request has at least
                // `shape.len()` arguments, so `index` is in bounds.
                let raw = unsafe { *call.args.add(index) };
                // SAFETY: `kind` is the member libwayland reads for this slot.
                unsafe {
                    match kind {
                        ArgKind::Int => Argument::Int(raw.i),
                        ArgKind::Uint => Argument::Uint(raw.u),
                        ArgKind::Object => Argument::Object(ObjectRef(raw.o as usize)),
                    }
                }
            })
            .collect();
        Some(Arguments::new(values))
    }

    fn forward(&self, call: MarshalCall) -> Option<ProxyPtr> {
        // SAFETY: forwards the original, unmodified arguments to the real
        // implementation resolved for this process.
        let result = unsafe {
            (self.symbols.marshal_array_flags)(
                call.proxy.as_ptr(),
                call.opcode,
                call.interface,
                call.version,
                call.flags,
                call.args,
            )
        };
        ProxyPtr::new(result)
    }

    fn dispatch_repositioned(&self, event: &DeferredEvent<ProxyPtr>) -> Delivery {
        let popup = event.popup.as_ptr();
        // SAFETY: `popup` was a live xdg_popup proxy when its reposition was
        // suppressed, one request ago.
        let listener = unsafe { (self.symbols.get_listener)(popup) }.cast::<XdgPopupListener>();
        if listener.is_null() {
            return Delivery::NoListener;
        }
        // SAFETY: an xdg_popup proxy's listener is a `struct xdg_popup_listener`.
        let Some(repositioned) = (unsafe { (*listener).repositioned }) else {
            return Delivery::NoListener;
        };
        // SAFETY: same proxy as above.
        let data: *mut c_void = unsafe { (self.symbols.get_user_data)(popup) };
        // SAFETY: invoked exactly as libwayland's dispatcher would deliver
        // `xdg_popup.repositioned`.
        unsafe { repositioned(data, popup, event.token) };
        Delivery::Delivered
    }
}
