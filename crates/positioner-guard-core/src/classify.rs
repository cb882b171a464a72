//! Request classification by target interface name and opcode.
//!
//! Only the target object's own interface name is available at the marshaling
//! boundary, so classification is a string comparison plus an opcode check.

use crate::call::ArgKind;

/// Interface name of positioner objects.
pub const POSITIONER_INTERFACE: &str = "xdg_positioner";
/// `xdg_positioner.set_size(width: int, height: int)`.
pub const POSITIONER_SET_SIZE: u32 = 1;

/// Interface name of popup objects.
pub const POPUP_INTERFACE: &str = "xdg_popup";
/// `xdg_popup.reposition(positioner: object, token: uint)`.
pub const POPUP_REPOSITION: u32 = 2;

/// Argument signature of `set_size`.
pub const SET_SIZE_SHAPE: &[ArgKind] = &[ArgKind::Int, ArgKind::Int];
/// Argument signature of `reposition`.
pub const REPOSITION_SHAPE: &[ArgKind] = &[ArgKind::Object, ArgKind::Uint];

/// What the guard knows about a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// `xdg_positioner.set_size`.
    SizeSet,
    /// `xdg_popup.reposition`, which depends on the preceding `set_size`.
    DependentOp,
    /// Anything else; always forwarded.
    Other,
}

impl CallKind {
    /// Argument signature the guard decodes for this kind.
    #[must_use]
    pub const fn shape(self) -> &'static [ArgKind] {
        match self {
            Self::SizeSet => SET_SIZE_SHAPE,
            Self::DependentOp => REPOSITION_SHAPE,
            Self::Other => &[],
        }
    }

    #[must_use]
    pub const fn is_tracked(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Classify a request. A missing interface name is `Other`.
#[must_use]
pub fn classify(interface: Option<&str>, opcode: u32) -> CallKind {
    match (interface, opcode) {
        (Some(POSITIONER_INTERFACE), POSITIONER_SET_SIZE) => CallKind::SizeSet,
        (Some(POPUP_INTERFACE), POPUP_REPOSITION) => CallKind::DependentOp,
        _ => CallKind::Other,
    }
}
