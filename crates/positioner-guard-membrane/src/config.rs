//! Runtime mode configuration.
//!
//! The runtime mode is set via the `POSITIONER_GUARD_MODE` environment variable:
//! - `enforce` (default): zero-sized positioner requests are suppressed and the
//!   matching popup reposition is answered with a synthesized `repositioned` event.
//! - `off`: no classification. Every request is forwarded to libwayland untouched.

use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the runtime mode.
pub const MODE_ENV: &str = "POSITIONER_GUARD_MODE";

/// A mode label that names neither `enforce` nor `off` (or an alias of either).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported guard mode `{0}`, expected enforce|off")]
pub struct ParseModeError(pub String);

/// Runtime operating mode for the guard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardMode {
    /// Validate positioner sizes and compensate suppressed repositions.
    #[default]
    Enforce,
    /// Pure passthrough.
    Off,
}

impl GuardMode {
    /// Parse from string (case-insensitive). Unknown values select `Enforce`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Returns true if outgoing calls are classified at all.
    #[must_use]
    pub const fn validation_enabled(self) -> bool {
        matches!(self, Self::Enforce)
    }

    /// Stable lowercase label, as accepted by [`GuardMode::from_str_loose`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enforce => "enforce",
            Self::Off => "off",
        }
    }
}

impl FromStr for GuardMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enforce" | "on" | "strict" | "default" => Ok(Self::Enforce),
            "off" | "none" | "disabled" | "passthrough" => Ok(Self::Off),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

// 0=unresolved, 1=Enforce, 2=Off, 255=resolving.
static CACHED_MODE: AtomicU8 = AtomicU8::new(0);

const MODE_UNRESOLVED: u8 = 0;
const MODE_ENFORCE: u8 = 1;
const MODE_OFF: u8 = 2;
const MODE_RESOLVING: u8 = 255;

fn mode_to_u8(mode: GuardMode) -> u8 {
    match mode {
        GuardMode::Enforce => MODE_ENFORCE,
        GuardMode::Off => MODE_OFF,
    }
}

fn u8_to_mode(v: u8) -> GuardMode {
    match v {
        MODE_OFF => GuardMode::Off,
        _ => GuardMode::Enforce,
    }
}

/// Get the configured mode (reads the environment on first call, caches thereafter).
///
/// A concurrent caller that observes the resolution in progress gets `Enforce`.
#[must_use]
pub fn guard_mode() -> GuardMode {
    let cached = CACHED_MODE.load(Ordering::Relaxed);

    if cached != MODE_UNRESOLVED && cached != MODE_RESOLVING {
        return u8_to_mode(cached);
    }

    if cached == MODE_RESOLVING {
        return GuardMode::Enforce;
    }

    if CACHED_MODE
        .compare_exchange(
            MODE_UNRESOLVED,
            MODE_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        let v = CACHED_MODE.load(Ordering::Relaxed);
        return if v != MODE_UNRESOLVED && v != MODE_RESOLVING {
            u8_to_mode(v)
        } else {
            GuardMode::Enforce
        };
    }

    let mode = std::env::var(MODE_ENV)
        .map(|v| GuardMode::from_str_loose(&v))
        .unwrap_or_default();
    CACHED_MODE.store(mode_to_u8(mode), Ordering::Release);
    mode
}
