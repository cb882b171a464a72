//! Opt-in diagnostics for the preloaded library.
//!
//! A subscriber is installed only when `POSITIONER_GUARD_LOG` is set, so a
//! host application that never asks for it pays nothing and keeps its stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive (e.g. `debug`).
pub const LOG_ENV: &str = "POSITIONER_GUARD_LOG";

const FALLBACK_DIRECTIVE: &str = "warn";

/// Build the filter for a `POSITIONER_GUARD_LOG` value; unparsable values fall back to `warn`.
#[must_use]
pub fn filter_from(value: &str) -> EnvFilter {
    EnvFilter::try_new(value.trim()).unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVE))
}

/// Install a stderr subscriber if requested. Returns true if one was installed.
pub fn init() -> bool {
    let Ok(value) = std::env::var(LOG_ENV) else {
        return false;
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(&value))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn directives_are_parsed() {
        assert_eq!(filter_from("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(filter_from(" trace ").max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn bad_directive_falls_back_to_warn() {
        assert_eq!(
            filter_from("positioner=loud").max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }
}
