//! Logging for the swark crates
//!
//! Every crate in the workspace logs through the macros below so that a
//! single environment variable controls output:
//! - `SWARK_LOG=off` (default) - no logs
//! - `SWARK_LOG=info` - handler lifecycle (read, write, remove)
//! - `SWARK_LOG=debug` - parsing and handler inference decisions
//! - `SWARK_LOG=warn` / `SWARK_LOG=error` - problems only

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable consulted by [`init_diagnostics`].
pub const LOG_ENV: &str = "SWARK_LOG";

static INIT: Once = Once::new();

/// Map a `SWARK_LOG` value to a minimum level. `None` means logging is off.
///
/// Unknown values fall back to `Info` and are reported as `Err` so the
/// caller can warn about them once the runtime is up.
fn parse_level(value: &str) -> Result<Option<emit::Level>, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => Ok(None),
        "debug" => Ok(Some(emit::Level::Debug)),
        "info" => Ok(Some(emit::Level::Info)),
        "warn" => Ok(Some(emit::Level::Warn)),
        "error" => Ok(Some(emit::Level::Error)),
        other => Err(other.to_string()),
    }
}

/// Initialize diagnostics based on the `SWARK_LOG` environment variable.
///
/// Call once at startup. Later calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let requested = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());

        let (level, unknown) = match parse_level(&requested) {
            Ok(None) => return,
            Ok(Some(level)) => (level, None),
            Err(unknown) => (emit::Level::Info, Some(unknown)),
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if let Some(unknown) = unknown {
            emit::warn!("unknown {var} value {value}, using info", var: LOG_ENV, value: unknown.as_str());
        }

        // The runtime lives for the whole process.
        std::mem::forget(rt);
    });
}

/// Log basic operations users may want to see: reads, writes, removals.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics: parse results, handler inference steps.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable oddities: fallbacks, ignored settings.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that abort an operation.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;
