//! ## Logging
//!
//! Two subscribers can be installed, and whichever comes first wins:
//!
//! - `DEBUG_RIDE_INSIGHTS` set to anything but `""`, `"0"` or `"false"` installs a `DEBUG`
//!   subscriber before `main` runs (via `ctor`), so dataset loading is traced from the start.
//! - Otherwise the binary calls [`init_default_logging`] for plain `INFO` output.
//!
//! ```sh
//! DEBUG_RIDE_INSIGHTS=1 ride-insights
//! ```

use ctor::ctor;
use tracing::Level;

/// Name of the environment variable that turns on debug logging.
pub const DEBUG_ENV_VAR: &str = "DEBUG_RIDE_INSIGHTS";

/// Returns true if `DEBUG_RIDE_INSIGHTS` asks for debug logging.
pub fn debug_logging_enabled() -> bool {
    std::env::var(DEBUG_ENV_VAR).map_or(false, |v| !(v == "0" || v == "false" || v.is_empty()))
}

/// Installs an `INFO` level subscriber unless one is already registered.
pub fn init_default_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .try_init();
}

#[ctor]
fn set_debug_level() {
    if debug_logging_enabled() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .try_init();
    }
}
