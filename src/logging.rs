//! Logger setup for native and web hosts.

use crate::config::LogLevel;

/// Install the platform logger at the given level.
///
/// Returns `false` if a logger was already installed; the existing one is kept.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: LogLevel) -> bool {
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .try_init()
        .is_ok()
}

/// Install the platform logger at the given level.
///
/// Also routes panics to the browser console.
#[cfg(target_arch = "wasm32")]
pub fn init(level: LogLevel) -> bool {
    console_error_panic_hook::set_once();
    console_log::init_with_level(level.to_level()).is_ok()
}
