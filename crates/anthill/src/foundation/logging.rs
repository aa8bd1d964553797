//! Logging utilities
//!
//! The engine only talks to the `log` facade. Binaries pick a backend; these
//! helpers wire up `env_logger` the way the sandbox expects.

pub use log::{debug, error, info, trace, warn, LevelFilter};

/// Initialize the logging system from `RUST_LOG`
///
/// # Panics
///
/// Panics if a global logger was already installed.
pub fn init() {
    env_logger::init();
}

/// Initialize logging with a default level, still overridable through `RUST_LOG`
pub fn init_with_level(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Install a test-friendly logger. Returns `false` if one was already installed.
pub fn try_init() -> bool {
    env_logger::Builder::from_default_env()
        .is_test(true)
        .try_init()
        .is_ok()
}
