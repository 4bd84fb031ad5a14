//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace, LevelFilter};

/// Initialize the logging system from `RUST_LOG`, falling back to `default`
/// when the variable is unset
pub fn init(default: LevelFilter) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default.to_string()))
        .format_timestamp_millis()
        .init();
}

/// Initialize logging for tests, ignoring repeated initialisation
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
