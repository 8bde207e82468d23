//! Process-wide `tracing` subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a formatting subscriber filtered by `RUST_LOG`, falling back to
/// `level` (e.g. "info", "fortsrobot_core=debug").
///
/// Only the first call in a process installs anything; later calls return
/// `false`.
pub fn init(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .try_init()
        .is_ok()
}
