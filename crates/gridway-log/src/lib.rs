//! Logging setup for gridway.
//!
//! Library crates only emit `tracing` events; binaries and tests pick a
//! subscriber here. Process output is structured JSON, test output goes
//! through the libtest writer so it is captured per test.

pub use tracing::{debug, error, info, instrument, trace, warn, Level};
pub use tracing_subscriber::EnvFilter;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Install a JSON subscriber filtered by `RUST_LOG`, falling back to `info`
pub fn init_tracing() -> Result<(), InitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    init_json(filter)
}

/// Install a JSON subscriber with an explicit filter directive, e.g. `gridway_keyring=trace`
pub fn init_tracing_with_level(directive: &str) -> Result<(), InitError> {
    let filter = EnvFilter::try_new(directive)?;
    init_json(filter)
}

/// Install a plain-text subscriber writing through the test harness.
///
/// Safe to call from every test: only the first call in a process installs
/// the subscriber, later calls are no-ops.
pub fn init_tracing_test() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("trace"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

fn init_json(filter: EnvFilter) -> Result<(), InitError> {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .json(),
        )
        .try_init()?;

    Ok(())
}
