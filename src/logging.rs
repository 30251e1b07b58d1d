//! Tracing/log initialization.
//!
//! Installs a fmt subscriber with an env-filter and bridges `log` macros
//! into tracing. Safe to call more than once; later calls are no-ops.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub fn init() {
    init_with_filter("info");
}

pub fn init_with_filter(default_directive: &str) {
    // Route log-crate records through tracing. Errors mean a logger is
    // already installed.
    let _ = tracing_log::LogTracer::init();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
