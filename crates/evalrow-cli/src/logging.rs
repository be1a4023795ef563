//! Tracing initialisation for the binary.
//!
//! Logs go to stderr so stdout stays reserved for artifact paths.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter for a `-v` count, starting from the configured level.
pub fn filter_directive(configured: &str, verbose: u8) -> &str {
    match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialise the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is used. Only the first call
/// takes effect.
pub fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}
