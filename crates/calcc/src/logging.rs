//! Logging setup for the `calcc` binary.
//!
//! Plain `LEVEL message` lines on stderr, without timestamps or module
//! paths. The level comes from the `-v` count unless `CALCC_LOG` holds a
//! filter directive such as `debug` or `calc_ir=trace`.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

pub const LOG_ENV: &str = "CALCC_LOG";

/// Map the number of `-v` flags to a level. Warnings are always shown.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbosity: u8, color: bool) {
    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .compact();

    let result = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Registry::default().with(layer.with_filter(filter)).try_init(),
        Err(_) => Registry::default()
            .with(layer.with_filter(level_for(verbosity)))
            .try_init(),
    };
    // Already initialised, e.g. by a test harness.
    let _ = result;
}
