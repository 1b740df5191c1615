//! Structured logging setup.
//!
//! The library only emits `tracing` events; the binary decides where they go.
//! Levels used:
//! - **TRACE**: one event per dispatched request
//! - **DEBUG**: displaced requests, trace downloads
//! - **INFO**: trace loaded, run summary
//!
//! `RUST_LOG` takes precedence over the level passed in, e.g.
//! `RUST_LOG=reqsim_core::engine=trace reqsim run`.

use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr fmt subscriber at `level` unless `RUST_LOG` is set.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reqsim_core={level},reqsim={level}")));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .try_init();
}
