//! ReqSim — replay a request log against a single server or a round-robin
//! pool and measure the average wait time per request.
//!
//! The simulation core is pure: an ordered request sequence and a dispatch
//! configuration go in, a [`SimulationResult`] comes out. Trace ingestion
//! and the CLI sit around it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐     ┌───────────┐     ┌──────────────┐
//! │  Trace   │────▶│  Engine   │────▶│   Metrics    │
//! │ (CSV/URL)│     │ (replay)  │     │ (wait time)  │
//! └──────────┘     └─────┬─────┘     └──────────────┘
//!                        │
//!                ┌───────┴───────┐
//!                │    Policy     │
//!                │ (round robin) │
//!                └───────┬───────┘
//!          ┌─────────────┼─────────────┐
//!          ▼             ▼             ▼
//!    ┌──────────┐  ┌──────────┐  ┌──────────┐
//!    │ Server 0 │  │ Server 1 │  │ Server N │
//!    └──────────┘  └──────────┘  └──────────┘
//! ```

pub mod config;
pub mod engine;
pub mod logging;
pub mod metrics;
pub mod trace;

// Re-export key types for convenience.
pub use config::{DispatchStrategy, SimConfig};
pub use engine::{account_request, SimulationEngine, SimulationError};
pub use metrics::{MetricsCollector, Percentiles, ServerStats, SimulationResult, WaitSample};
pub use reqsim_dispatch::RequestRecord;
pub use trace::{load_trace, TraceError};

/// Run a complete simulation with the given config and trace.
pub fn run_simulation(
    config: &SimConfig,
    requests: Vec<RequestRecord>,
) -> Result<SimulationResult, SimulationError> {
    engine::run_configured(config, requests)
}

/// Replay `requests` against one server.
pub fn simulate_one_server(
    requests: Vec<RequestRecord>,
) -> Result<SimulationResult, SimulationError> {
    run_simulation(&SimConfig::with_servers(1), requests)
}

/// Replay `requests` against a round-robin pool of `num_servers`.
pub fn simulate_many_servers(
    requests: Vec<RequestRecord>,
    num_servers: u32,
) -> Result<SimulationResult, SimulationError> {
    let mut config = SimConfig::with_servers(num_servers);
    config.dispatch.strategy = Some(DispatchStrategy::RoundRobin);
    run_simulation(&config, requests)
}

/// Run the same trace once per pool size, each with fresh servers.
///
/// A size of 1 runs the single-server strategy; larger sizes run round-robin.
pub fn compare_pool_sizes(
    config: &SimConfig,
    requests: &[RequestRecord],
    sizes: &[u32],
) -> Result<Vec<SimulationResult>, SimulationError> {
    sizes
        .iter()
        .map(|&servers| {
            let mut cfg = config.clone();
            cfg.dispatch.servers = servers;
            cfg.dispatch.strategy = None;
            run_simulation(&cfg, requests.to_vec())
        })
        .collect()
}
