//! Sequential replay engine.
//!
//! The engine walks the request trace in file order. For each request the
//! pool's policy picks a server, and [`account_request`] samples that
//! server's remaining time before and after handing it the new request,
//! ticking it once after each sample. Timestamps never delay dispatch.

use crate::config::{DispatchStrategy, SimConfig};
use crate::metrics::{MetricsCollector, SimulationResult, WaitSample};
use reqsim_dispatch::{
    DispatchPolicy, PoolError, RequestRecord, RoundRobin, Server, ServerPool, SingleServer,
};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, info, trace};

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Request trace is empty; average wait time is undefined")]
    EmptyTrace,
    #[error("Invalid server pool: {0}")]
    Pool(#[from] PoolError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Dispatch one request to `server` and return its wait contribution.
///
/// If the server is busy, its remaining time counts as wait and the server
/// advances one tick. The request is then assigned (replacing any occupant
/// that is still in flight), its remaining time counts as wait, and the
/// server advances one more tick.
pub fn account_request(server: &mut Server, request: RequestRecord) -> WaitSample {
    let request_id = request.id();
    let mut wait_before = 0;
    if server.is_busy() {
        wait_before = server.time_remaining();
        server.tick();
    }

    let displaced = server.start_next(request);
    if let Some(prev) = &displaced {
        debug!(
            server = server.id,
            displaced = prev.id(),
            by = request_id,
            "request displaced before completion"
        );
    }
    let wait_after = server.time_remaining();
    server.tick();

    WaitSample {
        request_id,
        server_id: server.id,
        wait_before,
        wait_after,
        displaced: displaced.is_some(),
    }
}

/// The replay engine for one run.
pub struct SimulationEngine<P: DispatchPolicy> {
    name: String,
    pool: ServerPool<P>,
    pending: VecDeque<RequestRecord>,
    /// Per-request samples recorded so far.
    pub metrics: MetricsCollector,
}

impl<P: DispatchPolicy> SimulationEngine<P> {
    /// Create an engine over a freshly built pool.
    pub fn new(name: impl Into<String>, pool: ServerPool<P>) -> Self {
        Self {
            name: name.into(),
            pool,
            pending: VecDeque::new(),
            metrics: MetricsCollector::new(),
        }
    }

    /// Queue requests for replay, after any already loaded.
    pub fn load_trace(&mut self, requests: Vec<RequestRecord>) {
        self.pending.extend(requests);
    }

    pub fn pool(&self) -> &ServerPool<P> {
        &self.pool
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Dispatch the next pending request. `None` once the trace is drained.
    pub fn step(&mut self) -> Option<WaitSample> {
        let request = self.pending.pop_front()?;
        let server = self.pool.next_server();
        let sample = account_request(server, request);
        trace!(
            request = sample.request_id,
            server = sample.server_id,
            wait_before = sample.wait_before,
            wait_after = sample.wait_after,
            "dispatched"
        );
        self.metrics.record(sample);
        Some(sample)
    }

    /// Replay every pending request and aggregate the result.
    pub fn run(&mut self) -> Result<SimulationResult, SimulationError> {
        while self.step().is_some() {}

        let result = self
            .metrics
            .aggregate(&self.name, self.pool.policy_name(), self.pool.servers())
            .ok_or(SimulationError::EmptyTrace)?;

        info!(
            name = %result.name,
            policy = %result.policy,
            servers = result.servers,
            requests = result.total_requests,
            total_wait = result.total_wait_time,
            average_wait = result.average_wait_time,
            displaced = result.displaced_requests,
            "simulation complete"
        );
        Ok(result)
    }
}

/// Run `requests` through a fresh pool built for `config`.
pub fn run_configured(
    config: &SimConfig,
    requests: Vec<RequestRecord>,
) -> Result<SimulationResult, SimulationError> {
    config.validate_dispatch()?;
    if requests.is_empty() {
        return Err(SimulationError::EmptyTrace);
    }
    let name = config.simulation.name.as_str();
    let servers = config.dispatch.servers;
    match config.strategy() {
        DispatchStrategy::SingleServer => {
            run_with_pool(name, ServerPool::new(servers, SingleServer::new())?, requests)
        }
        DispatchStrategy::RoundRobin => {
            run_with_pool(name, ServerPool::new(servers, RoundRobin::new())?, requests)
        }
    }
}

fn run_with_pool<P: DispatchPolicy>(
    name: &str,
    pool: ServerPool<P>,
    requests: Vec<RequestRecord>,
) -> Result<SimulationResult, SimulationError> {
    let mut engine = SimulationEngine::new(name, pool);
    engine.load_trace(requests);
    engine.run()
}
