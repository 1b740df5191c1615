//! Dispatch policy trait definitions.
//!
//! A [`DispatchPolicy`] picks which pool slot receives the next request. The
//! pool is generic over its policy, so selection is statically dispatched.

use crate::server::{Server, ServerState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Server pool must contain at least one server")]
    Empty,
    #[error("Policy {policy} supports at most {max} server(s), got {requested}")]
    TooManyServers {
        policy: &'static str,
        max: u32,
        requested: u32,
    },
}

/// Read-only view of a server, for reports and custom policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSnapshot {
    pub id: u32,
    pub state: ServerState,
    pub time_remaining: u32,
    pub requests_started: u64,
    pub requests_completed: u64,
    pub requests_displaced: u64,
}

impl From<&Server> for ServerSnapshot {
    fn from(server: &Server) -> Self {
        Self {
            id: server.id,
            state: server.state(),
            time_remaining: server.time_remaining(),
            requests_started: server.requests_started,
            requests_completed: server.requests_completed,
            requests_displaced: server.requests_displaced,
        }
    }
}

/// The core dispatch trait.
///
/// The pool calls [`select`](DispatchPolicy::select) once per request and
/// hands the request to the returned slot. `servers` is always the owning
/// pool's full server list: non-empty, and the same length on every call,
/// so a policy may keep an index into it across calls.
pub trait DispatchPolicy {
    /// Index of the server that receives the next request.
    fn select(&mut self, servers: &[Server]) -> usize;

    /// Human-readable name for reports.
    fn name(&self) -> &'static str;

    /// Largest pool this policy can drive, if bounded.
    fn max_servers(&self) -> Option<u32> {
        None
    }
}
