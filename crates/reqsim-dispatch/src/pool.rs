//! Server pool: an indexed set of servers driven by a dispatch policy.

use crate::server::Server;
use crate::traits::{DispatchPolicy, PoolError, ServerSnapshot};

/// Ordered servers plus the policy that routes requests among them.
///
/// The pool is never empty; [`ServerPool::new`] rejects a size of zero.
#[derive(Debug, Clone)]
pub struct ServerPool<P: DispatchPolicy> {
    servers: Vec<Server>,
    policy: P,
}

impl<P: DispatchPolicy> ServerPool<P> {
    /// Create `size` idle servers with ids `0..size`.
    pub fn new(size: u32, policy: P) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::Empty);
        }
        if let Some(max) = policy.max_servers() {
            if size > max {
                return Err(PoolError::TooManyServers {
                    policy: policy.name(),
                    max,
                    requested: size,
                });
            }
        }
        Ok(Self {
            servers: (0..size).map(Server::new).collect(),
            policy,
        })
    }

    /// Pick the server for the next request and return it.
    pub fn next_server(&mut self) -> &mut Server {
        let idx = self.policy.select(&self.servers) % self.servers.len();
        &mut self.servers[idx]
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn snapshots(&self) -> Vec<ServerSnapshot> {
        self.servers.iter().map(ServerSnapshot::from).collect()
    }
}
