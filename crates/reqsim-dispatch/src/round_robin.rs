//! Round-robin dispatch.
//!
//! Successive requests go to successive servers in cyclic order, regardless
//! of whether the chosen server is busy.

use crate::server::Server;
use crate::traits::DispatchPolicy;

/// Round-robin dispatcher.
///
/// Holds an explicit cursor into the pool. After each selection the cursor
/// advances by one, modulo the pool size.
#[derive(Debug, Clone, Default)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Slot the next request will be routed to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl DispatchPolicy for RoundRobin {
    fn select(&mut self, servers: &[Server]) -> usize {
        let chosen = self.cursor;
        self.cursor = (chosen + 1) % servers.len();
        chosen
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}
