//! Single-server dispatch: every request goes to slot 0.

use crate::server::Server;
use crate::traits::DispatchPolicy;

#[derive(Debug, Clone, Copy, Default)]
pub struct SingleServer;

impl SingleServer {
    pub fn new() -> Self {
        Self
    }
}

impl DispatchPolicy for SingleServer {
    fn select(&mut self, _servers: &[Server]) -> usize {
        0
    }

    fn name(&self) -> &'static str {
        "single_server"
    }

    fn max_servers(&self) -> Option<u32> {
        Some(1)
    }
}
