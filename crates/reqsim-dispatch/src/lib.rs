//! Server state machine and dispatch policies for ReqSim.
//!
//! This crate provides the [`Server`] single-slot state machine, the
//! [`ServerPool`] that owns a set of servers, and the [`DispatchPolicy`]
//! trait with its built-in implementations:
//!
//! | Policy | Strategy |
//! |--------|----------|
//! | [`SingleServer`] | Everything goes to one server |
//! | [`RoundRobin`] | Cycle through the pool with a cursor |

pub mod pool;
pub mod request;
pub mod round_robin;
pub mod server;
pub mod single_server;
pub mod traits;

pub use pool::ServerPool;
pub use request::RequestRecord;
pub use round_robin::RoundRobin;
pub use server::{Server, ServerState};
pub use single_server::SingleServer;
pub use traits::*;

/// List all built-in policy names.
pub fn available_policies() -> Vec<&'static str> {
    vec!["single_server", "round_robin"]
}
