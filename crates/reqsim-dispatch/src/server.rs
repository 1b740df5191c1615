//! Single-slot server state machine.
//!
//! A [`Server`] holds at most one in-flight request and counts down its
//! remaining processing time one tick at a time. It never queues: assigning a
//! request to a busy server replaces the occupant, and the replaced request is
//! handed back to the caller as "displaced".

use crate::request::RequestRecord;
use serde::{Deserialize, Serialize};

/// Coarse state of a server, for snapshots and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerState {
    Idle,
    Busy,
}

/// A simulated server with one processing slot.
///
/// Invariant: `time_remaining > 0` if and only if `current_request` is set.
#[derive(Debug, Clone)]
pub struct Server {
    /// Slot index in the owning pool.
    pub id: u32,
    current_request: Option<RequestRecord>,
    time_remaining: u32,
    /// Requests assigned with `start_next`.
    pub requests_started: u64,
    /// Requests that ran down to zero remaining time.
    pub requests_completed: u64,
    /// Requests overwritten while still in flight.
    pub requests_displaced: u64,
}

impl Server {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            current_request: None,
            time_remaining: 0,
            requests_started: 0,
            requests_completed: 0,
            requests_displaced: 0,
        }
    }

    /// True iff a request currently occupies the server.
    pub fn is_busy(&self) -> bool {
        self.current_request.is_some()
    }

    pub fn state(&self) -> ServerState {
        if self.is_busy() {
            ServerState::Busy
        } else {
            ServerState::Idle
        }
    }

    /// Remaining time units for the in-flight request, 0 when idle.
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn current_request(&self) -> Option<&RequestRecord> {
        self.current_request.as_ref()
    }

    /// Assign `request` to this server, resetting the remaining time.
    ///
    /// Exclusivity is not enforced. If the server is busy the occupant is
    /// replaced and returned.
    pub fn start_next(&mut self, request: RequestRecord) -> Option<RequestRecord> {
        self.time_remaining = request.processing_time();
        self.requests_started += 1;
        let displaced = self.current_request.replace(request);
        if displaced.is_some() {
            self.requests_displaced += 1;
        }
        // A zero-length request never occupies the slot.
        if self.time_remaining == 0 {
            self.current_request = None;
            self.requests_completed += 1;
        }
        displaced
    }

    /// Advance one time unit. No-op while idle.
    pub fn tick(&mut self) {
        if self.current_request.is_none() {
            return;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.current_request = None;
            self.requests_completed += 1;
        }
    }
}
