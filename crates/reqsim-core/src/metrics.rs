//! Wait-time accounting and aggregation for simulation runs.
//!
//! The engine records one [`WaitSample`] per dispatched request. At the end of
//! a run the [`MetricsCollector`] folds them into a [`SimulationResult`] with
//! the total and average wait plus per-server and distribution detail.

use reqsim_dispatch::Server;
use serde::{Deserialize, Serialize};

/// Wait contribution of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSample {
    pub request_id: u64,
    pub server_id: u32,
    /// Remaining time of the occupant sampled before assignment (0 if idle).
    pub wait_before: u32,
    /// Remaining time sampled right after assignment.
    pub wait_after: u32,
    /// Whether an in-flight request was overwritten.
    pub displaced: bool,
}

impl WaitSample {
    pub fn total(&self) -> u64 {
        self.wait_before as u64 + self.wait_after as u64
    }
}

/// Distribution of per-request wait totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Percentiles {
    /// Summarize per-request wait totals. Waits are whole ticks, so every
    /// field except `mean` is one of the observed values.
    pub fn from_waits(waits: &[u64]) -> Self {
        let mut sorted = waits.to_vec();
        sorted.sort_unstable();
        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return Self {
                p50: 0.0,
                p90: 0.0,
                p99: 0.0,
                min: 0.0,
                max: 0.0,
                mean: 0.0,
            };
        };
        let total: u64 = sorted.iter().sum();

        Self {
            p50: nearest_rank(&sorted, 50) as f64,
            p90: nearest_rank(&sorted, 90) as f64,
            p99: nearest_rank(&sorted, 99) as f64,
            min: min as f64,
            max: max as f64,
            mean: total as f64 / sorted.len() as f64,
        }
    }
}

/// Value at `pct` percent of the way through `sorted`, rounding the
/// position to the nearest index. `sorted` must be non-empty.
fn nearest_rank(sorted: &[u64], pct: u32) -> u64 {
    let last = sorted.len() - 1;
    let idx = (last as f64 * pct as f64 / 100.0).round() as usize;
    sorted[idx.min(last)]
}

/// Per-server summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStats {
    pub server_id: u32,
    pub requests_routed: u64,
    pub wait_time: u64,
    pub requests_completed: u64,
    pub requests_displaced: u64,
}

/// Aggregated result of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Run name from configuration.
    pub name: String,
    /// Dispatch policy name.
    pub policy: String,
    pub servers: u32,
    pub total_requests: u64,
    /// Sum of every request's wait contribution.
    pub total_wait_time: u64,
    /// `total_wait_time / total_requests`.
    pub average_wait_time: f64,
    /// Requests overwritten on a busy server before finishing.
    pub displaced_requests: u64,
    /// Distribution of per-request wait contributions.
    pub wait: Percentiles,
    pub jains_fairness_index: f64,
    pub per_server: Vec<ServerStats>,
}

/// Collector that accumulates per-request samples during a run.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    samples: Vec<WaitSample>,
    total_wait_time: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: WaitSample) {
        self.total_wait_time += sample.total();
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[WaitSample] {
        &self.samples
    }

    pub fn total_wait_time(&self) -> u64 {
        self.total_wait_time
    }

    pub fn request_count(&self) -> u64 {
        self.samples.len() as u64
    }

    /// Fold all samples into a result. Returns `None` when nothing was
    /// recorded, since the average is undefined.
    pub fn aggregate(
        &self,
        name: &str,
        policy: &str,
        servers: &[Server],
    ) -> Option<SimulationResult> {
        if self.samples.is_empty() {
            return None;
        }
        let count = self.request_count();

        let mut per_server: Vec<ServerStats> = servers
            .iter()
            .map(|s| ServerStats {
                server_id: s.id,
                requests_routed: 0,
                wait_time: 0,
                requests_completed: s.requests_completed,
                requests_displaced: s.requests_displaced,
            })
            .collect();
        for sample in &self.samples {
            if let Some(stats) = per_server.get_mut(sample.server_id as usize) {
                stats.requests_routed += 1;
                stats.wait_time += sample.total();
            }
        }

        let waits: Vec<u64> = self.samples.iter().map(WaitSample::total).collect();

        Some(SimulationResult {
            name: name.to_string(),
            policy: policy.to_string(),
            servers: servers.len() as u32,
            total_requests: count,
            total_wait_time: self.total_wait_time,
            average_wait_time: self.total_wait_time as f64 / count as f64,
            displaced_requests: self.samples.iter().filter(|s| s.displaced).count() as u64,
            wait: Percentiles::from_waits(&waits),
            jains_fairness_index: routing_fairness(&per_server),
            per_server,
        })
    }
}

/// Jain's index over requests routed per server:
/// (sum r_i)^2 / (n * sum r_i^2). 1.0 when every server got the same share,
/// falling towards 1/n as routing concentrates on one server.
fn routing_fairness(per_server: &[ServerStats]) -> f64 {
    let n = per_server.len() as u64;
    let sum: u64 = per_server.iter().map(|s| s.requests_routed).sum();
    let sum_sq: u64 = per_server.iter().map(|s| s.requests_routed.pow(2)).sum();
    if sum_sq == 0 {
        return 1.0;
    }
    (sum * sum) as f64 / (n * sum_sq) as f64
}

/// One-line headline, two decimals.
pub fn format_headline(result: &SimulationResult) -> String {
    if result.servers == 1 {
        format!(
            "Average latency for single server: {:.2} seconds",
            result.average_wait_time
        )
    } else {
        format!(
            "Average latency for {} servers: {:.2} seconds",
            result.servers, result.average_wait_time
        )
    }
}

/// Format a result as a pretty-printed table string.
pub fn format_table(result: &SimulationResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{:=<70}\n",
        format!("  {} ({}, {} servers)  ", result.name, result.policy, result.servers)
    ));
    out.push_str(&format!(
        "  Requests: {}  Total wait: {}  Average wait: {:.2}\n",
        result.total_requests, result.total_wait_time, result.average_wait_time
    ));
    out.push_str(&format!(
        "  Wait        P50={:>8.1}  P90={:>8.1}  P99={:>8.1}  Max={:>8.1}\n",
        result.wait.p50, result.wait.p90, result.wait.p99, result.wait.max
    ));
    out.push_str(&format!(
        "  Displaced: {}  Jain's index: {:.4}\n",
        result.displaced_requests, result.jains_fairness_index
    ));
    out.push_str(&format!("{:-<70}\n", "  Servers  "));
    for s in &result.per_server {
        out.push_str(&format!(
            "  #{:<4} routed={:>8} wait={:>10} completed={:>8} displaced={:>8}\n",
            s.server_id, s.requests_routed, s.wait_time, s.requests_completed, s.requests_displaced
        ));
    }
    out.push_str(&format!("{:=<70}\n", ""));
    out
}

/// Format a comparison table of results across pool sizes.
pub fn format_comparison_table(results: &[SimulationResult]) -> String {
    if results.is_empty() {
        return String::from("No results to compare.\n");
    }

    let mut out = String::new();
    out.push_str(&format!("\n{:=<76}\n", "  Pool Size Comparison  "));
    out.push_str(&format!(
        "{:<16} {:>8} {:>10} {:>12} {:>10} {:>8}\n",
        "Policy", "Servers", "Requests", "Total wait", "Avg wait", "Displ."
    ));
    out.push_str(&format!("{:-<76}\n", ""));

    for r in results {
        out.push_str(&format!(
            "{:<16} {:>8} {:>10} {:>12} {:>10.2} {:>8}\n",
            r.policy,
            r.servers,
            r.total_requests,
            r.total_wait_time,
            r.average_wait_time,
            r.displaced_requests,
        ));
    }
    out.push_str(&format!("{:=<76}\n", ""));
    out
}
