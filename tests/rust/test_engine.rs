/// Integration tests for the replay engine and wait-time aggregation.
use reqsim_core::config::SimConfig;
use reqsim_core::{RequestRecord, SimulationError};

fn trace(specs: &[(i64, &str, u32)]) -> Vec<RequestRecord> {
    specs
        .iter()
        .enumerate()
        .map(|(i, &(ts, target, time))| RequestRecord::new(i as u64, ts, target, time))
        .collect()
}

fn mixed_workload(n: usize) -> Vec<RequestRecord> {
    (0..n)
        .map(|i| {
            RequestRecord::new(
                i as u64,
                (i as i64) * 2,
                format!("/page/{}", i % 7),
                [1, 3, 5, 2, 8][i % 5],
            )
        })
        .collect()
}

#[test]
fn test_two_request_single_server_scenario() {
    let requests = trace(&[(0, "a", 3), (1, "b", 2)]);
    let result = reqsim_core::simulate_one_server(requests).unwrap();
    // 3 (idle assign) + 2 (busy sample) + 2 (new assign)
    assert_eq!(result.total_wait_time, 7);
    assert!((result.average_wait_time - 3.5).abs() < 1e-9);
    assert_eq!(result.displaced_requests, 1);
    assert_eq!(result.servers, 1);
    assert_eq!(result.policy, "single_server");
}

#[test]
fn test_two_request_two_server_scenario() {
    let requests = trace(&[(0, "a", 3), (1, "b", 2)]);
    let result = reqsim_core::simulate_many_servers(requests, 2).unwrap();
    assert_eq!(result.total_wait_time, 5);
    assert!((result.average_wait_time - 2.5).abs() < 1e-9);
    assert_eq!(result.displaced_requests, 0);
    assert_eq!(result.policy, "round_robin");
}

#[test]
fn test_three_request_single_server_scenario() {
    let requests = trace(&[(0, "a", 5), (1, "b", 1), (2, "c", 4)]);
    let result = reqsim_core::simulate_one_server(requests).unwrap();
    // r0: 5 | r1: 4 + 1 (r0 displaced, r1 done) | r2: 4 on an idle server
    assert_eq!(result.total_wait_time, 14);
    assert!((result.average_wait_time - 14.0 / 3.0).abs() < 1e-9);
    assert_eq!(result.displaced_requests, 1);
    assert_eq!(result.per_server[0].requests_completed, 1);
}

#[test]
fn test_average_is_total_over_count() {
    let requests = mixed_workload(97);
    let result = reqsim_core::simulate_one_server(requests).unwrap();
    assert_eq!(result.total_requests, 97);
    assert!(
        (result.average_wait_time - result.total_wait_time as f64 / 97.0).abs() < 1e-9
    );
    assert!(result.total_wait_time > 0);
}

#[test]
fn test_pool_of_one_matches_single_server() {
    let requests = mixed_workload(200);
    let single = reqsim_core::simulate_one_server(requests.clone()).unwrap();
    let pooled = reqsim_core::simulate_many_servers(requests, 1).unwrap();

    assert_eq!(pooled.policy, "round_robin");
    assert_eq!(single.total_wait_time, pooled.total_wait_time);
    assert_eq!(single.average_wait_time, pooled.average_wait_time);
    assert_eq!(single.displaced_requests, pooled.displaced_requests);
    assert_eq!(single.per_server, pooled.per_server);
    assert_eq!(single.wait, pooled.wait);
}

#[test]
fn test_one_request_per_server_sums_processing_times() {
    let requests = mixed_workload(5);
    let expected: u64 = requests.iter().map(|r| r.processing_time() as u64).sum();
    let result = reqsim_core::simulate_many_servers(requests, 5).unwrap();

    assert_eq!(result.total_wait_time, expected);
    assert_eq!(result.displaced_requests, 0);
    assert!(result.per_server.iter().all(|s| s.requests_routed == 1));
    assert!((result.jains_fairness_index - 1.0).abs() < 1e-9);
}

#[test]
fn test_rerun_is_idempotent() {
    let config = SimConfig::with_servers(3);
    let requests = mixed_workload(150);
    let first = reqsim_core::run_simulation(&config, requests.clone()).unwrap();
    for _ in 0..3 {
        let again = reqsim_core::run_simulation(&config, requests.clone()).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn test_empty_trace_is_an_error() {
    assert!(matches!(
        reqsim_core::simulate_one_server(Vec::new()),
        Err(SimulationError::EmptyTrace)
    ));
    assert!(matches!(
        reqsim_core::simulate_many_servers(Vec::new(), 4),
        Err(SimulationError::EmptyTrace)
    ));
}

#[test]
fn test_zero_servers_is_an_error() {
    let requests = mixed_workload(3);
    assert!(reqsim_core::simulate_many_servers(requests, 0).is_err());
}

#[test]
fn test_run_simulation_ignores_trace_source() {
    // Records are already in hand; the trace section plays no part.
    let mut config = SimConfig::default();
    config.trace.source = String::new();
    let result = reqsim_core::run_simulation(&config, trace(&[(0, "a", 3)])).unwrap();
    assert_eq!(result.total_wait_time, 3);
    assert!((result.average_wait_time - 3.0).abs() < 1e-9);
}

#[test]
fn test_wait_distribution_and_fairness_values() {
    // Per-request waits: r0 5, r1 4 + 1, r2 4.
    let requests = trace(&[(0, "a", 5), (1, "b", 1), (2, "c", 4)]);
    let result = reqsim_core::simulate_one_server(requests).unwrap();
    assert_eq!(result.wait.min, 4.0);
    assert_eq!(result.wait.max, 5.0);
    assert_eq!(result.wait.p50, 5.0);
    assert!((result.wait.mean - 14.0 / 3.0).abs() < 1e-9);
    assert!((result.jains_fairness_index - 1.0).abs() < 1e-9);

    // Round robin over two servers routes [2, 1]: (3)^2 / (2 * 5) = 0.9.
    let requests = trace(&[(0, "a", 3), (1, "b", 2), (2, "c", 1)]);
    let result = reqsim_core::simulate_many_servers(requests, 2).unwrap();
    let routed: Vec<u64> = result.per_server.iter().map(|s| s.requests_routed).collect();
    assert_eq!(routed, vec![2, 1]);
    assert!((result.jains_fairness_index - 0.9).abs() < 1e-9);
    // Waits: r0 3 | r1 2 | r2 2 + 1 on server 0, so the total is 8.
    assert_eq!(result.total_wait_time, 8);
    assert_eq!(result.wait.min, 2.0);
    assert_eq!(result.wait.max, 3.0);
    assert_eq!(result.wait.p50, 3.0);
}

#[test]
fn test_compare_pool_sizes() {
    let config = SimConfig::default();
    let requests = mixed_workload(60);
    let results = reqsim_core::compare_pool_sizes(&config, &requests, &[1, 2, 4]).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].policy, "single_server");
    assert_eq!(results[1].servers, 2);
    assert_eq!(results[2].policy, "round_robin");
    assert!(results.iter().all(|r| r.total_requests == 60));

    let direct = reqsim_core::simulate_many_servers(requests, 2).unwrap();
    assert_eq!(results[1].total_wait_time, direct.total_wait_time);
}

#[test]
fn test_result_serializes_to_json() {
    let result = reqsim_core::simulate_one_server(mixed_workload(10)).unwrap();
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("average_wait_time"));
    let back: reqsim_core::SimulationResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.total_wait_time, result.total_wait_time);
}
