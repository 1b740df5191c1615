/// Integration tests for trace ingestion.
use reqsim_core::trace::{self, SyntheticTrace, TraceError};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("reqsim_{}_{}.csv", name, std::process::id()))
}

/// Serve one canned HTTP response on a loopback port and return its URL.
fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/requests.csv", listener.local_addr().unwrap());
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf);
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
    });
    (url, handle)
}

#[test]
fn test_load_example_trace() {
    let path = std::path::Path::new("traces/requests.csv");
    if !path.exists() {
        return; // Skip if the sample trace isn't checked out
    }
    let requests = trace::load_csv(path, true).unwrap();
    assert!(!requests.is_empty());
    assert!(requests.iter().all(|r| r.processing_time() > 0));
}

#[test]
fn test_write_and_read_trace() {
    let tmp_path = temp_path("roundtrip");
    let requests = trace::generate_synthetic(&SyntheticTrace {
        count: 25,
        ..Default::default()
    });

    trace::write_csv(&requests, &tmp_path).unwrap();
    let loaded = trace::load_trace(tmp_path.to_str().unwrap(), true).unwrap();
    assert_eq!(loaded, requests);

    let _ = std::fs::remove_file(&tmp_path);
}

#[test]
fn test_file_trace_feeds_simulation() {
    let tmp_path = temp_path("simulate");
    std::fs::write(&tmp_path, "timestamp,target,processing_time\n0,a,3\n1,b,2\n").unwrap();

    let requests = trace::load_trace(tmp_path.to_str().unwrap(), true).unwrap();
    let result = reqsim_core::simulate_one_server(requests).unwrap();
    assert_eq!(result.total_wait_time, 7);

    let _ = std::fs::remove_file(&tmp_path);
}

#[test]
fn test_missing_file() {
    let result = trace::load_trace("/nonexistent/reqsim/requests.csv", true);
    assert!(matches!(result, Err(TraceError::Io(_))));
}

#[test]
fn test_header_only_trace_cannot_be_simulated() {
    let requests = trace::parse_csv("timestamp,target,processing_time\n".as_bytes(), true).unwrap();
    assert!(reqsim_core::simulate_one_server(requests).is_err());
}

#[test]
fn test_fetch_trace_over_http() {
    let (url, server) = serve_once(
        "200 OK",
        "timestamp,target,processing_time\n0,a,3\n1,b,2\n",
    );
    let requests = trace::load_trace(&url, true).unwrap();
    server.join().unwrap();

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].target(), "b");
    let result = reqsim_core::simulate_one_server(requests).unwrap();
    assert_eq!(result.total_wait_time, 7);
}

#[test]
fn test_fetch_not_found_is_unavailable() {
    let (url, server) = serve_once("404 Not Found", "");
    let result = trace::load_trace(&url, true);
    server.join().unwrap();

    match result {
        Err(TraceError::Unavailable { url: reported, status }) => {
            assert_eq!(status, 404);
            assert_eq!(reported, url);
        }
        other => panic!("Expected Unavailable, got {:?}", other),
    }
}

#[test]
fn test_fetch_refused_connection_is_http_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{}/requests.csv", port);
    assert!(matches!(
        trace::load_trace(&url, true),
        Err(TraceError::Http(_))
    ));
}
