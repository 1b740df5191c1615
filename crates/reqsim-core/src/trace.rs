//! Trace ingestion for ReqSim.
//!
//! A trace is a header-prefixed CSV request log with three columns:
//! arrival timestamp, target, and processing time. Traces are read from a
//! local file or fetched over HTTP(S). Records keep their file order; the
//! simulation replays them in exactly that order.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reqsim_dispatch::RequestRecord;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Request log used when no source is configured.
pub const DEFAULT_TRACE_URL: &str = "http://s3.amazonaws.com/cuny-is211-spring2015/requests.csv";

const CSV_HEADER: [&str; 3] = ["timestamp", "target", "processing_time"];

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to fetch trace: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Trace source {url} unavailable (HTTP {status})")]
    Unavailable { url: String, status: u16 },
    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },
}

/// Load a trace from a path or an http(s) URL.
pub fn load_trace(source: &str, has_header: bool) -> Result<Vec<RequestRecord>, TraceError> {
    if is_remote(source) {
        fetch_csv(source, has_header)
    } else {
        load_csv(Path::new(source), has_header)
    }
}

/// True for sources that must be downloaded rather than opened.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load a CSV trace from disk.
pub fn load_csv(path: &Path, has_header: bool) -> Result<Vec<RequestRecord>, TraceError> {
    let file = std::fs::File::open(path)?;
    let requests = parse_csv(file, has_header)?;
    info!(path = %path.display(), requests = requests.len(), "loaded trace");
    Ok(requests)
}

/// Download a CSV trace. Any non-success status is reported as unavailable.
pub fn fetch_csv(url: &str, has_header: bool) -> Result<Vec<RequestRecord>, TraceError> {
    debug!(url, "fetching trace");
    let response = reqwest::blocking::get(url)?;
    let status = response.status();
    if !status.is_success() {
        return Err(TraceError::Unavailable {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let body = response.text()?;
    let requests = parse_csv(body.as_bytes(), has_header)?;
    info!(url, requests = requests.len(), "fetched trace");
    Ok(requests)
}

/// Parse CSV from any reader.
///
/// Each row must have exactly three fields: integer timestamp (may be
/// negative), target, and a positive integer processing time. Blank lines
/// are ignored.
pub fn parse_csv<R: Read>(reader: R, has_header: bool) -> Result<Vec<RequestRecord>, TraceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut requests = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.len() != 3 {
            return Err(TraceError::InvalidRecord {
                line,
                reason: format!("expected 3 fields, found {}", row.len()),
            });
        }
        let timestamp = parse_field::<i64>(&row[0], "timestamp", line)?;
        let processing_time = parse_field::<u32>(&row[2], "processing time", line)?;
        if processing_time == 0 {
            return Err(TraceError::InvalidRecord {
                line,
                reason: "processing time must be positive".to_string(),
            });
        }
        requests.push(RequestRecord::new(
            requests.len() as u64,
            timestamp,
            &row[1],
            processing_time,
        ));
    }
    Ok(requests)
}

fn parse_field<T: std::str::FromStr>(raw: &str, field: &str, line: u64) -> Result<T, TraceError> {
    raw.parse::<T>().map_err(|_| TraceError::InvalidRecord {
        line,
        reason: format!("{} {:?} is not a valid integer", field, raw),
    })
}

/// Write requests to CSV with a header row.
pub fn write_csv(requests: &[RequestRecord], path: &Path) -> Result<(), TraceError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for req in requests {
        writer.write_record([
            req.timestamp().to_string(),
            req.target().to_string(),
            req.processing_time().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Parameters for a synthetic trace.
#[derive(Debug, Clone)]
pub struct SyntheticTrace {
    pub count: u64,
    pub seed: u64,
    /// Processing times are drawn uniformly from `1..=max_processing_time`.
    pub max_processing_time: u32,
    /// Largest gap between consecutive timestamps.
    pub max_arrival_gap: u64,
    pub targets: Vec<String>,
}

impl Default for SyntheticTrace {
    fn default() -> Self {
        Self {
            count: 1000,
            seed: 42,
            max_processing_time: 10,
            max_arrival_gap: 2,
            targets: [
                "/index.html",
                "/images/test.gif",
                "/images/hello.png",
                "/css/main.css",
                "/api/v1/items",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Generate a deterministic synthetic trace.
pub fn generate_synthetic(params: &SyntheticTrace) -> Vec<RequestRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let max_processing = params.max_processing_time.max(1);
    let mut timestamp = 0i64;

    (0..params.count)
        .map(|id| {
            timestamp += rng.gen_range(0..=params.max_arrival_gap) as i64;
            let target = params
                .targets
                .choose(&mut rng)
                .map(String::as_str)
                .unwrap_or("/");
            let processing_time = rng.gen_range(1..=max_processing);
            RequestRecord::new(id, timestamp, target, processing_time)
        })
        .collect()
}
