//! ReqSim CLI — replay request logs against simulated servers.

use clap::{Parser, Subcommand};
use reqsim_core::config::SimConfig;
use reqsim_core::{logging, metrics, trace, RequestRecord};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "reqsim",
    about = "Replay request logs against a single server or a round-robin pool",
    version
)]
struct Cli {
    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation.
    Run {
        /// Path to TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Trace file path or http(s) URL (overrides trace.source).
        #[arg(short, long)]
        input: Option<String>,
        /// Number of servers (overrides dispatch.servers).
        #[arg(short, long)]
        servers: Option<u32>,
        /// Output result to JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare several pool sizes on the same trace.
    Compare {
        /// Path to TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Trace file path or http(s) URL (overrides trace.source).
        #[arg(short, long)]
        input: Option<String>,
        /// Comma-separated list of pool sizes.
        #[arg(short, long, value_delimiter = ',', default_value = "1,2")]
        servers: Vec<u32>,
        /// Output results to JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate a synthetic CSV trace.
    GenTrace {
        /// Number of requests.
        #[arg(long, default_value = "1000")]
        count: u64,
        /// Random seed.
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Largest processing time per request.
        #[arg(long, default_value = "10")]
        max_processing: u32,
        /// Output file path.
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    match cli.command {
        Commands::Run {
            config,
            input,
            servers,
            output,
        } => {
            let mut sim_config = load_config(config.as_deref());
            if let Some(n) = servers {
                sim_config.dispatch.servers = n;
                sim_config.dispatch.strategy = None;
            }
            let requests = load_requests(&sim_config, input.as_deref());

            let result = reqsim_core::run_simulation(&sim_config, requests).unwrap_or_else(|e| {
                eprintln!("Error running simulation: {}", e);
                std::process::exit(1);
            });
            println!("{}", metrics::format_headline(&result));
            println!("{}", metrics::format_table(&result));

            if let Some(output_path) = output {
                write_json(&result, &output_path);
            }
        }
        Commands::Compare {
            config,
            input,
            servers,
            output,
        } => {
            let sim_config = load_config(config.as_deref());
            let requests = load_requests(&sim_config, input.as_deref());

            let results = reqsim_core::compare_pool_sizes(&sim_config, &requests, &servers)
                .unwrap_or_else(|e| {
                    eprintln!("Error running simulation: {}", e);
                    std::process::exit(1);
                });
            for result in &results {
                println!("{}", metrics::format_headline(result));
            }
            println!("{}", metrics::format_comparison_table(&results));

            if let Some(output_path) = output {
                write_json(&results, &output_path);
            }
        }
        Commands::GenTrace {
            count,
            seed,
            max_processing,
            output,
        } => {
            let params = trace::SyntheticTrace {
                count,
                seed,
                max_processing_time: max_processing,
                ..Default::default()
            };
            let requests = trace::generate_synthetic(&params);
            trace::write_csv(&requests, &output).unwrap_or_else(|e| {
                eprintln!("Error writing trace: {}", e);
                std::process::exit(1);
            });
            println!(
                "Generated {} requests to {}",
                requests.len(),
                output.display()
            );
        }
    }
}

fn load_config(path: Option<&Path>) -> SimConfig {
    match path {
        Some(p) => SimConfig::from_file(p).unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }),
        None => SimConfig::default(),
    }
}

fn load_requests(config: &SimConfig, input: Option<&str>) -> Vec<RequestRecord> {
    let source = input.unwrap_or(config.trace.source.as_str());
    trace::load_trace(source, config.trace.has_header).unwrap_or_else(|e| {
        eprintln!("Error loading trace: {}", e);
        std::process::exit(1);
    })
}

fn write_json<T: serde::Serialize>(value: &T, path: &Path) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing results: {}", e);
        std::process::exit(1);
    });
    std::fs::write(path, json).unwrap_or_else(|e| {
        eprintln!("Error writing output: {}", e);
        std::process::exit(1);
    });
    println!("Results written to {}", path.display());
}
