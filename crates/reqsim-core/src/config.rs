//! TOML configuration parsing for ReqSim.
//!
//! Defines the configuration schema for simulation runs: a run name, the
//! dispatch strategy and pool size, and where the request trace comes from.

use crate::trace::DEFAULT_TRACE_URL;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub dispatch: DispatchSection,
    #[serde(default)]
    pub trace: TraceSection,
}

/// General simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSection {
    /// Human-readable name for this simulation.
    #[serde(default = "default_sim_name")]
    pub name: String,
}

fn default_sim_name() -> String {
    "simulation".to_string()
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            name: default_sim_name(),
        }
    }
}

/// How requests are spread over servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStrategy {
    /// Every request goes to one server.
    SingleServer,
    /// Requests cycle through a pool of `servers`.
    RoundRobin,
}

impl DispatchStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            DispatchStrategy::SingleServer => "single_server",
            DispatchStrategy::RoundRobin => "round_robin",
        }
    }
}

/// Dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSection {
    /// Number of servers in the pool.
    #[serde(default = "default_servers")]
    pub servers: u32,
    /// Explicit strategy. When absent, one server means `single_server`
    /// and more means `round_robin`.
    #[serde(default)]
    pub strategy: Option<DispatchStrategy>,
}

fn default_servers() -> u32 {
    1
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            strategy: None,
        }
    }
}

/// Trace source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSection {
    /// File path or http(s) URL of the CSV request log.
    #[serde(default = "default_trace_source")]
    pub source: String,
    /// Whether the first line is a header to skip.
    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

fn default_trace_source() -> String {
    DEFAULT_TRACE_URL.to_string()
}

fn default_has_header() -> bool {
    true
}

impl Default for TraceSection {
    fn default() -> Self {
        Self {
            source: default_trace_source(),
            has_header: default_has_header(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Config for a pool of `servers` with every other field defaulted.
    pub fn with_servers(servers: u32) -> Self {
        let mut config = Self::default();
        config.dispatch.servers = servers;
        config
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_dispatch()?;
        self.validate_trace()
    }

    /// Checks the `[dispatch]` section, the only part a replay reads.
    pub fn validate_dispatch(&self) -> Result<(), ConfigError> {
        if self.dispatch.servers == 0 {
            return Err(ConfigError::Validation("servers must be > 0".to_string()));
        }
        if self.dispatch.strategy == Some(DispatchStrategy::SingleServer)
            && self.dispatch.servers != 1
        {
            return Err(ConfigError::Validation(format!(
                "single_server strategy requires servers = 1, got {}",
                self.dispatch.servers
            )));
        }
        Ok(())
    }

    /// Checks the `[trace]` section used by ingestion.
    pub fn validate_trace(&self) -> Result<(), ConfigError> {
        if self.trace.source.trim().is_empty() {
            return Err(ConfigError::Validation(
                "trace.source must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Strategy to run, resolving the implicit default from the pool size.
    pub fn strategy(&self) -> DispatchStrategy {
        match self.dispatch.strategy {
            Some(strategy) => strategy,
            None if self.dispatch.servers == 1 => DispatchStrategy::SingleServer,
            None => DispatchStrategy::RoundRobin,
        }
    }
}
