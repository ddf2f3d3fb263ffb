//! Configuration management for nsca-relay
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to load configuration from a TOML file and merge it with
//! environment variables and command-line arguments.

use crate::cli::Cli;
use crate::routing::RouteFilter;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Configuration for the NSCA output.
    pub nsca: NscaConfig,
}

/// Configuration for submitting passive check results through `send_nsca`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct NscaConfig {
    /// The status to send: 0 = OK, 1 = WARNING, 2 = CRITICAL, 3 = UNKNOWN.
    /// Supports interpolation.
    pub nagios_status: Option<String>,
    /// Event field holding a list of statuses. Requires `nagios_service_field`.
    pub nagios_status_field: Option<String>,
    /// Event field holding a list of services. Requires `nagios_status_field`.
    pub nagios_service_field: Option<String>,
    /// The host running the NSCA daemon.
    pub host: String,
    /// The port the NSCA daemon listens on.
    pub port: u16,
    /// Path to the `send_nsca` binary.
    pub send_nsca_bin: PathBuf,
    /// Optional path to a `send_nsca` configuration file.
    pub send_nsca_config: Option<PathBuf>,
    /// The Nagios host a result is submitted for. Supports interpolation.
    pub nagios_host: String,
    /// The Nagios service a result is submitted for. Supports interpolation.
    pub nagios_service: String,
    /// Template for the plugin output.
    pub message_format: String,
    /// Upper bound on a single `send_nsca` run, in milliseconds.
    pub timeout_ms: u64,
    /// Which events reach this output.
    pub route: RouteFilter,
}

impl NscaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for NscaConfig {
    fn default() -> Self {
        Self {
            nagios_status: None,
            nagios_status_field: None,
            nagios_service_field: None,
            host: "localhost".to_string(),
            port: 5667,
            send_nsca_bin: PathBuf::from("/usr/sbin/send_nsca"),
            send_nsca_config: None,
            nagios_host: "%{@source_host}".to_string(),
            nagios_service: "LOGSTASH".to_string(),
            message_format: "%{@timestamp} %{@source}: %{@message}".to_string(),
            timeout_ms: 10_000,
            route: RouteFilter::default(),
        }
    }
}

impl Config {
    /// Loads the application configuration by layering defaults, the
    /// optional TOML file, environment variables and CLI arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment
            // e.g. NSCA_RELAY_LOG_LEVEL=debug, NSCA_RELAY_NSCA__PORT=5668
            .merge(Env::prefixed("NSCA_RELAY_").split("__"))
            .merge(cli)
            .extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            nsca: NscaConfig::default(),
        }
    }
}
