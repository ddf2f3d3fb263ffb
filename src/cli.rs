//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. These arguments are parsed at startup and then merged with
//! the configuration file and environment variables.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Relays JSON-lines events to Nagios as passive check results via send_nsca.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Read events from this file instead of stdin.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Host running the NSCA daemon.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port the NSCA daemon listens on.
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Path to the send_nsca binary.
    #[arg(long, value_name = "PATH")]
    pub send_nsca_bin: Option<PathBuf>,

    /// Logging level (overridden by RUST_LOG).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut nsca = Dict::new();

        if let Some(host) = &self.host {
            nsca.insert("host".into(), Value::from(host.clone()));
        }

        if let Some(port) = self.port {
            nsca.insert("port".into(), Value::from(port));
        }

        if let Some(bin) = &self.send_nsca_bin {
            nsca.insert(
                "send_nsca_bin".into(),
                Value::from(bin.to_string_lossy().into_owned()),
            );
        }

        let mut dict = Dict::new();
        if !nsca.is_empty() {
            dict.insert("nsca".into(), Value::from(nsca));
        }
        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
