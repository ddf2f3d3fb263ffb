//! nsca-relay - forwards JSON-lines events to Nagios through send_nsca.

use anyhow::{Context, Result};
use clap::Parser;
use nsca_relay::{
    cli::Cli,
    config::Config,
    notification::{NotificationDispatcher, SendNsca},
    pipeline,
};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        init_tracing("info");
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    init_tracing(&config.log_level);

    info!("nsca-relay starting up...");
    info!("-------------------- Configuration --------------------");
    info!("NSCA Daemon: {}:{}", config.nsca.host, config.nsca.port);
    info!("send_nsca Binary: {}", config.nsca.send_nsca_bin.display());
    if let Some(path) = &config.nsca.send_nsca_config {
        info!("send_nsca Config: {}", path.display());
    }
    match (&config.nsca.nagios_status_field, &config.nsca.nagios_service_field) {
        (Some(status), Some(service)) => {
            info!("Mode: paired fields (status: {}, service: {})", status, service)
        }
        _ => info!("Mode: single (service: {})", config.nsca.nagios_service),
    }
    info!("send_nsca Timeout: {}ms", config.nsca.timeout_ms);
    info!("-------------------------------------------------------");

    let notifier = Arc::new(SendNsca::new(&config.nsca));
    let dispatcher = match NotificationDispatcher::register(&config.nsca, notifier) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("Invalid nagios_nsca configuration: {}", e);
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received. Shutting down gracefully...");
            let _ = shutdown_tx.send(());
        }
        // Keep the sender alive so a failed signal handler is not read as shutdown.
        std::future::pending::<()>().await;
    });

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let summary = pipeline::run(reader, &dispatcher, shutdown_rx).await?;
    info!(
        "Processed {} events ({} unparsable lines).",
        summary.events, summary.invalid_lines
    );

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
