//! Stakewatch daemon — entry point for running the monitor service.

use clap::Parser;
use std::path::PathBuf;

use stakewatch_service::{init_logging, LogFormat, MonitorService, ServiceConfig};

#[derive(Parser)]
#[command(name = "stakewatch-daemon", about = "Validator monitoring and nomination-state daemon")]
struct Cli {
    /// Data directory for the persistence store.
    #[arg(long, env = "STAKEWATCH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Telemetry feed WebSocket endpoint.
    #[arg(long, env = "STAKEWATCH_FEED_ENDPOINT")]
    feed_endpoint: Option<String>,

    /// Chain namespaces to subscribe to (comma-separated).
    #[arg(long, env = "STAKEWATCH_CHAINS", value_delimiter = ',')]
    chains: Vec<String>,

    /// Disable the telemetry feed connection.
    #[arg(long, env = "STAKEWATCH_DISABLE_FEED")]
    disable_feed: bool,

    /// Continuous-disconnect seconds before a node is classified offline.
    #[arg(long, env = "STAKEWATCH_OFFLINE_THRESHOLD_SECS")]
    offline_threshold_secs: Option<u64>,

    /// Enable the ops endpoint (/health, /metrics).
    #[arg(long, env = "STAKEWATCH_ENABLE_OPS")]
    ops: bool,

    /// Ops endpoint port.
    #[arg(long, env = "STAKEWATCH_OPS_PORT")]
    ops_port: Option<u16>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "STAKEWATCH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "STAKEWATCH_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the monitor service.
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config: Option<ServiceConfig> = if let Some(ref config_path) = cli.config {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str::<ServiceConfig>(&contents) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    eprintln!("failed to parse config file: {e}, using CLI defaults");
                    None
                }
            },
            Err(e) => {
                eprintln!(
                    "failed to read config file {}: {e}, using CLI defaults",
                    config_path.display()
                );
                None
            }
        }
    } else {
        None
    };

    let mut config = file_config.unwrap_or_default();
    config.enable_ops = cli.ops || config.enable_ops;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(ops_port) = cli.ops_port {
        config.ops_port = ops_port;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }
    if let Some(log_format) = cli.log_format {
        config.log_format = log_format;
    }
    if let Some(endpoint) = cli.feed_endpoint {
        config.telemetry.endpoint = endpoint;
    }
    if !cli.chains.is_empty() {
        config.telemetry.chains = cli.chains;
    }
    if cli.disable_feed {
        config.telemetry.enabled = false;
    }
    if let Some(threshold) = cli.offline_threshold_secs {
        config.telemetry.offline_threshold_secs = threshold;
    }

    init_logging(LogFormat::from_config(&config.log_format), &config.log_level);

    match cli.command {
        Command::Run => {
            tracing::info!(
                "starting stakewatch (feed: {}, ops: {})",
                if config.telemetry.enabled {
                    config.telemetry.endpoint.clone()
                } else {
                    "disabled".into()
                },
                if config.enable_ops {
                    config.ops_port.to_string()
                } else {
                    "off".into()
                },
            );

            let mut service = MonitorService::new(config)?;
            service.start().await?;

            service.wait_for_signal().await;

            tracing::info!("shutdown signal received — stopping service");
            service.stop().await?;

            tracing::info!("stakewatch daemon exited cleanly");
        }
    }

    Ok(())
}
