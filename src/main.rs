use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use rafka_wire::{telemetry, Broker, BrokerConfig, KafkaServer};

#[derive(Parser, Debug)]
#[command(name = "rafka-wire", about = "Kafka wire protocol broker", version)]
struct Cli {
    /// JSON config file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the config file
    #[arg(short, long, env = "RAFKA_LISTEN_ADDRESS")]
    listen: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(&cli.log_level)?;

    let mut config = match &cli.config {
        Some(path) => BrokerConfig::from_file(path)?,
        None => BrokerConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.listen_address = listen;
    }

    let broker = Arc::new(Broker::from_config(&config));
    info!(?broker, max_message_size = config.max_message_size, "starting broker");

    let server = KafkaServer::bind(&config.listen_address, broker, config.max_message_size)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_address))?;
    server.run().await.context("server stopped")
}
