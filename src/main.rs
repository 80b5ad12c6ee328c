use clap::Parser;
use receipt_scan::config::{Args, Config};
use receipt_scan::server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from(args);

    tracing::info!("Starting receipt-scan-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Binding to {}:{} (engine: {}, vocabulary: {:?})",
        config.host,
        config.port,
        config.engine,
        config.vocabulary
    );

    server::run(config).await
}
