use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tutor_scout::cli::{self, Args};
use tutor_scout::config::Config;
use tutor_scout::Marketplace;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.rust_log))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let market = Marketplace::from_config(&config).context("Failed to create backend client")?;
    info!(
        "Connected to {} at {} ({})",
        market.backend_name(),
        config.supabase_url,
        if config.session.is_some() { "signed in" } else { "anonymous" }
    );

    cli::run(args, &market).await
}
