use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use coinpulse::application::{Cli, CommandExecutor};
use coinpulse::infrastructure::snapshot::{ErrorSnapshot, SnapshotStore};
use coinpulse::shared::types::AppConfig;
use coinpulse::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // CLI flags > config file > defaults
    let mut config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let mut fallback = AppConfig::default();
            cli.apply_overrides(&mut fallback);
            fail(&fallback, &anyhow::Error::from(e));
        }
    };
    cli.apply_overrides(&mut config);

    if let Err(e) = CommandExecutor::execute(cli.command, config.clone()).await {
        fail(&config, &anyhow::Error::from(e));
    }

    Ok(())
}

/// Log, leave error.json next to the snapshots, exit non-zero
fn fail(config: &AppConfig, err: &anyhow::Error) -> ! {
    error!("❌ {:#}", err);

    let snapshot = ErrorSnapshot {
        timestamp: Utc::now(),
        message: err.to_string(),
        causes: err.chain().skip(1).map(|c| c.to_string()).collect(),
    };
    let store = SnapshotStore::new(config.snapshot.data_dir.clone());
    if let Err(write_err) = store.write_error(&snapshot) {
        error!("Failed to write error snapshot: {}", write_err);
    }

    std::process::exit(1);
}
