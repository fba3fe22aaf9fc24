//! CLI commands and handlers
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::refresh::RefreshService;
use super::services::{ArbitrageService, DataFreshness, MarketService};
use crate::domain::alerts::{AlertDirection, PriceAlert};
use crate::domain::arbitrage::{rank_candidates, ArbitrageCandidate};
use crate::domain::market::{MarketAnalyzer, MarketTab};
use crate::infrastructure::alert_store::AlertStore;
use crate::infrastructure::market_api::{CoinGeckoClient, MarketDataApi};
use crate::infrastructure::snapshot::{self, SnapshotStore};
use crate::shared::errors::AppError;
use crate::shared::types::AppConfig;
use crate::shared::utils::{format_change, format_large_number, format_price};

#[derive(Parser)]
#[command(name = "coinpulse", version)]
#[command(about = "Crypto market data refresher and cross-exchange price gap scanner")]
pub struct Cli {
    /// Path to config file (default: ./Config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot directory (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Market-data API key (overrides config)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Command-line values win over the config file
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data_dir {
            config.snapshot.data_dir = dir.clone();
        }
        if let Some(key) = &self.api_key {
            config.api.api_key = Some(key.clone());
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch market data, scan for price gaps and rewrite every snapshot
    Refresh {
        /// Keep refreshing on the configured interval until Ctrl-C
        #[arg(short, long)]
        watch: bool,
    },

    /// Show cross-exchange price gaps
    Arbitrage {
        /// Only this coin id (e.g. bitcoin)
        #[arg(short, long)]
        coin: Option<String>,

        /// How many opportunities to show (default from config)
        #[arg(short, long)]
        top: Option<usize>,

        /// Query the API instead of the published snapshot
        #[arg(long)]
        live: bool,
    },

    /// Market overview and coin listing
    Market {
        /// Listing tab: all, gainers, losers, volume
        #[arg(short, long, default_value = "all")]
        tab: MarketTab,

        /// Filter by name or symbol
        #[arg(short, long)]
        search: Option<String>,

        /// Rows to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Query the API instead of the published snapshot
        #[arg(long)]
        live: bool,
    },

    /// Manage price alerts
    Alerts {
        #[command(subcommand)]
        action: AlertCommand,
    },

    /// Show snapshot freshness and stored alerts
    Status,
}

#[derive(Subcommand)]
pub enum AlertCommand {
    /// Add an alert for a coin id
    Add {
        coin: String,
        price: f64,

        /// above or below
        #[arg(short, long, default_value = "above")]
        direction: AlertDirection,
    },

    /// Remove an alert by id
    Remove { id: String },

    /// List stored alerts
    List,

    /// Check alerts against current prices
    Check {
        /// Query the API instead of the published snapshot
        #[arg(long)]
        live: bool,
    },
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: AppConfig) -> Result<(), AppError> {
        match command {
            Commands::Refresh { watch } => Self::execute_refresh_command(watch, config).await,
            Commands::Arbitrage { coin, top, live } => {
                Self::execute_arbitrage_command(coin, top, live, config).await
            }
            Commands::Market { tab, search, limit, live } => {
                Self::execute_market_command(tab, search, limit, live, config).await
            }
            Commands::Alerts { action } => Self::execute_alerts_command(action, config).await,
            Commands::Status => Self::execute_status_command(config),
        }
    }

    fn api(config: &AppConfig) -> Result<Arc<dyn MarketDataApi>, AppError> {
        Ok(Arc::new(CoinGeckoClient::new(&config.api)?))
    }

    async fn execute_refresh_command(watch: bool, config: AppConfig) -> Result<(), AppError> {
        let service = RefreshService::new(Self::api(&config)?, &config);

        if watch {
            return service.watch().await;
        }

        let report = service.run_once().await?;
        report.print_summary();
        Ok(())
    }

    async fn execute_arbitrage_command(
        coin: Option<String>,
        top: Option<usize>,
        live: bool,
        config: AppConfig,
    ) -> Result<(), AppError> {
        let top = top.unwrap_or(config.arbitrage.display_top_n);
        let api = Self::api(&config)?;
        let market = MarketService::new(Arc::clone(&api), &config);
        let arbitrage = ArbitrageService::new(api, &config);

        let candidates: Vec<ArbitrageCandidate> = match coin {
            Some(coin_id) => {
                let published: Vec<ArbitrageCandidate> = if live {
                    Vec::new()
                } else {
                    market
                        .published_opportunities()
                        .unwrap_or_default()
                        .into_iter()
                        .filter(|c| c.coin_id == coin_id)
                        .collect()
                };

                if published.is_empty() {
                    info!("🔍 Scanning {} across exchanges...", coin_id);
                    arbitrage.scan_coin(&coin_id, top, Utc::now()).await?
                } else {
                    published
                }
            }
            None => market.arbitrage_opportunities(&arbitrage, live).await?,
        };

        let candidates = rank_candidates(candidates, top);
        if candidates.is_empty() {
            println!("⏳ No price gaps above {}%", config.arbitrage.min_diff_percentage);
            return Ok(());
        }

        println!("💰 Top {} price gaps:", candidates.len());
        for (i, c) in candidates.iter().enumerate() {
            println!(
                "  {}. {} ({})  buy {} @ {}  ->  sell {} @ {}  diff {} ({:.2}%)",
                i + 1,
                c.coin_label,
                c.coin_id,
                c.buy_exchange_label,
                format_price(c.buy_price),
                c.sell_exchange_label,
                format_price(c.sell_price),
                format_price(c.price_diff),
                c.price_diff_percentage
            );
        }
        Ok(())
    }

    async fn execute_market_command(
        tab: MarketTab,
        search: Option<String>,
        limit: usize,
        live: bool,
        config: AppConfig,
    ) -> Result<(), AppError> {
        let market = MarketService::new(Self::api(&config)?, &config);
        let coins = market.coin_markets(live).await?;

        let overview = MarketAnalyzer::overview(&coins)
            .ok_or_else(|| AppError::NoData("coin listing is empty".to_string()))?;

        println!("📈 Market overview ({} coins)", overview.coin_count);
        println!("   Total market cap: ${}", format_large_number(overview.total_market_cap));
        println!("   24h volume: ${}", format_large_number(overview.total_volume));
        println!(
            "   Rising: {} ({:.1}%) - {} {}",
            overview.rising_count,
            overview.rising_percentage,
            overview.trend,
            overview.trend.label()
        );
        if !overview.hot_coins.is_empty() {
            let hot: Vec<String> = overview
                .hot_coins
                .iter()
                .map(|c| format!("{} {}", c.display_name(), format_change(c.change_24h())))
                .collect();
            println!("   🔥 Hot: {}", hot.join(", "));
        }

        let rows = MarketAnalyzer::filter(&coins, tab, search.as_deref());
        println!("\n📊 {:?} ({} matches)", tab, rows.len());
        for coin in rows.iter().take(limit) {
            println!(
                "  {:>4}  {:<12} {:<6} {:>14} {:>9} {:>10}",
                coin.market_cap_rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
                coin.display_name(),
                coin.symbol.to_uppercase(),
                coin.current_price.map(format_price).unwrap_or_else(|| "-".to_string()),
                format_change(coin.change_24h()),
                format_large_number(coin.total_volume.unwrap_or(0.0)),
            );
        }
        Ok(())
    }

    async fn execute_alerts_command(action: AlertCommand, config: AppConfig) -> Result<(), AppError> {
        let store = AlertStore::new(config.alert_store_path());
        let mut book = store.load()?;

        match action {
            AlertCommand::Add { coin, price, direction } => {
                let alert = PriceAlert::new(&coin, price, direction, Utc::now())?;
                let added = book.add(alert);
                println!("✅ Alert {}: {} {} {}", added.id, added.coin_id, added.direction, format_price(added.price));
                store.save(&book)?;
            }
            AlertCommand::Remove { id } => {
                let removed = book.remove(&id)?;
                store.save(&book)?;
                println!("🗑️  Removed alert {} ({})", removed.id, removed.coin_id);
            }
            AlertCommand::List => {
                if book.is_empty() {
                    println!("No price alerts");
                }
                for alert in book.alerts() {
                    let last = alert
                        .last_triggered
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                        .unwrap_or_else(|| "never".to_string());
                    println!(
                        "  {}  {} {} {}  (last triggered: {})",
                        alert.id,
                        alert.coin_id,
                        alert.direction,
                        format_price(alert.price),
                        last
                    );
                }
            }
            AlertCommand::Check { live } => {
                if book.is_empty() {
                    println!("No price alerts");
                    return Ok(());
                }

                let market = MarketService::new(Self::api(&config)?, &config);
                let prices: HashMap<String, f64> = market
                    .coin_markets(live)
                    .await?
                    .into_iter()
                    .filter_map(|c| c.current_price.map(|p| (c.id, p)))
                    .collect();

                let cooldown = Duration::seconds(config.alerts.cooldown_secs);
                let triggered = book.check(&prices, Utc::now(), cooldown);

                if triggered.is_empty() {
                    println!("🔕 No alerts triggered");
                } else {
                    for alert in &triggered {
                        println!("🚨 {}", alert.message());
                    }
                    store.save(&book)?;
                }
            }
        }
        Ok(())
    }

    fn execute_status_command(config: AppConfig) -> Result<(), AppError> {
        let store = SnapshotStore::new(config.snapshot.data_dir.clone());
        let stale_after = Duration::seconds(config.refresh.stale_after_secs as i64);
        let freshness = DataFreshness::from_store(&store, Utc::now(), stale_after);

        println!("📊 Data directory: {}", store.data_dir().display());
        match &freshness.last_updated {
            Some(marker) => println!("   Last updated: {} ({})", marker.formatted, freshness.describe_age()),
            None => println!("   Last updated: never"),
        }
        if freshness.stale {
            warn!("⚠️  Snapshots are stale (older than {}s)", config.refresh.stale_after_secs);
        }

        for name in [
            snapshot::COINS_MARKET,
            snapshot::EXCHANGES,
            snapshot::EXCHANGE_PAIRS,
            snapshot::ARBITRAGE_OPPORTUNITIES,
            snapshot::NEWS,
            snapshot::ANNOUNCEMENTS,
        ] {
            let mark = if store.exists(name) { "✅" } else { "❌" };
            println!("   {} {}", mark, name);
        }

        let alerts = AlertStore::new(config.alert_store_path()).load()?;
        println!("🔔 Price alerts: {}", alerts.alerts().len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::config_in;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "coinpulse",
            "market",
            "--tab",
            "gainers",
            "--data-dir",
            "/tmp/site-data",
            "--api-key",
            "k",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.snapshot.data_dir, PathBuf::from("/tmp/site-data"));
        assert_eq!(config.api.api_key.as_deref(), Some("k"));
        assert_eq!(config.alert_store_path(), PathBuf::from("/tmp/site-data/price-alerts.json"));
        assert!(matches!(cli.command, Commands::Market { tab: MarketTab::Gainers, .. }));
    }

    #[test]
    fn test_cli_rejects_unknown_tab_and_direction() {
        assert!(Cli::try_parse_from(["coinpulse", "market", "--tab", "rank"]).is_err());
        assert!(Cli::try_parse_from(["coinpulse", "alerts", "add", "bitcoin", "1", "-d", "sideways"]).is_err());
    }

    #[tokio::test]
    async fn test_alert_add_list_remove() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let add = AlertCommand::Add {
            coin: "bitcoin".to_string(),
            price: 70000.0,
            direction: AlertDirection::Above,
        };
        CommandExecutor::execute_alerts_command(add, config.clone()).await.unwrap();

        let store = AlertStore::new(config.alert_store_path());
        assert!(dir.path().join("price-alerts.json").is_file());
        let book = store.load().unwrap();
        assert_eq!(book.alerts().len(), 1);
        let id = book.alerts()[0].id.clone();

        CommandExecutor::execute_alerts_command(AlertCommand::Remove { id: id.clone() }, config.clone())
            .await
            .unwrap();
        assert!(store.load().unwrap().is_empty());

        let missing = CommandExecutor::execute_alerts_command(AlertCommand::Remove { id }, config).await;
        assert!(matches!(missing, Err(AppError::Alert(_))));
    }
}
