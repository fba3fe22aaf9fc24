//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::news::{Announcement, NewsItem};

/// Market-data API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub vs_currency: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            api_key: None,
            api_key_header: "x-cg-demo-api-key".to_string(),
            vs_currency: "usd".to_string(),
            timeout_secs: 10,
            max_retries: 3,
            retry_delay_ms: 2000,
            user_agent: concat!("coinpulse/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Refresh cycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Fixed pause between consecutive API calls (public rate limit)
    pub request_delay_ms: u64,
    /// Interval between cycles in watch mode
    pub interval_secs: u64,
    /// Coins for the market snapshot; empty means top coins by market cap
    pub coin_ids: Vec<String>,
    pub markets_per_page: u32,
    pub exchanges_per_page: u32,
    /// Exchanges whose trading pairs go into the exchange-pairs snapshot
    pub pair_exchange_ids: Vec<String>,
    /// Coins whose pairs are requested first and always kept
    pub pair_coin_ids: Vec<String>,
    pub pairs_per_exchange: usize,
    /// Snapshots older than this are reported as stale
    pub stale_after_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1500,
            interval_secs: 300,
            coin_ids: vec![
                "bitcoin".to_string(),
                "ethereum".to_string(),
                "binancecoin".to_string(),
                "ripple".to_string(),
                "cardano".to_string(),
                "solana".to_string(),
                "polkadot".to_string(),
                "chainlink".to_string(),
                "litecoin".to_string(),
                "matic-network".to_string(),
            ],
            markets_per_page: 50,
            exchanges_per_page: 10,
            pair_exchange_ids: vec![
                "binance".to_string(),
                "okex".to_string(),
                "huobi".to_string(),
            ],
            pair_coin_ids: vec![
                "bitcoin".to_string(),
                "ethereum".to_string(),
                "binancecoin".to_string(),
                "ripple".to_string(),
                "cardano".to_string(),
            ],
            pairs_per_exchange: 50,
            stale_after_secs: 3600,
        }
    }
}

impl RefreshConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Snapshot output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub data_dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Cross-exchange scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitrageConfig {
    pub coin_ids: Vec<String>,
    /// Only tickers from these exchanges take part; empty means any exchange
    pub exchange_ids: Vec<String>,
    /// Quote currencies treated as the same dollar price
    pub quote_targets: Vec<String>,
    pub min_diff_percentage: f64,
    pub max_tickers_per_coin: usize,
    /// Aggregate snapshot size
    pub top_n: usize,
    /// Per-coin display size
    pub display_top_n: usize,
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            coin_ids: vec![
                "bitcoin".to_string(),
                "ethereum".to_string(),
                "binancecoin".to_string(),
                "solana".to_string(),
                "ripple".to_string(),
            ],
            exchange_ids: vec![
                "binance".to_string(),
                "okex".to_string(),
                "huobi".to_string(),
                "gdax".to_string(),
                "kraken".to_string(),
                "kucoin".to_string(),
                "gate".to_string(),
                "bybit_spot".to_string(),
            ],
            quote_targets: vec!["USDT".to_string(), "USD".to_string()],
            min_diff_percentage: 0.1,
            max_tickers_per_coin: 5,
            top_n: 10,
            display_top_n: 3,
        }
    }
}

/// Price alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub store_path: PathBuf,
    pub cooldown_secs: i64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("price-alerts.json"),
            cooldown_secs: 3600,
        }
    }
}

/// Localized display-name overrides, keyed by API id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub coins: BTreeMap<String, String>,
    pub exchanges: BTreeMap<String, String>,
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub refresh: RefreshConfig,
    pub snapshot: SnapshotConfig,
    pub arbitrage: ArbitrageConfig,
    pub alerts: AlertsConfig,
    pub labels: LabelsConfig,
    pub news: Vec<NewsItem>,
    pub announcements: Vec<Announcement>,
}

impl AppConfig {
    /// Alert book location; a relative `alerts.store_path` lives in the data directory
    pub fn alert_store_path(&self) -> PathBuf {
        if self.alerts.store_path.is_absolute() {
            self.alerts.store_path.clone()
        } else {
            self.snapshot.data_dir.join(&self.alerts.store_path)
        }
    }
}
