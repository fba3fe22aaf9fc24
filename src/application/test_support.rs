//! In-memory market-data API for pipeline tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::domain::market::{CoinMarket, Exchange};
use crate::domain::ticker::Ticker;
use crate::infrastructure::market_api::MarketDataApi;
use crate::shared::errors::FetchError;
use crate::shared::types::AppConfig;

/// Defaults with zero request delay, writing under `dir`
pub(crate) fn config_in(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.snapshot.data_dir = dir.to_path_buf();
    config.refresh.request_delay_ms = 0;
    config.refresh.pair_exchange_ids = vec!["binance".to_string()];
    config.arbitrage.coin_ids = vec!["bitcoin".to_string()];
    config
}

#[derive(Default)]
pub(crate) struct FakeApi {
    markets: Vec<CoinMarket>,
    exchanges: Vec<Exchange>,
    exchange_tickers: HashMap<String, Vec<Ticker>>,
    coin_tickers: HashMap<String, Vec<Ticker>>,
    failing_coins: HashSet<String>,
    fail_markets: bool,
}

impl FakeApi {
    pub fn with_markets(mut self, markets: Vec<CoinMarket>) -> Self {
        self.markets = markets;
        self
    }

    pub fn with_exchanges(mut self, exchanges: Vec<Exchange>) -> Self {
        self.exchanges = exchanges;
        self
    }

    pub fn with_exchange(mut self, exchange_id: &str, tickers: Vec<Ticker>) -> Self {
        self.exchange_tickers.insert(exchange_id.to_string(), tickers);
        self
    }

    pub fn with_coin(mut self, coin_id: &str, tickers: Vec<Ticker>) -> Self {
        self.coin_tickers.insert(coin_id.to_string(), tickers);
        self
    }

    pub fn failing_coin(mut self, coin_id: &str) -> Self {
        self.failing_coins.insert(coin_id.to_string());
        self
    }

    pub fn failing_markets(mut self) -> Self {
        self.fail_markets = true;
        self
    }
}

fn unavailable(what: &str) -> FetchError {
    FetchError::RetriesExhausted {
        what: what.to_string(),
        attempts: 3,
        last_error: Box::new(FetchError::Status {
            status: 503,
            url: format!("https://api.test/{}", what),
        }),
    }
}

#[async_trait]
impl MarketDataApi for FakeApi {
    async fn coins_markets(&self, _coin_ids: &[String], _per_page: u32) -> Result<Vec<CoinMarket>, FetchError> {
        if self.fail_markets {
            return Err(unavailable("coins/markets"));
        }
        if self.markets.is_empty() {
            return Err(FetchError::EmptyResponse("coins/markets".to_string()));
        }
        Ok(self.markets.clone())
    }

    async fn exchanges(&self, _per_page: u32) -> Result<Vec<Exchange>, FetchError> {
        if self.exchanges.is_empty() {
            return Err(FetchError::EmptyResponse("exchanges".to_string()));
        }
        Ok(self.exchanges.clone())
    }

    async fn exchange_tickers(&self, exchange_id: &str, _coin_ids: &[String]) -> Result<Vec<Ticker>, FetchError> {
        self.exchange_tickers
            .get(exchange_id)
            .cloned()
            .ok_or_else(|| unavailable(&format!("exchanges/{}/tickers", exchange_id)))
    }

    async fn coin_tickers(&self, coin_id: &str, _exchange_ids: &[String]) -> Result<Vec<Ticker>, FetchError> {
        if self.failing_coins.contains(coin_id) {
            return Err(unavailable(&format!("coins/{}/tickers", coin_id)));
        }
        Ok(self.coin_tickers.get(coin_id).cloned().unwrap_or_default())
    }
}
