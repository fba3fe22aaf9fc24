pub mod coingecko;

pub use coingecko::CoinGeckoClient;

use async_trait::async_trait;

use crate::domain::market::{CoinMarket, Exchange};
use crate::domain::ticker::Ticker;
use crate::shared::errors::FetchError;

/// Public market-data REST API
#[async_trait]
pub trait MarketDataApi: Send + Sync {
    /// Coin market rows ordered by market cap. An empty `coin_ids` asks for the top coins.
    async fn coins_markets(&self, coin_ids: &[String], per_page: u32) -> Result<Vec<CoinMarket>, FetchError>;

    /// Exchange directory ordered by trust rank
    async fn exchanges(&self, per_page: u32) -> Result<Vec<Exchange>, FetchError>;

    /// Trading pairs listed on one exchange by volume, optionally restricted to `coin_ids`
    async fn exchange_tickers(&self, exchange_id: &str, coin_ids: &[String]) -> Result<Vec<Ticker>, FetchError>;

    /// One coin's tickers across exchanges, optionally restricted to `exchange_ids`
    async fn coin_tickers(&self, coin_id: &str, exchange_ids: &[String]) -> Result<Vec<Ticker>, FetchError>;
}
