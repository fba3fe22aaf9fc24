//! Arbitrage domain - cross-exchange price gaps

pub mod price_scanner;

pub use price_scanner::{price_gap, rank_candidates, select_tickers, PriceScanner};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A same-asset price gap between two exchanges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageCandidate {
    pub coin_id: String,
    #[serde(rename = "coinChineseName")]
    pub coin_label: String,
    pub buy_exchange: String,
    #[serde(rename = "buyExchangeChineseName")]
    pub buy_exchange_label: String,
    pub buy_price: f64,
    pub sell_exchange: String,
    #[serde(rename = "sellExchangeChineseName")]
    pub sell_exchange_label: String,
    pub sell_price: f64,
    pub price_diff: f64,
    pub price_diff_percentage: f64,
    pub timestamp: DateTime<Utc>,
}

impl ArbitrageCandidate {
    pub fn route_description(&self) -> String {
        format!(
            "{}: buy on {} @ {} -> sell on {} @ {} (+{:.2}%)",
            self.coin_id,
            self.buy_exchange_label,
            self.buy_price,
            self.sell_exchange_label,
            self.sell_price,
            self.price_diff_percentage
        )
    }
}
