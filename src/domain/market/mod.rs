//! Market domain - coin market rows, exchanges and market-wide analysis

mod market_analyzer;

pub use market_analyzer::{MarketAnalyzer, MarketOverview, MarketTab, MarketTrend};

use serde::{Deserialize, Serialize};

/// One row of the coin market listing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub chinese_name: Option<String>,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub total_volume: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub last_updated: Option<String>,
}

impl CoinMarket {
    pub fn display_name(&self) -> &str {
        self.chinese_name.as_deref().unwrap_or(&self.name)
    }

    pub fn change_24h(&self) -> f64 {
        self.price_change_percentage_24h.unwrap_or(0.0)
    }
}

/// Exchange directory entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Exchange {
    pub id: String,
    pub name: String,
    pub chinese_name: Option<String>,
    pub country: Option<String>,
    pub year_established: Option<u32>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub trust_score: Option<u32>,
    pub trust_score_rank: Option<u32>,
    pub trade_volume_24h_btc: Option<f64>,
}
