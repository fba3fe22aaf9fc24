//! Exchange ticker snapshots

use serde::{Deserialize, Serialize};

/// One exchange's quote for a trading pair, as of the last refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub exchange_id: String,
    /// API coin id of the base asset, when the API reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_id: Option<String>,
    pub base: String,
    pub target: String,
    #[serde(rename = "last")]
    pub last_price: Option<f64>,
    pub volume: Option<f64>,
    /// Last price converted to USD by the API, when it provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd_price: Option<f64>,
}

impl Ticker {
    pub fn new(exchange_id: &str, base: &str, target: &str, last_price: f64) -> Self {
        Self {
            exchange_id: exchange_id.to_string(),
            coin_id: None,
            base: base.to_string(),
            target: target.to_string(),
            last_price: Some(last_price),
            volume: None,
            usd_price: None,
        }
    }

    /// Price used for cross-exchange comparison. Only finite positive prices count.
    pub fn comparable_price(&self) -> Option<f64> {
        self.usd_price
            .or(self.last_price)
            .filter(|price| price.is_finite() && *price > 0.0)
    }

    pub fn with_coin_id(mut self, coin_id: &str) -> Self {
        self.coin_id = Some(coin_id.to_string());
        self
    }

    /// Base asset is one of `coin_ids`
    pub fn is_for_any(&self, coin_ids: &[String]) -> bool {
        self.coin_id
            .as_ref()
            .is_some_and(|id| coin_ids.iter().any(|c| c == id))
    }

    pub fn is_quoted_in(&self, targets: &[String]) -> bool {
        targets.iter().any(|t| t.eq_ignore_ascii_case(&self.target))
    }
}

/// Dollar-quoted pairs of one exchange: pairs of `tracked` coins first, then the
/// rest in API order, at most `limit`.
pub fn select_exchange_pairs(
    tickers: Vec<Ticker>,
    quote_targets: &[String],
    tracked: &[String],
    limit: usize,
) -> Vec<Ticker> {
    let (mut selected, rest): (Vec<Ticker>, Vec<Ticker>) = tickers
        .into_iter()
        .filter(|t| t.is_quoted_in(quote_targets))
        .partition(|t| t.is_for_any(tracked));

    selected.extend(rest);
    selected.truncate(limit);
    selected
}
