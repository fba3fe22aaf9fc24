//! Localized display names for coins and exchanges

use std::collections::BTreeMap;

use crate::domain::arbitrage::ArbitrageCandidate;
use crate::domain::market::{CoinMarket, Exchange};
use crate::shared::types::LabelsConfig;

fn builtin_coin_label(coin_id: &str) -> Option<&'static str> {
    let label = match coin_id {
        "bitcoin" => "比特币",
        "ethereum" => "以太坊",
        "tether" => "泰达币",
        "binancecoin" => "币安币",
        "ripple" => "瑞波币",
        "cardano" => "艾达币",
        "solana" => "索拉纳",
        "polkadot" => "波卡",
        "chainlink" => "链克",
        "litecoin" => "莱特币",
        "matic-network" | "polygon" => "马蹄",
        "dogecoin" => "狗狗币",
        "usd-coin" => "美元币",
        "tron" => "波场",
        "avalanche-2" => "雪崩",
        "shiba-inu" => "柴犬币",
        "bitcoin-cash" => "比特币现金",
        "stellar" => "恒星币",
        "uniswap" => "优尼",
        "ethereum-classic" => "以太经典",
        _ => return None,
    };
    Some(label)
}

fn builtin_exchange_label(exchange_id: &str) -> Option<&'static str> {
    let label = match exchange_id {
        "binance" => "币安",
        "okex" => "欧易",
        "huobi" => "火币",
        "gdax" => "Coinbase",
        "kraken" => "Kraken",
        "kucoin" => "库币",
        "gate" => "芝麻开门",
        "bybit_spot" => "Bybit",
        "bitfinex" => "Bitfinex",
        "mxc" => "抹茶",
        "bitget" => "Bitget",
        _ => return None,
    };
    Some(label)
}

/// Applies localized names; configured overrides win over the built-in table
#[derive(Debug, Clone, Default)]
pub struct Labeler {
    coins: BTreeMap<String, String>,
    exchanges: BTreeMap<String, String>,
}

impl Labeler {
    pub fn new(overrides: &LabelsConfig) -> Self {
        Self {
            coins: overrides.coins.clone(),
            exchanges: overrides.exchanges.clone(),
        }
    }

    pub fn coin_label(&self, coin_id: &str) -> Option<String> {
        self.coins
            .get(coin_id)
            .cloned()
            .or_else(|| builtin_coin_label(coin_id).map(str::to_string))
    }

    pub fn exchange_label(&self, exchange_id: &str) -> Option<String> {
        self.exchanges
            .get(exchange_id)
            .cloned()
            .or_else(|| builtin_exchange_label(exchange_id).map(str::to_string))
    }

    pub fn label_markets(&self, coins: &mut [CoinMarket]) {
        for coin in coins.iter_mut() {
            coin.chinese_name = self.coin_label(&coin.id);
        }
    }

    pub fn label_exchanges(&self, exchanges: &mut [Exchange]) {
        for exchange in exchanges.iter_mut() {
            exchange.chinese_name = self.exchange_label(&exchange.id);
        }
    }

    /// Unknown ids keep whatever label the candidate already carries
    pub fn label_candidate(&self, candidate: &mut ArbitrageCandidate) {
        if let Some(label) = self.coin_label(&candidate.coin_id) {
            candidate.coin_label = label;
        }
        if let Some(label) = self.exchange_label(&candidate.buy_exchange) {
            candidate.buy_exchange_label = label;
        }
        if let Some(label) = self.exchange_label(&candidate.sell_exchange) {
            candidate.sell_exchange_label = label;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arbitrage::PriceScanner;
    use crate::domain::ticker::Ticker;
    use chrono::Utc;

    #[test]
    fn test_builtin_and_override_labels() {
        let mut overrides = LabelsConfig::default();
        overrides.coins.insert("bitcoin".to_string(), "BTC".to_string());
        overrides.exchanges.insert("newdex".to_string(), "新交易所".to_string());

        let labeler = Labeler::new(&overrides);
        assert_eq!(labeler.coin_label("bitcoin").as_deref(), Some("BTC"));
        assert_eq!(labeler.coin_label("ethereum").as_deref(), Some("以太坊"));
        assert_eq!(labeler.coin_label("unknown-coin"), None);
        assert_eq!(labeler.exchange_label("newdex").as_deref(), Some("新交易所"));
        assert_eq!(labeler.exchange_label("binance").as_deref(), Some("币安"));
    }

    #[test]
    fn test_label_candidate_keeps_unknown_ids() {
        let tickers = vec![
            Ticker::new("binance", "BTC", "USDT", 100.0),
            Ticker::new("tinyswap", "BTC", "USDT", 101.0),
        ];
        let mut candidate = PriceScanner::new(0.1)
            .scan("bitcoin", &tickers, 1, Utc::now())
            .remove(0);

        Labeler::default().label_candidate(&mut candidate);
        assert_eq!(candidate.coin_label, "比特币");
        assert_eq!(candidate.buy_exchange_label, "币安");
        assert_eq!(candidate.sell_exchange_label, "tinyswap");
    }
}
