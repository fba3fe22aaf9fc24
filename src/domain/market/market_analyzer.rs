//! Market-wide statistics and listing filters

use std::fmt;
use std::str::FromStr;

use super::CoinMarket;

/// Share of rising coins above which the market reads as bullish
const BULLISH_RISING_PCT: f64 = 60.0;
/// Share of rising coins above which the market reads as neutral
const NEUTRAL_RISING_PCT: f64 = 40.0;
/// 24h change a coin needs to be listed as hot
const HOT_CHANGE_PCT: f64 = 5.0;
const HOT_COINS_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketTrend {
    Bullish,
    Neutral,
    Bearish,
}

impl MarketTrend {
    pub fn from_rising_percentage(rising_percentage: f64) -> Self {
        if rising_percentage > BULLISH_RISING_PCT {
            MarketTrend::Bullish
        } else if rising_percentage > NEUTRAL_RISING_PCT {
            MarketTrend::Neutral
        } else {
            MarketTrend::Bearish
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MarketTrend::Bullish => "看涨",
            MarketTrend::Neutral => "震荡",
            MarketTrend::Bearish => "看跌",
        }
    }
}

impl fmt::Display for MarketTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarketTrend::Bullish => "bullish",
            MarketTrend::Neutral => "neutral",
            MarketTrend::Bearish => "bearish",
        };
        write!(f, "{}", name)
    }
}

/// Listing tabs of the market page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketTab {
    #[default]
    All,
    Gainers,
    Losers,
    Volume,
}

impl FromStr for MarketTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(MarketTab::All),
            "gainers" => Ok(MarketTab::Gainers),
            "losers" => Ok(MarketTab::Losers),
            "volume" => Ok(MarketTab::Volume),
            other => Err(format!("unknown tab '{}' (all, gainers, losers, volume)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketOverview {
    pub coin_count: usize,
    pub rising_count: usize,
    pub rising_percentage: f64,
    pub total_market_cap: f64,
    pub total_volume: f64,
    pub trend: MarketTrend,
    pub hot_coins: Vec<CoinMarket>,
}

/// Analyzes a market snapshot
pub struct MarketAnalyzer;

impl MarketAnalyzer {
    /// `None` for an empty listing
    pub fn overview(coins: &[CoinMarket]) -> Option<MarketOverview> {
        if coins.is_empty() {
            return None;
        }

        let rising_count = coins.iter().filter(|c| c.change_24h() > 0.0).count();
        let rising_percentage = rising_count as f64 / coins.len() as f64 * 100.0;

        Some(MarketOverview {
            coin_count: coins.len(),
            rising_count,
            rising_percentage,
            total_market_cap: coins.iter().filter_map(|c| c.market_cap).sum(),
            total_volume: coins.iter().filter_map(|c| c.total_volume).sum(),
            trend: MarketTrend::from_rising_percentage(rising_percentage),
            hot_coins: Self::hot_coins(coins),
        })
    }

    /// Coins up more than 5% in 24h, strongest first
    pub fn hot_coins(coins: &[CoinMarket]) -> Vec<CoinMarket> {
        let mut hot: Vec<CoinMarket> = coins
            .iter()
            .filter(|c| c.change_24h() > HOT_CHANGE_PCT)
            .cloned()
            .collect();
        hot.sort_by(|a, b| b.change_24h().total_cmp(&a.change_24h()));
        hot.truncate(HOT_COINS_LIMIT);
        hot
    }

    /// Search by name or symbol (case-insensitive), then order by tab
    pub fn filter(coins: &[CoinMarket], tab: MarketTab, search: Option<&str>) -> Vec<CoinMarket> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut filtered: Vec<CoinMarket> = coins
            .iter()
            .filter(|c| match &needle {
                Some(n) => c.name.to_lowercase().contains(n) || c.symbol.to_lowercase().contains(n),
                None => true,
            })
            .cloned()
            .collect();

        match tab {
            MarketTab::Gainers => {
                filtered.retain(|c| c.change_24h() > 0.0);
                filtered.sort_by(|a, b| b.change_24h().total_cmp(&a.change_24h()));
            }
            MarketTab::Losers => {
                filtered.retain(|c| c.change_24h() < 0.0);
                filtered.sort_by(|a, b| a.change_24h().total_cmp(&b.change_24h()));
            }
            MarketTab::Volume => {
                filtered.sort_by(|a, b| {
                    b.total_volume
                        .unwrap_or(0.0)
                        .total_cmp(&a.total_volume.unwrap_or(0.0))
                });
            }
            MarketTab::All => {
                filtered.sort_by_key(|c| c.market_cap_rank.unwrap_or(u32::MAX));
            }
        }

        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, symbol: &str, rank: u32, change: f64, volume: f64) -> CoinMarket {
        CoinMarket {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: id.to_string(),
            market_cap: Some(1000.0 / rank as f64),
            market_cap_rank: Some(rank),
            total_volume: Some(volume),
            price_change_percentage_24h: Some(change),
            current_price: Some(1.0),
            ..CoinMarket::default()
        }
    }

    fn sample() -> Vec<CoinMarket> {
        vec![
            coin("ethereum", "eth", 2, 7.5, 300.0),
            coin("bitcoin", "btc", 1, 2.0, 500.0),
            coin("solana", "sol", 5, -3.0, 100.0),
            coin("ripple", "xrp", 4, 12.0, 50.0),
            coin("cardano", "ada", 3, -1.0, 80.0),
        ]
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(MarketTrend::from_rising_percentage(60.1), MarketTrend::Bullish);
        assert_eq!(MarketTrend::from_rising_percentage(60.0), MarketTrend::Neutral);
        assert_eq!(MarketTrend::from_rising_percentage(40.1), MarketTrend::Neutral);
        assert_eq!(MarketTrend::from_rising_percentage(40.0), MarketTrend::Bearish);
    }

    #[test]
    fn test_overview() {
        let overview = MarketAnalyzer::overview(&sample()).unwrap();
        assert_eq!(overview.coin_count, 5);
        assert_eq!(overview.rising_count, 3);
        assert_eq!(overview.trend, MarketTrend::Neutral);
        assert_eq!(overview.total_volume, 1030.0);

        let hot: Vec<&str> = overview.hot_coins.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(hot, vec!["ripple", "ethereum"]);

        assert!(MarketAnalyzer::overview(&[]).is_none());
    }

    #[test]
    fn test_tabs() {
        let coins = sample();
        let ids = |list: Vec<CoinMarket>| list.into_iter().map(|c| c.id).collect::<Vec<_>>();

        assert_eq!(
            ids(MarketAnalyzer::filter(&coins, MarketTab::All, None)),
            vec!["bitcoin", "ethereum", "cardano", "ripple", "solana"]
        );
        assert_eq!(
            ids(MarketAnalyzer::filter(&coins, MarketTab::Gainers, None)),
            vec!["ripple", "ethereum", "bitcoin"]
        );
        assert_eq!(
            ids(MarketAnalyzer::filter(&coins, MarketTab::Losers, None)),
            vec!["solana", "cardano"]
        );
        assert_eq!(
            ids(MarketAnalyzer::filter(&coins, MarketTab::Volume, None))[0],
            "bitcoin"
        );
    }

    #[test]
    fn test_search_matches_name_or_symbol() {
        let coins = sample();
        let found = MarketAnalyzer::filter(&coins, MarketTab::All, Some("SOL"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "solana");

        let by_symbol = MarketAnalyzer::filter(&coins, MarketTab::All, Some("xr"));
        assert_eq!(by_symbol[0].id, "ripple");

        assert_eq!(MarketAnalyzer::filter(&coins, MarketTab::All, Some("  ")).len(), 5);
    }

    #[test]
    fn test_tab_parsing() {
        assert_eq!("Gainers".parse::<MarketTab>(), Ok(MarketTab::Gainers));
        assert!("trending".parse::<MarketTab>().is_err());
    }
}
