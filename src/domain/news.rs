//! News and announcements republished as snapshots: curated entries plus
//! items generated from the market listing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::market::{CoinMarket, MarketAnalyzer};
use crate::shared::utils::{format_large_number, format_price};

/// 24h move that makes the top gainer or loser a news item
const MARKET_NEWS_CHANGE_PCT: f64 = 5.0;
pub const MARKET_NEWS_SOURCE: &str = "CoinPulse 行情";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub trait Dated {
    fn date(&self) -> &str;
}

impl Dated for NewsItem {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Dated for Announcement {
    fn date(&self) -> &str {
        &self.date
    }
}

/// ISO dates order lexicographically; ties keep their configured order.
pub fn newest_first<T: Dated + Clone>(items: &[T]) -> Vec<T> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.date().cmp(a.date()));
    sorted
}

fn coin_news(kind: &str, coin: &CoinMarket, title: String, now: DateTime<Utc>) -> NewsItem {
    let price = coin
        .current_price
        .map(format_price)
        .unwrap_or_else(|| "-".to_string());

    NewsItem {
        id: format!("market-{}-{}", kind, now.format("%Y%m%d")),
        summary: format!(
            "{} ({}) 现报 {}，24小时涨跌幅 {:+.2}%。",
            coin.display_name(),
            coin.symbol.to_uppercase(),
            price,
            coin.change_24h()
        ),
        title,
        source: MARKET_NEWS_SOURCE.to_string(),
        url: String::new(),
        image: coin.image.clone(),
        date: now.format("%Y-%m-%d").to_string(),
    }
}

/// News derived from the market listing: the top gainer when it is up more than
/// 5%, the top loser when it is down more than 5%, and a market overview.
/// An empty listing yields nothing.
pub fn market_news(coins: &[CoinMarket], now: DateTime<Utc>) -> Vec<NewsItem> {
    let Some(overview) = MarketAnalyzer::overview(coins) else {
        return Vec::new();
    };
    let mut items = Vec::new();

    let gainer = coins
        .iter()
        .max_by(|a, b| a.change_24h().total_cmp(&b.change_24h()))
        .filter(|c| c.change_24h() > MARKET_NEWS_CHANGE_PCT);
    if let Some(coin) = gainer {
        let title = format!("{} 24小时上涨 {:.2}%，领涨市场", coin.display_name(), coin.change_24h());
        items.push(coin_news("gainer", coin, title, now));
    }

    let loser = coins
        .iter()
        .min_by(|a, b| a.change_24h().total_cmp(&b.change_24h()))
        .filter(|c| c.change_24h() < -MARKET_NEWS_CHANGE_PCT);
    if let Some(coin) = loser {
        let title = format!("{} 24小时下跌 {:.2}%，跌幅居前", coin.display_name(), coin.change_24h().abs());
        items.push(coin_news("loser", coin, title, now));
    }

    items.push(NewsItem {
        id: format!("market-overview-{}", now.format("%Y%m%d")),
        title: format!("加密货币总市值 ${}，市场{}", format_large_number(overview.total_market_cap), overview.trend.label()),
        summary: format!(
            "跟踪的 {} 个币种中 {} 个24小时上涨（{:.1}%），24小时成交额 ${}。",
            overview.coin_count,
            overview.rising_count,
            overview.rising_percentage,
            format_large_number(overview.total_volume)
        ),
        source: MARKET_NEWS_SOURCE.to_string(),
        url: String::new(),
        image: None,
        date: now.format("%Y-%m-%d").to_string(),
    });

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, change: f64) -> CoinMarket {
        CoinMarket {
            id: id.to_string(),
            symbol: id.to_string(),
            name: id.to_string(),
            current_price: Some(10.0),
            market_cap: Some(1_000_000_000.0),
            total_volume: Some(1_000_000.0),
            price_change_percentage_24h: Some(change),
            ..CoinMarket::default()
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T08:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_market_news_big_movers() {
        let coins = vec![coin("up", 7.5), coin("flat", 0.4), coin("down", -6.25)];
        let news = market_news(&coins, now());

        let ids: Vec<&str> = news.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["market-gainer-20240501", "market-loser-20240501", "market-overview-20240501"]);
        assert!(news[0].title.starts_with("up 24小时上涨 7.50%"));
        assert!(news[1].title.starts_with("down 24小时下跌 6.25%"));
        assert!(news.iter().all(|n| n.date == "2024-05-01"));
    }

    #[test]
    fn test_market_news_thresholds_are_strict() {
        let coins = vec![coin("a", 5.0), coin("b", -5.0)];
        let news = market_news(&coins, now());

        assert_eq!(news.len(), 1);
        assert_eq!(news[0].id, "market-overview-20240501");
        assert!(news[0].title.contains("2.00B"));
    }

    #[test]
    fn test_market_news_empty_listing() {
        assert!(market_news(&[], now()).is_empty());
    }

    fn announcement(id: &str, date: &str) -> Announcement {
        Announcement {
            id: id.to_string(),
            title: id.to_string(),
            content: String::new(),
            date: date.to_string(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_newest_first_is_stable() {
        let items = vec![
            announcement("old", "2024-01-01"),
            announcement("new-a", "2024-03-01"),
            announcement("new-b", "2024-03-01"),
            announcement("mid", "2024-02-15"),
        ];

        let ids: Vec<String> = newest_first(&items).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["new-a", "new-b", "mid", "old"]);
    }
}
