//! Pairwise price comparison across exchanges for a single coin

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::ArbitrageCandidate;
use crate::domain::ticker::Ticker;
use crate::shared::types::ArbitrageConfig;

/// Absolute difference and percentage relative to the lower price
pub fn price_gap(price_a: f64, price_b: f64) -> (f64, f64) {
    let diff = (price_b - price_a).abs();
    let percentage = diff / price_a.min(price_b) * 100.0;
    (diff, percentage)
}

/// Sort descending by percentage and keep the best `top_n`
pub fn rank_candidates(mut candidates: Vec<ArbitrageCandidate>, top_n: usize) -> Vec<ArbitrageCandidate> {
    candidates.sort_by(|a, b| b.price_diff_percentage.total_cmp(&a.price_diff_percentage));
    candidates.truncate(top_n);
    candidates
}

/// Reduce a coin's raw ticker list to the ones worth comparing: dollar-quoted,
/// from an allowed exchange, one per exchange, at most `max_tickers_per_coin`.
pub fn select_tickers(tickers: &[Ticker], config: &ArbitrageConfig) -> Vec<Ticker> {
    let mut seen = HashSet::new();

    tickers
        .iter()
        .filter(|t| t.is_quoted_in(&config.quote_targets))
        .filter(|t| config.exchange_ids.is_empty() || config.exchange_ids.contains(&t.exchange_id))
        .filter(|t| t.comparable_price().is_some())
        .filter(|t| seen.insert(t.exchange_id.clone()))
        .take(config.max_tickers_per_coin)
        .cloned()
        .collect()
}

/// Finds exchange pairs whose prices for the same coin differ by more than a threshold
#[derive(Debug, Clone)]
pub struct PriceScanner {
    min_diff_percentage: f64,
}

impl PriceScanner {
    pub fn new(min_diff_percentage: f64) -> Self {
        Self { min_diff_percentage }
    }

    pub fn min_diff_percentage(&self) -> f64 {
        self.min_diff_percentage
    }

    /// Compare every unordered pair of priced tickers. The cheaper exchange is the
    /// buy side. Labels start out as the raw ids.
    pub fn scan(
        &self,
        coin_id: &str,
        tickers: &[Ticker],
        top_n: usize,
        timestamp: DateTime<Utc>,
    ) -> Vec<ArbitrageCandidate> {
        let priced: Vec<(&Ticker, f64)> = tickers
            .iter()
            .filter_map(|t| t.comparable_price().map(|price| (t, price)))
            .collect();

        if priced.len() < 2 {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for i in 0..priced.len() {
            for j in (i + 1)..priced.len() {
                let (ticker_i, price_i) = priced[i];
                let (ticker_j, price_j) = priced[j];

                let (diff, percentage) = price_gap(price_i, price_j);
                if percentage <= self.min_diff_percentage {
                    continue;
                }

                let ((buy, buy_price), (sell, sell_price)) = if price_i <= price_j {
                    ((ticker_i, price_i), (ticker_j, price_j))
                } else {
                    ((ticker_j, price_j), (ticker_i, price_i))
                };

                candidates.push(ArbitrageCandidate {
                    coin_id: coin_id.to_string(),
                    coin_label: coin_id.to_string(),
                    buy_exchange: buy.exchange_id.clone(),
                    buy_exchange_label: buy.exchange_id.clone(),
                    buy_price,
                    sell_exchange: sell.exchange_id.clone(),
                    sell_exchange_label: sell.exchange_id.clone(),
                    sell_price,
                    price_diff: diff,
                    price_diff_percentage: percentage,
                    timestamp,
                });
            }
        }

        rank_candidates(candidates, top_n)
    }
}
