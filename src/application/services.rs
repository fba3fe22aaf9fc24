//! Application services over the market-data API and the snapshot files

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::arbitrage::{rank_candidates, select_tickers, ArbitrageCandidate, PriceScanner};
use crate::domain::labels::Labeler;
use crate::domain::market::CoinMarket;
use crate::infrastructure::market_api::MarketDataApi;
use crate::infrastructure::snapshot::{self, LastUpdated, SnapshotStore};
use crate::shared::errors::{AppError, FetchError};
use crate::shared::types::AppConfig;

/// Outcome of scanning a list of coins. Failed coins are listed, not fatal.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub candidates: Vec<ArbitrageCandidate>,
    pub scanned: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Arbitrage scanning service
pub struct ArbitrageService {
    api: Arc<dyn MarketDataApi>,
    scanner: PriceScanner,
    labeler: Labeler,
    config: AppConfig,
}

impl ArbitrageService {
    pub fn new(api: Arc<dyn MarketDataApi>, config: &AppConfig) -> Self {
        Self {
            api,
            scanner: PriceScanner::new(config.arbitrage.min_diff_percentage),
            labeler: Labeler::new(&config.labels),
            config: config.clone(),
        }
    }

    /// Fetch one coin's tickers and return its labelled candidates, best first
    pub async fn scan_coin(
        &self,
        coin_id: &str,
        top_n: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<ArbitrageCandidate>, FetchError> {
        let raw = self
            .api
            .coin_tickers(coin_id, &self.config.arbitrage.exchange_ids)
            .await?;
        let tickers = select_tickers(&raw, &self.config.arbitrage);
        debug!("📊 {}: {} of {} tickers usable", coin_id, tickers.len(), raw.len());

        let mut candidates = self.scanner.scan(coin_id, &tickers, top_n, now);
        for candidate in candidates.iter_mut() {
            self.labeler.label_candidate(candidate);
        }
        Ok(candidates)
    }

    /// Scan coins one after another with the request delay in between.
    /// A coin whose fetch fails is logged and skipped.
    pub async fn scan_all(&self, coin_ids: &[String], top_n: usize) -> ScanOutcome {
        let now = Utc::now();
        let mut outcome = ScanOutcome::default();
        let mut all = Vec::new();

        for (i, coin_id) in coin_ids.iter().enumerate() {
            if i > 0 {
                sleep(self.config.refresh.request_delay()).await;
            }

            match self.scan_coin(coin_id, top_n, now).await {
                Ok(candidates) => {
                    if !candidates.is_empty() {
                        info!("💰 {}: {} price gaps above {}%", coin_id, candidates.len(), self.scanner.min_diff_percentage());
                    }
                    all.extend(candidates);
                    outcome.scanned.push(coin_id.clone());
                }
                Err(e) => {
                    warn!("⚠️  Skipping {}: {}", coin_id, e);
                    outcome.failed.push((coin_id.clone(), e.to_string()));
                }
            }
        }

        outcome.candidates = rank_candidates(all, top_n);
        outcome
    }
}

/// How old the published data is
#[derive(Debug, Clone, PartialEq)]
pub struct DataFreshness {
    pub last_updated: Option<LastUpdated>,
    pub age: Option<Duration>,
    pub stale: bool,
}

impl DataFreshness {
    pub fn evaluate(last_updated: Option<LastUpdated>, now: DateTime<Utc>, stale_after: Duration) -> Self {
        let age = last_updated.as_ref().map(|m| now - m.timestamp);
        let stale = match age {
            Some(age) => age > stale_after,
            None => true,
        };
        Self {
            last_updated,
            age,
            stale,
        }
    }

    /// Read the last-updated marker; a missing or unreadable marker counts as stale
    pub fn from_store(store: &SnapshotStore, now: DateTime<Utc>, stale_after: Duration) -> Self {
        let marker = match store.read_last_updated() {
            Ok(marker) => Some(marker),
            Err(e) => {
                debug!("No last-updated marker: {}", e);
                None
            }
        };
        Self::evaluate(marker, now, stale_after)
    }

    /// "5 minutes ago" style text
    pub fn describe_age(&self) -> String {
        let Some(age) = self.age else {
            return "never".to_string();
        };

        let seconds = age.num_seconds().max(0);
        match seconds {
            s if s < 60 => format!("{}s ago", s),
            s if s < 3600 => format!("{}m ago", s / 60),
            s if s < 86_400 => format!("{}h {}m ago", s / 3600, (s % 3600) / 60),
            s => format!("{}d ago", s / 86_400),
        }
    }
}

/// Read side: snapshot first, live API when the snapshot is missing or unreadable
pub struct MarketService {
    api: Arc<dyn MarketDataApi>,
    store: SnapshotStore,
    labeler: Labeler,
    config: AppConfig,
}

impl MarketService {
    pub fn new(api: Arc<dyn MarketDataApi>, config: &AppConfig) -> Self {
        Self {
            api,
            store: SnapshotStore::new(config.snapshot.data_dir.clone()),
            labeler: Labeler::new(&config.labels),
            config: config.clone(),
        }
    }

    pub async fn coin_markets(&self, live: bool) -> Result<Vec<CoinMarket>, AppError> {
        if !live {
            match self.store.read::<Vec<CoinMarket>>(snapshot::COINS_MARKET) {
                Ok(coins) if !coins.is_empty() => return Ok(coins),
                Ok(_) => warn!("⚠️  {} is empty, querying the API", snapshot::COINS_MARKET),
                Err(e) => warn!("⚠️  {}, querying the API", e),
            }
        }

        let mut coins = self
            .api
            .coins_markets(&self.config.refresh.coin_ids, self.config.refresh.markets_per_page)
            .await?;
        self.labeler.label_markets(&mut coins);
        Ok(coins)
    }

    pub fn published_opportunities(&self) -> Option<Vec<ArbitrageCandidate>> {
        match self
            .store
            .read::<Vec<ArbitrageCandidate>>(snapshot::ARBITRAGE_OPPORTUNITIES)
        {
            Ok(candidates) => Some(candidates),
            Err(e) => {
                warn!("⚠️  {}, scanning live", e);
                None
            }
        }
    }

    /// Published opportunities, or a live scan of the configured coins
    pub async fn arbitrage_opportunities(
        &self,
        arbitrage: &ArbitrageService,
        live: bool,
    ) -> Result<Vec<ArbitrageCandidate>, AppError> {
        if !live {
            if let Some(candidates) = self.published_opportunities() {
                return Ok(candidates);
            }
        }

        let outcome = arbitrage
            .scan_all(&self.config.arbitrage.coin_ids, self.config.arbitrage.top_n)
            .await;
        if outcome.scanned.is_empty() && !outcome.failed.is_empty() {
            return Err(AppError::NoData(format!(
                "ticker fetch failed for all {} coins",
                outcome.failed.len()
            )));
        }
        Ok(outcome.candidates)
    }
}
