//! Full data refresh: fetch, scan, publish snapshots

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{error, info, warn};

use super::services::ArbitrageService;
use crate::domain::labels::Labeler;
use crate::domain::market::CoinMarket;
use crate::domain::news::{market_news, newest_first};
use crate::domain::ticker::{select_exchange_pairs, Ticker};
use crate::infrastructure::market_api::MarketDataApi;
use crate::infrastructure::snapshot::{self, LastUpdated, SnapshotStore};
use crate::shared::errors::AppError;
use crate::shared::types::AppConfig;

/// What one refresh cycle published and what it had to skip
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub markets: usize,
    pub exchanges: usize,
    pub exchange_pairs: usize,
    pub candidates: usize,
    pub news: usize,
    pub announcements: usize,
    pub failures: Vec<String>,
}

impl RefreshReport {
    fn start(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            finished_at: now,
            markets: 0,
            exchanges: 0,
            exchange_pairs: 0,
            candidates: 0,
            news: 0,
            announcements: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, stage: &str, err: impl std::fmt::Display) {
        warn!("⚠️  {} failed, keeping previous snapshot: {}", stage, err);
        self.failures.push(format!("{}: {}", stage, err));
    }

    pub fn print_summary(&self) {
        let elapsed = self.finished_at - self.started_at;
        info!("📊 Refresh finished in {}s", elapsed.num_seconds());
        info!("   Markets: {}", self.markets);
        info!("   Exchanges: {}", self.exchanges);
        info!("   Exchange pairs: {}", self.exchange_pairs);
        info!("   Arbitrage opportunities: {}", self.candidates);
        info!("   News / announcements: {} / {}", self.news, self.announcements);
        for failure in &self.failures {
            warn!("   ❌ {}", failure);
        }
    }
}

/// Runs the refresh pipeline against one API and one data directory
pub struct RefreshService {
    api: Arc<dyn MarketDataApi>,
    arbitrage: ArbitrageService,
    store: SnapshotStore,
    labeler: Labeler,
    config: AppConfig,
}

impl RefreshService {
    pub fn new(api: Arc<dyn MarketDataApi>, config: &AppConfig) -> Self {
        Self {
            arbitrage: ArbitrageService::new(Arc::clone(&api), config),
            api,
            store: SnapshotStore::new(config.snapshot.data_dir.clone()),
            labeler: Labeler::new(&config.labels),
            config: config.clone(),
        }
    }

    async fn pause(&self) {
        sleep(self.config.refresh.request_delay()).await;
    }

    /// One full cycle. Only an unusable data directory is fatal; every other
    /// failure is recorded in the report and leaves that snapshot untouched.
    pub async fn run_once(&self) -> Result<RefreshReport, AppError> {
        let mut report = RefreshReport::start(Utc::now());
        info!("🔄 Refreshing market data into {}", self.store.data_dir().display());

        self.store.ensure_dir()?;

        let coins = match self.refresh_markets().await {
            Ok(coins) => {
                report.markets = coins.len();
                coins
            }
            Err(e) => {
                report.fail("coin markets", e);
                // market news falls back to the last published listing
                self.store
                    .read::<Vec<CoinMarket>>(snapshot::COINS_MARKET)
                    .unwrap_or_default()
            }
        };

        self.pause().await;
        match self.refresh_exchanges().await {
            Ok(count) => report.exchanges = count,
            Err(e) => report.fail("exchanges", e),
        }

        self.refresh_exchange_pairs(&mut report).await;

        self.pause().await;
        self.refresh_arbitrage(&mut report).await;

        self.publish_news(&coins, report.started_at, &mut report);

        let finished_at = Utc::now();
        let marker = LastUpdated {
            total_coins: report.markets,
            total_exchanges: report.exchanges,
            total_arbitrage_opportunities: report.candidates,
            total_news: report.news,
            ..LastUpdated::at(finished_at)
        };
        if let Err(e) = self.store.write_last_updated(&marker) {
            report.fail("last-updated marker", e);
        }
        report.finished_at = finished_at;

        Ok(report)
    }

    async fn refresh_markets(&self) -> Result<Vec<CoinMarket>, AppError> {
        let mut coins = self
            .api
            .coins_markets(&self.config.refresh.coin_ids, self.config.refresh.markets_per_page)
            .await?;
        self.labeler.label_markets(&mut coins);
        self.store.write(snapshot::COINS_MARKET, &coins)?;
        Ok(coins)
    }

    async fn refresh_exchanges(&self) -> Result<usize, AppError> {
        let mut exchanges = self.api.exchanges(self.config.refresh.exchanges_per_page).await?;
        self.labeler.label_exchanges(&mut exchanges);
        self.store.write(snapshot::EXCHANGES, &exchanges)?;
        Ok(exchanges.len())
    }

    /// Dollar-quoted pairs per exchange. A failing exchange is skipped; the
    /// snapshot is only replaced when at least one exchange answered.
    async fn refresh_exchange_pairs(&self, report: &mut RefreshReport) {
        let mut pairs: BTreeMap<String, Vec<Ticker>> = BTreeMap::new();
        let mut failed = 0;

        for exchange_id in &self.config.refresh.pair_exchange_ids {
            self.pause().await;

            let tracked = &self.config.refresh.pair_coin_ids;
            match self.api.exchange_tickers(exchange_id, tracked).await {
                Ok(tickers) => {
                    let quoted = select_exchange_pairs(
                        tickers,
                        &self.config.arbitrage.quote_targets,
                        tracked,
                        self.config.refresh.pairs_per_exchange,
                    );
                    info!("✅ {}: {} pairs", exchange_id, quoted.len());
                    pairs.insert(exchange_id.clone(), quoted);
                }
                Err(e) => {
                    warn!("⚠️  Skipping pairs for {}: {}", exchange_id, e);
                    failed += 1;
                }
            }
        }

        if pairs.is_empty() && failed > 0 {
            report.fail("exchange pairs", format!("all {} exchanges failed", failed));
            return;
        }
        if failed > 0 {
            report
                .failures
                .push(format!("exchange pairs: {} exchanges skipped", failed));
        }

        match self.store.write(snapshot::EXCHANGE_PAIRS, &pairs) {
            Ok(_) => report.exchange_pairs = pairs.values().map(Vec::len).sum(),
            Err(e) => report.fail("exchange pairs", e),
        }
    }

    async fn refresh_arbitrage(&self, report: &mut RefreshReport) {
        let arbitrage = &self.config.arbitrage;
        let outcome = self.arbitrage.scan_all(&arbitrage.coin_ids, arbitrage.top_n).await;

        for (coin_id, reason) in &outcome.failed {
            report.failures.push(format!("arbitrage {}: {}", coin_id, reason));
        }

        if outcome.scanned.is_empty() && !outcome.failed.is_empty() {
            report.fail("arbitrage scan", "no coin could be scanned");
            return;
        }

        match self
            .store
            .write(snapshot::ARBITRAGE_OPPORTUNITIES, &outcome.candidates)
        {
            Ok(_) => report.candidates = outcome.candidates.len(),
            Err(e) => report.fail("arbitrage opportunities", e),
        }
    }

    /// Market-derived items merged with the curated news, newest first
    fn publish_news(&self, coins: &[CoinMarket], now: DateTime<Utc>, report: &mut RefreshReport) {
        let mut news = market_news(coins, now);
        news.extend(self.config.news.iter().cloned());
        let news = newest_first(&news);
        match self.store.write(snapshot::NEWS, &news) {
            Ok(_) => report.news = news.len(),
            Err(e) => report.fail("news", e),
        }

        let announcements = newest_first(&self.config.announcements);
        match self.store.write(snapshot::ANNOUNCEMENTS, &announcements) {
            Ok(_) => report.announcements = announcements.len(),
            Err(e) => report.fail("announcements", e),
        }
    }

    /// Refresh on a fixed interval until Ctrl-C
    pub async fn watch(&self) -> Result<(), AppError> {
        self.watch_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("❌ Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Refresh on a fixed interval until `shutdown` resolves, also when it
    /// resolves in the middle of a cycle.
    pub async fn watch_until(&self, shutdown: impl Future<Output = ()>) -> Result<(), AppError> {
        let period = self.config.refresh.interval();
        info!("👀 Watching: refresh every {}s, Ctrl-C to stop", period.as_secs());

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle: u64 = 0;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => {
                    info!("🛑 Stopping after {} cycles", cycle);
                    return Ok(());
                }
            }

            cycle += 1;
            info!("🔄 Cycle {}", cycle);
            tokio::select! {
                result = self.run_once() => match result {
                    Ok(report) => report.print_summary(),
                    Err(e) => error!("❌ Refresh cycle {} failed: {}", cycle, e),
                },
                _ = &mut shutdown => {
                    warn!("🛑 Stopping during cycle {}, snapshots of this cycle may be partial", cycle);
                    return Ok(());
                }
            }
        }
    }
}
