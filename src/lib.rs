//! Coinpulse - crypto market data refresher
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::{ArbitrageService, RefreshService};
pub use domain::arbitrage::{ArbitrageCandidate, PriceScanner};
pub use infrastructure::{CoinGeckoClient, MarketDataApi, SnapshotStore};
pub use shared::config::ConfigLoader;
