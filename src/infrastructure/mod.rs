//! Infrastructure layer - HTTP, market-data API and file persistence

pub mod alert_store;
pub mod http;
pub mod market_api;
pub mod snapshot;

pub use alert_store::AlertStore;
pub use market_api::{CoinGeckoClient, MarketDataApi};
pub use snapshot::SnapshotStore;
