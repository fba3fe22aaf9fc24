//! JSON snapshot files in the site's data directory

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::shared::errors::SnapshotError;

pub const COINS_MARKET: &str = "coins-market.json";
pub const EXCHANGES: &str = "exchanges.json";
pub const EXCHANGE_PAIRS: &str = "exchange-pairs.json";
pub const ARBITRAGE_OPPORTUNITIES: &str = "arbitrage-opportunities.json";
pub const NEWS: &str = "news.json";
pub const ANNOUNCEMENTS: &str = "announcements.json";
pub const LAST_UPDATED: &str = "last-updated.json";
pub const ERROR: &str = "error.json";

/// Marker the site shows as "last updated", with what the run published.
/// A stage that failed counts as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastUpdated {
    pub timestamp: DateTime<Utc>,
    pub formatted: String,
    #[serde(default)]
    pub total_coins: usize,
    #[serde(default)]
    pub total_exchanges: usize,
    #[serde(default)]
    pub total_arbitrage_opportunities: usize,
    #[serde(default)]
    pub total_news: usize,
}

impl LastUpdated {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now,
            formatted: now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            total_coins: 0,
            total_exchanges: 0,
            total_arbitrage_opportunities: 0,
            total_news: 0,
        }
    }
}

/// Written when a run dies, for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSnapshot {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub causes: Vec<String>,
}

/// Reads and overwrites whole snapshot files. No atomic rename, no versioning.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    pub fn ensure_dir(&self) -> Result<(), SnapshotError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| SnapshotError::CreateDir {
            path: self.data_dir.clone(),
            source,
        })
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf, SnapshotError> {
        self.ensure_dir()?;

        let mut json = serde_json::to_string_pretty(value).map_err(|source| SnapshotError::Serde {
            name: name.to_string(),
            source,
        })?;
        json.push('\n');

        let path = self.path(name);
        fs::write(&path, json).map_err(|source| SnapshotError::Write {
            path: path.clone(),
            source,
        })?;

        debug!("💾 Wrote {}", path.display());
        Ok(path)
    }

    pub fn read<T: DeserializeOwned>(&self, name: &str) -> Result<T, SnapshotError> {
        let path = self.path(name);
        let content = fs::read_to_string(&path).map_err(|source| SnapshotError::Read {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| SnapshotError::Serde {
            name: name.to_string(),
            source,
        })
    }

    pub fn write_last_updated(&self, marker: &LastUpdated) -> Result<PathBuf, SnapshotError> {
        self.write(LAST_UPDATED, marker)
    }

    pub fn read_last_updated(&self) -> Result<LastUpdated, SnapshotError> {
        self.read(LAST_UPDATED)
    }

    pub fn write_error(&self, snapshot: &ErrorSnapshot) -> Result<PathBuf, SnapshotError> {
        self.write(ERROR, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticker::Ticker;
    use std::collections::BTreeMap;

    fn pairs() -> BTreeMap<String, Vec<Ticker>> {
        let mut pairs = BTreeMap::new();
        pairs.insert("okex".to_string(), vec![Ticker::new("okex", "ETH", "USDT", 3500.0)]);
        pairs.insert("binance".to_string(), vec![Ticker::new("binance", "BTC", "USDT", 67000.0)]);
        pairs
    }

    #[test]
    fn test_same_data_writes_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let path = store.write(EXCHANGE_PAIRS, &pairs()).unwrap();
        let first = fs::read(&path).unwrap();
        store.write(EXCHANGE_PAIRS, &pairs()).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);

        let text = String::from_utf8(first).unwrap();
        assert!(text.find("\"binance\"").unwrap() < text.find("\"okex\"").unwrap());
        assert!(text.ends_with('\n'));
        assert!(text.contains("\n  \"binance\": ["));
    }

    #[test]
    fn test_overwrite_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/data"));

        store.write(EXCHANGE_PAIRS, &pairs()).unwrap();
        store.write(EXCHANGE_PAIRS, &BTreeMap::<String, Vec<Ticker>>::new()).unwrap();

        let read: BTreeMap<String, Vec<Ticker>> = store.read(EXCHANGE_PAIRS).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn test_last_updated_marker() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let now = DateTime::parse_from_rfc3339("2024-05-01T08:30:05Z").unwrap().with_timezone(&Utc);

        let mut marker = LastUpdated::at(now);
        marker.total_coins = 10;
        marker.total_arbitrage_opportunities = 4;
        store.write_last_updated(&marker).unwrap();

        let read = store.read_last_updated().unwrap();
        assert_eq!(read, marker);
        assert_eq!(read.formatted, "2024-05-01 08:30:05 UTC");

        let text = fs::read_to_string(store.path(LAST_UPDATED)).unwrap();
        assert!(text.contains("\"total_coins\": 10"));
        assert!(text.contains("\"total_news\": 0"));
    }

    #[test]
    fn test_missing_and_corrupt_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        assert!(!store.exists(COINS_MARKET));
        assert!(matches!(
            store.read::<Vec<Ticker>>(COINS_MARKET),
            Err(SnapshotError::Read { .. })
        ));

        fs::write(store.path(COINS_MARKET), "{not json").unwrap();
        assert!(matches!(
            store.read::<Vec<Ticker>>(COINS_MARKET),
            Err(SnapshotError::Serde { .. })
        ));
    }
}
