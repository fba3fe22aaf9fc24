//! File-backed persistence for price alerts

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::alerts::AlertBook;
use crate::shared::errors::SnapshotError;

pub struct AlertStore {
    path: PathBuf,
}

impl AlertStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty book
    pub fn load(&self) -> Result<AlertBook, SnapshotError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AlertBook::default()),
            Err(source) => {
                return Err(SnapshotError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| SnapshotError::Serde {
            name: self.path.display().to_string(),
            source,
        })
    }

    pub fn save(&self, book: &AlertBook) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SnapshotError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(book).map_err(|source| SnapshotError::Serde {
            name: self.path.display().to_string(),
            source,
        })?;

        fs::write(&self.path, json).map_err(|source| SnapshotError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!("💾 Saved {} alerts to {}", book.alerts().len(), self.path.display());
        Ok(())
    }
}
