//! Persisted last values for restorable sensors
//!
//! A small JSON document keyed by entity unique id. Written after every
//! successful refresh and read once at startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Restore store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Restore store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Serialize, Deserialize)]
struct StoredStates {
    saved_at: DateTime<Utc>,
    #[serde(default)]
    values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone)]
pub struct RestoreStore {
    path: PathBuf,
}

impl RestoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored values; an absent file yields an empty map
    pub async fn load(&self) -> StoreResult<BTreeMap<String, f64>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredStates = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), count = stored.values.len(), "Loaded restore state");
        Ok(stored.values)
    }

    /// Replace the stored values
    ///
    /// Writes to a sibling temp file first so a crash never leaves a
    /// truncated document behind.
    pub async fn save(&self, values: &BTreeMap<String, f64>) -> StoreResult<()> {
        let stored = StoredStates {
            saved_at: Utc::now(),
            values: values.clone(),
        };
        let content = serde_json::to_vec_pretty(&stored)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
