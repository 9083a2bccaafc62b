//! Short-state map for the OAuth authorization flow
//!
//! The vendor's authorization endpoint limits URL length, so the long OAuth
//! `state` is swapped for a short random token when the authorize URL is
//! generated. The callback swaps it back. Each entry is consumed exactly once.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Pending authorizations older than this are dropped on the next insert
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct PendingState {
    full_state: String,
    created_at: Instant,
}

/// Process-wide `short_state -> full_state` map
#[derive(Debug)]
pub struct StateMap {
    entries: Mutex<HashMap<String, PendingState>>,
    ttl: Duration,
}

impl Default for StateMap {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMap {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_STATE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Store `full_state` and return the short token that stands in for it
    pub fn insert(&self, full_state: impl Into<String>) -> String {
        let short = Uuid::new_v4().simple().to_string();
        let now = Instant::now();

        let mut entries = self.entries.lock();
        let ttl = self.ttl;
        entries.retain(|_, pending| now.duration_since(pending.created_at) < ttl);
        entries.insert(
            short.clone(),
            PendingState {
                full_state: full_state.into(),
                created_at: now,
            },
        );
        debug!(pending = entries.len(), "Registered OAuth state");

        short
    }

    /// Remove and return the full state for `short`
    ///
    /// Returns `None` for unknown tokens without touching other entries.
    pub fn take(&self, short: &str) -> Option<String> {
        self.entries
            .lock()
            .remove(short)
            .map(|pending| pending.full_state)
    }

    pub fn contains(&self, short: &str) -> bool {
        self.entries.lock().contains_key(short)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every pending entry (integration unload)
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
