//! Process-wide conversation store

use super::entry::{ConversationEntry, ConversationHistory};
use super::{DEFAULT_MAX_HISTORY, DEFAULT_RETENTION_HOURS};
use crate::config::MemoryConfig;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info};

/// Maps client identities to their capped, recent history
///
/// Every operation takes the single map-wide lock and releases it before
/// returning; nothing here is held across an `.await`.
#[derive(Debug)]
pub struct ConversationStore {
    histories: Mutex<HashMap<String, ConversationHistory>>,
    max_history: usize,
    retention: Duration,
}

impl ConversationStore {
    /// Create an empty store
    pub fn new(max_history: usize, retention: Duration) -> Self {
        Self {
            histories: Mutex::new(HashMap::new()),
            max_history: max_history.max(1),
            retention,
        }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        let retention = i64::try_from(config.retention_hours)
            .ok()
            .and_then(Duration::try_hours)
            .unwrap_or_else(|| Duration::hours(DEFAULT_RETENTION_HOURS));
        Self::new(config.max_history, retention)
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Snapshot of the client's history, creating an empty one if absent
    pub fn get_or_create(&self, client_id: &str) -> ConversationHistory {
        let mut histories = self.histories.lock();
        histories
            .entry(client_id.to_string())
            .or_insert_with(|| {
                debug!("New conversation for {}", client_id);
                ConversationHistory::new()
            })
            .clone()
    }

    /// Append an entry, dropping the oldest entries beyond the cap
    pub fn append(&self, client_id: &str, entry: ConversationEntry) {
        let mut histories = self.histories.lock();
        histories
            .entry(client_id.to_string())
            .or_default()
            .push(entry, self.max_history);
    }

    /// The last `n` entries for the client, oldest first
    pub fn recent(&self, client_id: &str, n: usize) -> Vec<ConversationEntry> {
        let histories = self.histories.lock();
        histories
            .get(client_id)
            .map(|history| history.recent(n).to_vec())
            .unwrap_or_default()
    }

    /// Forget every conversation idle for longer than the retention window
    ///
    /// Histories with no entries are kept. Returns how many were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut histories = self.histories.lock();
        let before = histories.len();
        let retention = self.retention;

        histories.retain(|_, history| match history.last() {
            Some(last) => now.signed_duration_since(last.timestamp) <= retention,
            None => true,
        });

        let removed = before - histories.len();
        info!(
            "Memory cleanup: {} active conversations ({} expired)",
            histories.len(),
            removed
        );
        removed
    }

    /// Number of tracked clients
    pub fn size(&self) -> usize {
        self.histories.lock().len()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_HISTORY,
            Duration::hours(DEFAULT_RETENTION_HOURS),
        )
    }
}
