//! Navigation history state keys.
//!
//! Every history entry carries a state key. Pushing creates a fresh key,
//! replacing keeps it, and travelling back or forward returns to the key the
//! entry was created with, so a revisited entry composes the same cache key.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Controller marker written into state records.
pub const STATE_CONTROLLER: &str = "vue-state-router";

/// State stored with a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Writer of this record.
    pub controller: String,

    /// Entry key.
    pub key: String,
}

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Entry key.
    pub key: String,

    /// URL of the entry.
    pub url: String,
}

/// Stack of history entries with a cursor.
#[derive(Debug)]
pub struct NavigationHistory {
    entries: Vec<HistoryEntry>,
    index: usize,
    // Microseconds of the last generated key
    last_stamp: i64,
}

impl NavigationHistory {
    /// Starts a history at `url` with a fresh key.
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_state(url, None)
    }

    /// Starts a history from a state record left by a previous session.
    ///
    /// The record's key is adopted only if our controller wrote it.
    pub fn from_state(url: impl Into<String>, state: Option<&StateRecord>) -> Self {
        let mut history = Self {
            entries: Vec::new(),
            index: 0,
            last_stamp: 0,
        };
        let key = match state {
            Some(record) if record.controller == STATE_CONTROLLER => record.key.clone(),
            _ => history.gen_key(),
        };
        history.entries.push(HistoryEntry {
            key,
            url: url.into(),
        });
        history
    }

    /// Adds an entry with a fresh key, dropping any forward entries.
    pub fn push(&mut self, url: impl Into<String>) -> &str {
        let key = self.gen_key();
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry {
            key,
            url: url.into(),
        });
        self.index = self.entries.len() - 1;
        tracing::trace!(key = %self.entries[self.index].key, "History push");
        &self.entries[self.index].key
    }

    /// Replaces the URL of the current entry, keeping its key.
    pub fn replace(&mut self, url: impl Into<String>) -> &str {
        let entry = &mut self.entries[self.index];
        entry.url = url.into();
        &entry.key
    }

    /// Moves the cursor by `delta`. Out-of-range moves are ignored.
    pub fn go(&mut self, delta: isize) -> Option<&HistoryEntry> {
        let target = self.index.checked_add_signed(delta)?;
        if target >= self.entries.len() {
            return None;
        }
        self.index = target;
        Some(&self.entries[target])
    }

    /// Moves one entry back.
    pub fn back(&mut self) -> Option<&HistoryEntry> {
        self.go(-1)
    }

    /// Moves one entry forward.
    pub fn forward(&mut self) -> Option<&HistoryEntry> {
        self.go(1)
    }

    /// Current entry.
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    /// Key of the current entry.
    pub fn current_key(&self) -> &str {
        &self.current().key
    }

    /// State record for the current entry.
    pub fn state(&self) -> StateRecord {
        StateRecord {
            controller: STATE_CONTROLLER.to_string(),
            key: self.current_key().to_string(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least its initial entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Strictly increasing within a history.
    fn gen_key(&mut self) -> String {
        let stamp = Utc::now().timestamp_micros().max(self.last_stamp + 1);
        self.last_stamp = stamp;
        format_stamp(stamp)
    }
}

/// Formats a microsecond timestamp as milliseconds with three decimals.
fn format_stamp(micros: i64) -> String {
    format!("{}.{:03}", micros.div_euclid(1000), micros.rem_euclid(1000))
}
