//! Ex-command history with Up/Down recall.
//!
//! The buffer is append-only and keeps insertion order; filtering blanks or
//! repeats is the caller's business. The cursor only exists during a recall
//! session and is re-clamped on every move because `clear_all` or a reload can
//! shrink the buffer underneath it.

use tracing::{debug, warn};

use crate::store::{get_as, set_as, KvStore};

pub const HISTORY_KEY: &str = "ex_history";
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

pub struct CommandHistory {
    entries: Vec<String>,
    cursor: Option<usize>,
    limit: usize,
    store: Box<dyn KvStore>,
}

impl CommandHistory {
    /// `limit == 0` keeps every entry.
    pub fn new(store: Box<dyn KvStore>, limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            limit,
            store,
        }
    }

    /// Load persisted entries. A missing or unreadable record is an empty
    /// history.
    pub fn initialize(&mut self) {
        self.entries = match get_as::<Vec<String>>(self.store.as_ref(), HISTORY_KEY) {
            Ok(Some(v)) => v,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(target: "exbar", "history load failed, starting empty: {}", e);
                Vec::new()
            }
        };
        self.trim_to_limit();
        self.cursor = None;
        debug!(target: "exbar", "history loaded: {} entries", self.entries.len());
    }

    pub fn add(&mut self, command: impl Into<String>) {
        self.entries.push(command.into());
        self.trim_to_limit();
        self.cursor = None;
        self.persist();
    }

    /// Step toward older entries; the first call of a session lands on the
    /// newest entry and the oldest entry is a floor.
    pub fn previous_entry(&mut self) -> &str {
        if self.entries.is_empty() {
            self.cursor = None;
            return "";
        }
        let last = self.entries.len() - 1;
        let idx = match self.cursor {
            None => last,
            Some(i) => i.min(last).saturating_sub(1),
        };
        self.cursor = Some(idx);
        &self.entries[idx]
    }

    /// Step toward newer entries. Moving past the newest entry ends the
    /// recall session and yields `""`; so does calling this outside one.
    pub fn next_entry(&mut self) -> &str {
        let Some(i) = self.cursor else {
            return "";
        };
        let next = i.saturating_add(1);
        if next >= self.entries.len() {
            self.cursor = None;
            return "";
        }
        self.cursor = Some(next);
        &self.entries[next]
    }

    pub fn exit_session(&mut self) {
        self.cursor = None;
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.cursor = None;
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            warn!(target: "exbar", "history clear not persisted: {}", e);
        }
    }

    pub fn is_recalling(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn trim_to_limit(&mut self) {
        if self.limit > 0 && self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
    }

    fn persist(&mut self) {
        if let Err(e) = set_as(self.store.as_mut(), HISTORY_KEY, &self.entries) {
            warn!(target: "exbar", "history not persisted: {}", e);
        }
    }
}
