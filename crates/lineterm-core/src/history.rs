//! Command history with up/down recall.
//!
//! The buffer records every submitted line, in order, with no size limit and
//! no de-duplication. A cursor tracks the recall position: `len()` means
//! "past the end" (nothing recalled, fresh input line).

use std::sync::Arc;

/// Chronological log of submitted lines plus a recall cursor.
///
/// Cloning is O(1); the entries are shared until the next push.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryBuffer {
    entries: Arc<Vec<String>>,
    cursor: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor, always within `0..=len()`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the cursor is past the end (no recall active).
    pub fn at_end(&self) -> bool {
        self.cursor == self.entries.len()
    }

    /// Append a line and reset the cursor to past-the-end.
    pub fn push(&mut self, line: impl Into<String>) {
        Arc::make_mut(&mut self.entries).push(line.into());
        self.cursor = self.entries.len();
    }

    /// Move towards older entries (up arrow).
    ///
    /// Clamps at the oldest entry. On an empty buffer returns `""` and
    /// leaves the cursor alone.
    pub fn recall_previous(&mut self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        self.cursor = self.cursor.saturating_sub(1);
        self.entries[self.cursor].clone()
    }

    /// Move towards newer entries (down arrow).
    ///
    /// Clamps at past-the-end, where the result is `""`.
    pub fn recall_next(&mut self) -> String {
        self.cursor = (self.cursor + 1).min(self.entries.len());
        self.entries.get(self.cursor).cloned().unwrap_or_default()
    }
}
