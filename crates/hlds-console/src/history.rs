//! Command history with up/down navigation.
//!
//! Navigation starts from the text currently in the input field (the draft).
//! Walking back down past the newest entry restores that draft.

use std::collections::VecDeque;

/// Bounded list of submitted commands, oldest first
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    capacity: usize,
    /// `None` while the input shows the draft
    cursor: Option<usize>,
    saved_draft: String,
}

impl CommandHistory {
    /// Create an empty history holding at most `capacity` commands (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            cursor: None,
            saved_draft: String::new(),
        }
    }

    /// Record a submitted command.
    ///
    /// Empty input is ignored. A repeat of the newest entry is not stored
    /// twice. Any non-empty submit resets navigation to the draft.
    pub fn submit(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        if self.entries.back().map(String::as_str) != Some(text) {
            if self.entries.len() == self.capacity {
                self.entries.pop_front();
            }
            self.entries.push_back(text.to_string());
        }

        self.cursor = None;
        self.saved_draft.clear();
    }

    /// Step to an older entry.
    ///
    /// The first step saves `current_draft`. Stops at the oldest entry.
    /// Returns `None` on an empty history.
    pub fn navigate_up(&mut self, current_draft: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }

        let index = match self.cursor {
            None => {
                self.saved_draft = current_draft.to_string();
                self.entries.len() - 1
            }
            Some(index) => index.saturating_sub(1),
        };
        self.cursor = Some(index);
        self.entries.get(index).map(String::as_str)
    }

    /// Step to a newer entry, or back to the saved draft past the newest.
    ///
    /// Returns `None` when already at the draft or the history is empty.
    pub fn navigate_down(&mut self) -> Option<&str> {
        let index = self.cursor?;

        if index + 1 >= self.entries.len() {
            self.cursor = None;
            return Some(self.saved_draft.as_str());
        }

        self.cursor = Some(index + 1);
        self.entries.get(index + 1).map(String::as_str)
    }

    /// Current navigation position; `None` at the draft
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
