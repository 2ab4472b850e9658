//! Caller-owned action history
//!
//! Rolling record of recent action ids for the repeat and variety factors.
//! The engine only reads it; the caller records each action after the
//! progression call and persists it with the rest of the session.

use serde::{Deserialize, Serialize};

/// Default size of the rolling window
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Recent action ids, oldest first, plus the current same-action streak
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionHistory {
    window: usize,
    recent: Vec<String>,
    streak: u32,
}

impl Default for ActionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl ActionHistory {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            recent: Vec::with_capacity(window.max(1)),
            streak: 0,
        }
    }

    /// Recent ids, oldest first
    pub fn recent(&self) -> &[String] {
        &self.recent
    }

    pub fn last(&self) -> Option<&str> {
        self.recent.last().map(String::as_str)
    }

    /// How many times `id` was used back-to-back right before now
    pub fn n_same_for(&self, id: &str) -> u32 {
        if self.last() == Some(id) {
            self.streak
        } else {
            0
        }
    }

    /// Record that `id` was just used
    pub fn record(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.last() == Some(id.as_str()) {
            self.streak = self.streak.saturating_add(1);
        } else {
            self.streak = 1;
        }
        if self.recent.len() == self.window {
            self.recent.remove(0);
        }
        self.recent.push(id);
    }

    pub fn clear(&mut self) {
        self.recent.clear();
        self.streak = 0;
    }
}
