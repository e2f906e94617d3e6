//! Clinical note domain model.
//!
//! # Responsibility
//! - Define the per-patient note record and its update lifecycle.
//!
//! # Invariants
//! - `code` is assigned once by the owning note store and never changes.
//! - `update_text` always refreshes the timestamp together with the text.
//! - Equality ignores the timestamp on purpose: two notes with the same
//!   code and text compare equal even when written at different instants.

use std::time::{SystemTime, UNIX_EPOCH};

/// A free-text note attached to one patient's record.
#[derive(Debug, Clone)]
pub struct Note {
    /// Positive identifier, unique within the owning patient.
    pub code: u64,
    /// Free-form note body.
    pub text: String,
    /// Creation or last-edit instant, in epoch milliseconds.
    pub timestamp: i64,
}

impl Note {
    /// Creates a note stamped with the current instant.
    pub(crate) fn new(code: u64, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
            timestamp: now_epoch_ms(),
        }
    }

    /// Rebuilds a note from persisted fields, timestamp included.
    pub(crate) fn from_parts(code: u64, text: String, timestamp: i64) -> Self {
        Self {
            code,
            text,
            timestamp,
        }
    }

    /// Replaces the note body and refreshes the timestamp.
    pub(crate) fn update_text(&mut self, new_text: impl Into<String>) {
        self.text = new_text.into();
        self.timestamp = now_epoch_ms();
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.text == other.text
    }
}

impl Eq for Note {}

/// Current wall-clock instant in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
