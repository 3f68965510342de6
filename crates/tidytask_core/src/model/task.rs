//! Task domain model.
//!
//! # Responsibility
//! - Define the single to-do record shared by the store and the display list.
//! - Own the completion toggle rule.
//!
//! # Invariants
//! - `status` is `Done` if and only if `done` is `true`.
//! - `text` and `date` never change after construction.
//! - `id` is `None` until the store assigns one, then stays fixed.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp layout used for `Task::date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Display label derived from the completion flag.
///
/// Serialized labels match the store's text column exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Created and not yet completed.
    New,
    /// Completed.
    Done,
}

impl TaskStatus {
    /// Derives the label from the authoritative completion flag.
    pub fn from_done(done: bool) -> Self {
        if done {
            Self::Done
        } else {
            Self::New
        }
    }

    /// Returns the persisted text label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Done => "Done",
        }
    }

    /// Parses a persisted text label.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "New" => Some(Self::New),
            "Done" => Some(Self::Done),
            _ => None,
        }
    }
}

/// One to-do item.
///
/// `done` is the authoritative completion state; `status` is a projection
/// kept in lockstep by [`Task::toggle_done`]. Callers must not mutate the
/// two fields independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned row id; `None` until the first successful insert.
    pub id: Option<i64>,
    /// User-supplied description. Non-empty; immutable after creation.
    pub text: String,
    /// Display label projected from `done`.
    pub status: TaskStatus,
    /// Authoritative completion flag.
    pub done: bool,
    /// Creation timestamp, `YYYY-MM-DD HH:MM:SS`, fixed at construction.
    pub date: String,
}

impl Task {
    /// Creates a new unpersisted task stamped with the current local time.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_date(text, Local::now().format(DATE_FORMAT).to_string())
    }

    /// Creates a new unpersisted task with a caller-supplied timestamp.
    pub fn with_date(text: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            status: TaskStatus::New,
            done: false,
            date: date.into(),
        }
    }

    /// Rebuilds a task from persisted fields. Store hydration only.
    pub fn from_parts(
        id: i64,
        text: impl Into<String>,
        status: TaskStatus,
        done: bool,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id),
            text: text.into(),
            status,
            done,
            date: date.into(),
        }
    }

    /// Flips the completion flag and re-derives the status label.
    ///
    /// Pure in-memory mutation; callers own propagating the new state to
    /// the store and reverting the flip when that write fails.
    pub fn toggle_done(&mut self) {
        self.done = !self.done;
        self.status = TaskStatus::from_done(self.done);
    }
}
