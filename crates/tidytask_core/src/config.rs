//! Startup configuration.
//!
//! # Responsibility
//! - Gather the store location and display constants into one immutable
//!   value built at startup and passed by reference.
//!
//! # Invariants
//! - Configuration is read-only after construction; components receive it
//!   as a parameter, never through ambient lookup.

use serde::Deserialize;
use std::path::PathBuf;

/// Backing medium for the task store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum StoreLocation {
    /// Durable database file at the given path.
    File(PathBuf),
    /// Private in-memory database; state is lost on close.
    Memory,
}

/// Immutable application configuration.
///
/// The service consumes `input_placeholder` for input filtering; the
/// remaining fields are display constants read by the visual layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreLocation,
    pub app_title: String,
    pub window_size: String,
    pub input_placeholder: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreLocation::File(PathBuf::from("data/tasks.sqlite3")),
            app_title: "Enhanced Todo List".to_string(),
            window_size: "300x400".to_string(),
            input_placeholder: "Add a new task...".to_string(),
        }
    }
}

impl AppConfig {
    /// Builds the default configuration over a caller-chosen store location.
    pub fn with_store(store: StoreLocation) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }
}
