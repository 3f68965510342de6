//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into user-intent level APIs.
//! - Keep the in-memory display list consistent with the store.

pub mod task_service;
