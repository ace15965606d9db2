//! Core domain library for AikiNote (models, list logic, sync, storage).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across AikiNote crates.
pub mod constants;
/// Database access layer for pages and tags.
pub mod db;
/// Trailing-edge debounce for rapidly-changing view inputs.
pub mod debounce;
/// Application error types (storage/domain/sync).
pub mod error;
/// Pure filtering over fetched training pages.
pub mod filter;
/// Modal/dialog open state for the page list view.
pub mod modal;
/// Data models for API requests, responses, and persistence.
pub mod models;
/// Incremental "load more" window over filtered results.
pub mod pagination;
/// Remote sync layer reconciling the in-memory page list with a backend.
pub mod sync;
/// View-side state owner for the training page list.
pub mod view;

pub use config::Config;
pub use constants::*;
pub use db::Database;
pub use error::{AppError, SyncError};
