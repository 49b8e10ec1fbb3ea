//! # ecomdb - E-commerce CSV ingestion and order reconciliation
//!
//! Loads customer, product, order, order item and payment exports into a
//! SQLite store, then runs fixed join reports over them.
//!
//! ecomdb provides:
//! - A fixed five-table schema with declared foreign keys
//! - Field-name based type coercion with configurable fallbacks
//! - Per-file or all-or-nothing transactional bulk loading
//! - A detail join report and an order-total reconciliation report

pub mod config;
pub mod ingest;
pub mod output;
pub mod report;
pub mod storage;
pub mod ui;

use std::path::PathBuf;

// Re-exports for convenient access
pub use config::Config;
pub use ingest::{CoercionPolicy, Fallback, LoadStats};
pub use report::{ReportKind, ReportSet};
pub use storage::SqliteStore;

/// Result type alias for ecomdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ecomdb operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing file: {} (source for table {table})", path.display())]
    MissingInputFile { table: String, path: PathBuf },

    #[error("Missing database: {}", .0.display())]
    MissingStore(PathBuf),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Source file has no header row: {}", .0.display())]
    EmptySource(PathBuf),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
