//! Maintboard - maintenance and asset-integrity dashboard data library.
//!
//! This library provides the core functionality for the `mb` CLI tool:
//! loading maintenance records from a spreadsheet, deriving normalized fields,
//! aggregating dashboard statistics and filtering by named predicates.

pub mod cli;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod derive;
pub mod filter;
pub mod form;
pub mod logging;
pub mod models;
pub mod source;
pub mod stats;


/// Library-level error type for Maintboard operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Source is unreadable: {path}: {reason}")]
    SourceCorrupt { path: String, reason: String },

    #[error("Unsupported source format: {0}")]
    UnsupportedSource(String),

    #[error("Unknown filter: {0} (expected one of: {expected})", expected = crate::filter::Predicate::names().join(", "))]
    UnknownPredicate(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Maintboard operations.
pub type Result<T> = std::result::Result<T, Error>;
