//! Error types for the Lucerna library.
//!
//! All fallible operations in the crate return [`Result`], whose error type
//! is the [`LucernaError`] enum. The variants map onto the error taxonomy of
//! the engine: storage failures are fatal to the operation that hit them,
//! query parse errors are surfaced to the caller, and `NotFound` is
//! recoverable. Per-source ingestion failures are never propagated as batch
//! failures; they are collected into an [`crate::ingest::IngestReport`].

use std::io;

use thiserror::Error;

/// The main error type for Lucerna operations.
#[derive(Error, Debug)]
pub enum LucernaError {
    /// I/O errors from the underlying storage.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index-related errors (corrupt segment files, commit failures, etc.)
    #[error("Index error: {0}")]
    Index(String),

    /// Storage-related errors (missing files, lock contention, etc.)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed query strings.
    #[error("Query parse error: {0}")]
    QueryParse(String),

    /// A document or field that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// A single document source that could not be read or decoded during
    /// batch ingestion. Recorded in the ingestion report, never fatal to
    /// the batch.
    #[error("Ingestion error: {0}")]
    Ingest(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error.
    #[error("Error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`LucernaError`].
pub type Result<T> = std::result::Result<T, LucernaError>;

impl LucernaError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        LucernaError::Index(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        LucernaError::Storage(msg.into())
    }

    /// Create a new query parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        LucernaError::QueryParse(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        LucernaError::NotFound(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        LucernaError::Analysis(msg.into())
    }

    /// Create a new ingestion error.
    pub fn ingest<S: Into<String>>(msg: S) -> Self {
        LucernaError::Ingest(msg.into())
    }
}
