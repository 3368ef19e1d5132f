//! Error types for the `vecdoc` crate.

use thiserror::Error;

/// Errors that can occur in document store operations.
///
/// Missing ids are never errors: CRUD reads return `Option`/`bool` as
/// documented on each operation. Hard errors are reserved for rejected
/// inputs and collaborator failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An embedding's length disagrees with the collection's locked dimension.
    ///
    /// Fatal to the single operation that produced it; nothing is written.
    #[error("dimension mismatch: collection is locked to {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the collection is locked to.
        expected: usize,
        /// The dimension of the rejected embedding.
        actual: usize,
    },

    /// A caller-supplied argument was rejected before any work was done.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The embedding provider failed.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The storage backend failed.
    #[error("storage backend error ({backend}): {message}")]
    Backend {
        /// The backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A chunked ingestion failed partway through.
    ///
    /// Chunks before `chunk` remain committed; `committed` counts the
    /// items they contained, so callers can resume from that offset.
    #[error("ingest failed at chunk {chunk} after {committed} committed items: {source}")]
    IngestFailed {
        /// Number of items in fully committed chunks.
        committed: usize,
        /// Zero-based index of the first failing chunk.
        chunk: usize,
        /// The underlying failure.
        #[source]
        source: Box<StoreError>,
    },

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A file I/O error during export or import.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialization error during export or import.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A CSV parsing error during ingestion.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// A convenience result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
