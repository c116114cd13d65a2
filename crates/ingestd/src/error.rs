//! Ingestion error types.

use thiserror::Error;

use crate::codec::CodecError;

/// Errors that can occur while processing one inbound message.
///
/// These are per-message: they become a negative acknowledgement, never a
/// dropped connection.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The frame could not be decoded.
    #[error("invalid frame: {0}")]
    Codec(#[from] CodecError),

    /// The decoded frame could not be persisted.
    #[error("storage failure: {0}")]
    Database(#[from] database::DatabaseError),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
