//! Error types for slotfile
//!
//! Provides a unified error type for all operations.
//!
//! Absence is not an error: lookups return `Ok(None)` and mutations on a
//! missing identifier return `Ok(false)`. Everything in this enum is a
//! fault that aborts the current operation.

use thiserror::Error;

/// Result type alias using SlotError
pub type Result<T> = std::result::Result<T, SlotError>;

/// Unified error type for slotfile operations
#[derive(Debug, Error)]
pub enum SlotError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // File Format Errors
    // -------------------------------------------------------------------------
    #[error("Corruption at offset {offset}: {reason}")]
    Corruption { offset: u64, reason: String },

    #[error("Identifier space exhausted")]
    IdExhausted,

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SlotError {
    /// Shorthand for building a corruption error
    pub(crate) fn corruption(offset: u64, reason: impl Into<String>) -> Self {
        SlotError::Corruption {
            offset,
            reason: reason.into(),
        }
    }
}

impl From<bincode::Error> for SlotError {
    fn from(e: bincode::Error) -> Self {
        SlotError::Serialization(e.to_string())
    }
}
