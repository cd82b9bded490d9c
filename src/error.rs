//! Error types for pagehive
//!
//! This module defines the error hierarchy for the scheduler core. Fetch
//! and parse failures never abort a run: they are attached to the
//! `PagingState`s of the batch that raised them and travel out through the
//! output stream like any other terminal state.

use thiserror::Error;

/// The result type used throughout pagehive.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for pagehive.
///
/// Cloneable because a single fetch or parse failure is attached to every
/// member of the batch that raised it.
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ============================================================================
    // Fetch errors
    // ============================================================================
    /// The fetch function raised while servicing a batch.
    #[error("fetch failed: {message}")]
    FetchFailure {
        /// Description of what went wrong, taken from the caller's error.
        message: String,
    },

    // ============================================================================
    // Parse errors
    // ============================================================================
    /// The result parser raised while processing a batch's response.
    #[error("parse failed: {message}")]
    ParseFailure {
        /// Description of what went wrong, taken from the caller's error.
        message: String,
    },

    /// A single-state parser (built with `result_parser1`) was applied to a
    /// batch that didn't contain exactly one state.
    #[error("result_parser1 applied to a batch of {size} states, expected exactly 1")]
    InvalidBatchSize {
        /// The batch size actually observed.
        size: usize,
    },

    // ============================================================================
    // Dispatch errors
    // ============================================================================
    /// The registry-based default fetch_fn found no handler for an entity type.
    #[error("no handler registered for entity type '{entity_type}'")]
    UnknownDispatch {
        /// The entity type that had no registered handler.
        entity_type: String,
    },

    // ============================================================================
    // Generic errors
    // ============================================================================
    /// Fallback for caller-supplied errors that don't fit a named variant.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a [`Error::FetchFailure`] from any displayable error.
    pub fn fetch_failure(message: impl Into<String>) -> Self {
        Self::FetchFailure { message: message.into() }
    }

    /// Build a [`Error::ParseFailure`] from any displayable error.
    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self::ParseFailure { message: message.into() }
    }

    /// Build a catch-all [`Error::Other`].
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}
