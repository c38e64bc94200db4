//! Error types for the shmbus library.
//!
//! Explicit enum error types only - no `Box<dyn Error>`, no `anyhow`.
//! Failures to create or map a segment never show up here: a process
//! without its transport has nothing useful to continue with, so those
//! paths log a diagnostic and terminate (see [`crate::segment`]).

use thiserror::Error;

/// Errors surfaced to callers of the bus library.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("Invalid segment key: {key} - {reason}")]
    InvalidKey { key: i32, reason: String },

    #[error("Metadata rejected for segment {key}: existing segment failed the sanity check")]
    MetadataRejected { key: i32 },

    #[error("Failed to remove segment {key}: {reason}")]
    RemoveFailed { key: i32, reason: String },
}

/// Result type alias using BusError.
pub type BusResult<T> = Result<T, BusError>;
