//! Error type shared by the sort entry points and duplicate handlers.

use thiserror::Error;

/// Failures a multi-key sort can surface.
///
/// The partitioner itself only ever produces [`SortError::Cancelled`]; the other
/// variants are raised by [`DuplicateHandler`](crate::dup::DuplicateHandler)
/// implementations and passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// An [`Interrupt`](crate::cancel::Interrupt) was observed at a checkpoint.
    #[error("sort cancelled")]
    Cancelled,

    /// A group of rows tied on every key column while uniqueness was enforced.
    #[error("could not create unique index: {rows} rows share the same key")]
    UniqueViolation { rows: usize },

    /// A caller-provided duplicate handler failed.
    #[error("duplicate handler failed: {0}")]
    Handler(String),
}

pub type Result<T> = std::result::Result<T, SortError>;
