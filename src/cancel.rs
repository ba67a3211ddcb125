//! Cooperative cancellation.
//!
//! The sorter polls an [`Interrupt`] at the start of every partition step and on
//! every scan step. Once it reports `true` the sort unwinds through ordinary
//! `Result` propagation with [`SortError::Cancelled`]; the row array is left as a
//! permutation of its input.

use crate::error::{Result, SortError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A source of cancellation requests.
pub trait Interrupt {
    /// Returns `true` once the running sort should stop.
    fn is_interrupted(&self) -> bool;

    /// Checkpoint form of [`is_interrupted`](Interrupt::is_interrupted).
    #[inline(always)]
    fn checkpoint(&self) -> Result<()> {
        if self.is_interrupted() {
            return Err(SortError::Cancelled);
        }
        Ok(())
    }
}

/// Cloneable cancellation flag.
///
/// Clones share one flag, so a token handed to another thread can stop a sort
/// running on this one.
///
/// ```
/// use mksort::cancel::{CancellationToken, Interrupt};
///
/// let token = CancellationToken::new();
/// let remote = token.clone();
/// assert!(token.checkpoint().is_ok());
///
/// remote.cancel();
/// assert!(token.checkpoint().is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Interrupt for CancellationToken {
    #[inline(always)]
    fn is_interrupted(&self) -> bool {
        self.is_cancelled()
    }
}

impl Interrupt for AtomicBool {
    #[inline(always)]
    fn is_interrupted(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<F: Fn() -> bool> Interrupt for F {
    #[inline(always)]
    fn is_interrupted(&self) -> bool {
        self()
    }
}
