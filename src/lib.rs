//! # Mksort
//!
//! `mksort` orders row handles by a composite key (several key columns compared
//! lexicographically) using **multi-key quicksort**, the three-way radix quicksort of
//! Bentley & Sedgewick generalized from string characters to key columns.
//!
//! Rather than comparing whole composite keys on every move, the sorter partitions a
//! range on one key column at a time. Rows tied on that column are partitioned again on
//! the next column, so a column is only ever compared among rows that are equal on all
//! previous ones.
//!
//! ## Key Features
//!
//! - **Zero-Copy Rows**: The sorter permutes a slice of opaque handles (usually `usize`
//!   indices). Key values are read through the [`RowAccessor`] trait and never copied.
//! - **SQL Ordering Semantics**: Every key column carries its own [`Direction`] and
//!   [`NullsOrder`] via [`SortKey`].
//! - **Duplicate Handling**: Groups of rows tied on every key are handed to a
//!   [`DuplicateHandler`] exactly once, with a flag telling whether the key contained a
//!   null. [`EnforceUnique`] and [`TieBreak`] cover unique index builds and
//!   reproducible output.
//! - **Cooperative Cancellation**: Long sorts poll an [`Interrupt`] and return
//!   [`SortError::Cancelled`] while keeping the slice a valid permutation.
//! - **Bounded Stack**: Partitioning runs off an explicit work list instead of recursion.
//!
//! ## Usage
//!
//! ```rust
//! use mksort::prelude::*;
//!
//! // (department, salary); handles are row indices.
//! let table = vec![
//!     vec![Some(2), Some(300)],
//!     vec![Some(1), None],
//!     vec![Some(1), Some(500)],
//! ];
//! let keys = [SortKey::asc(), SortKey::desc()];
//!
//! let mut rows = vec![0usize, 1, 2];
//! mksort(&mut rows, &table, &keys);
//!
//! // Descending keys put nulls first by default.
//! assert_eq!(rows, vec![1, 2, 0]);
//! ```
//!
//! ### Uniqueness Checks
//!
//! ```rust
//! use mksort::prelude::*;
//!
//! let table = vec![vec![Some(7)], vec![Some(3)], vec![Some(7)]];
//! let keys = [SortKey::asc()];
//! let mut rows = vec![0usize, 1, 2];
//! let mut unique = EnforceUnique::new();
//!
//! let err = MultiKeySort::new(&table, &keys)
//!     .on_duplicates(&mut unique)
//!     .sort(&mut rows)
//!     .unwrap_err();
//!
//! assert_eq!(err, SortError::UniqueViolation { rows: 2 });
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Expected**: O(N log N) key comparisons per depth, with pivots drawn from a
//!   generator seeded once per sort call.
//! - **Worst Case**: O(N²) per depth under adversarial pivot choices.
//! - **Memory Overhead**: The work list only; rows are swapped in place.
//!
//! Enable the `verify` feature to re-check the ordering of every partitioned range.

pub mod algo;
pub mod cancel;
pub mod core;
pub mod datum;
pub mod dup;
pub mod error;
pub mod strategy;

pub use crate::algo::{MultiKeySort, mksort, mksort_indices};
pub use crate::cancel::{CancellationToken, Interrupt};
pub use crate::core::{
    Direction, KeyColumns, KeySpecs, NullsOrder, RowAccessor, SortKey, compare_rows,
};
pub use crate::datum::Datum;
pub use crate::dup::{DuplicateHandler, EnforceUnique, TieBreak};
pub use crate::error::{Result, SortError};
pub use crate::strategy::{SortConfig, SortStrategy, sort_rows};

pub mod prelude {
    pub use crate::algo::{MultiKeySort, mksort, mksort_indices};
    pub use crate::cancel::{CancellationToken, Interrupt};
    pub use crate::core::{Direction, KeyColumns, KeySpecs, NullsOrder, RowAccessor, SortKey};
    pub use crate::datum::Datum;
    pub use crate::dup::{DuplicateHandler, EnforceUnique, TieBreak};
    pub use crate::error::SortError;
    pub use crate::strategy::{SortConfig, SortStrategy, sort_rows};
}
