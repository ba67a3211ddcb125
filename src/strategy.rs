//! Choosing between multi-key and comparison sorting.
//!
//! Multi-key sorting pays off when there is more than one key column: rows are
//! only compared on the column that can still tell them apart. With a single key
//! it degenerates into a plain three-way quicksort, so the comparison sort is used.
//! Both strategies give the same observable result, including duplicate handling.

use crate::algo::MultiKeySort;
use crate::cancel::{CancellationToken, Interrupt};
use crate::core::{KeySpecs, RowAccessor, compare_rows};
use crate::dup::DuplicateHandler;
use crate::error::Result;
use tracing::debug;

/// Sorting algorithm used for a composite key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortStrategy {
    /// Depth-wise randomized three-way partitioning.
    MultiKey,
    /// `sort_unstable_by` on the full composite comparator.
    Comparison,
}

/// Sort settings supplied by the caller.
#[derive(Clone, Debug)]
pub struct SortConfig {
    /// Allows the multi-key strategy for composite keys.
    pub multikey_enabled: bool,
    /// Fixed pivot seed; `None` draws a fresh seed per sort.
    pub seed: Option<u64>,
    /// Cancellation token polled while sorting.
    pub cancel: Option<CancellationToken>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            multikey_enabled: true,
            seed: None,
            cancel: None,
        }
    }
}

impl SortStrategy {
    pub fn choose(key_count: usize, config: &SortConfig) -> Self {
        if config.multikey_enabled && key_count > 1 {
            SortStrategy::MultiKey
        } else {
            SortStrategy::Comparison
        }
    }
}

/// Sorts `rows` with the strategy selected by `config` and returns that strategy.
///
/// The duplicate handler, if any, sees every maximal group of rows tied on all keys
/// exactly once, whichever strategy runs.
///
/// # Arguments
///
/// * `rows` - Row handles, permuted in place.
/// * `accessor` - Reads the key value of a row at each depth.
/// * `keys` - One [`SortKey`](crate::core::SortKey) per key column.
/// * `config` - Strategy switch, pivot seed and cancellation token.
/// * `duplicates` - Receives each group of rows tied on every key.
///
/// # Returns
///
/// The strategy that ran, or the first error raised by the handler or the token.
///
/// # Panics
///
/// Panics if `keys` is empty.
pub fn sort_rows<R, A, K>(
    rows: &mut [R],
    accessor: &A,
    keys: &K,
    config: &SortConfig,
    duplicates: Option<&mut dyn DuplicateHandler<R>>,
) -> Result<SortStrategy>
where
    A: RowAccessor<R> + ?Sized,
    K: KeySpecs<A::Value> + ?Sized,
{
    let key_count = keys.key_count();
    assert!(key_count > 0, "sort requires at least one key column");

    let strategy = SortStrategy::choose(key_count, config);
    debug!(?strategy, rows = rows.len(), keys = key_count, "sorting rows");

    match strategy {
        SortStrategy::MultiKey => {
            let mut sort = MultiKeySort::new(accessor, keys);
            if let Some(seed) = config.seed {
                sort = sort.seed(seed);
            }
            if let Some(handler) = duplicates {
                sort = sort.on_duplicates(handler);
            }
            if let Some(token) = &config.cancel {
                sort = sort.interruptible(token);
            }
            sort.sort(rows)?;
        }
        SortStrategy::Comparison => {
            if let Some(token) = &config.cancel {
                token.checkpoint()?;
            }
            rows.sort_unstable_by(|a, b| compare_rows(accessor, keys, a, b, 0));
            if let Some(token) = &config.cancel {
                token.checkpoint()?;
            }

            if let Some(handler) = duplicates {
                let tied = |a: &R, b: &R| compare_rows(accessor, keys, a, b, 0).is_eq();
                for group in rows.chunk_by_mut(tied) {
                    if group.len() > 1 {
                        // Tied rows agree on nullness at every depth.
                        let seen_null =
                            (0..key_count).any(|depth| accessor.value(&group[0], depth).is_none());
                        handler.handle(group, seen_null)?;
                    }
                }
            }
        }
    }

    Ok(strategy)
}
