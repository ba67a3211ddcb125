//! Multi-key quicksort (Bentley & Sedgewick, "Fast Algorithms for Sorting and
//! Searching Strings", 1997) over row handles.
//!
//! Instead of comparing complete composite keys, each partitioning step looks at a
//! single key column ("depth"):
//! - **Partitioner**: Randomized three-way split of a range around a pivot value.
//! - **Depth Recurser**: Rows tied with the pivot are partitioned again one depth
//!   deeper, or handed to the duplicate handler when the last key is exhausted.
//!
//! Recursion is driven by an explicit work list, so stack usage does not depend on
//! input skew or key count.
//!
//! The main entry points are [`MultiKeySort`], [`mksort`] and [`mksort_indices`].

use crate::cancel::Interrupt;
use crate::core::{KeySpecs, RowAccessor};
use crate::dup::DuplicateHandler;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use tracing::{debug, debug_span, trace};

/// Pending unit of work. Frames are popped in LIFO order, so pushing
/// `greater, tied, less` processes the zones left to right.
#[derive(Debug)]
enum Frame {
    Partition {
        start: usize,
        len: usize,
        depth: usize,
        seen_null: bool,
    },
    Duplicates {
        start: usize,
        len: usize,
        seen_null: bool,
    },
    #[cfg(any(test, feature = "verify"))]
    Verify {
        start: usize,
        len: usize,
        depth: usize,
    },
}

/// Configures and runs a multi-key sort.
///
/// # Examples
///
/// ```
/// use mksort::prelude::*;
///
/// let table = vec![
///     vec![Some(Datum::from(1)), Some(Datum::from("b"))],
///     vec![Some(Datum::from(1)), Some(Datum::from("a"))],
///     vec![Some(Datum::from(2)), Some(Datum::from("a"))],
/// ];
/// let keys = [SortKey::asc(), SortKey::asc()];
/// let mut rows: Vec<usize> = vec![0, 1, 2];
///
/// MultiKeySort::new(&table, &keys).seed(7).sort(&mut rows).unwrap();
///
/// assert_eq!(rows, vec![1, 0, 2]);
/// ```
pub struct MultiKeySort<'a, R, A: ?Sized, K: ?Sized> {
    accessor: &'a A,
    keys: &'a K,
    duplicates: Option<&'a mut dyn DuplicateHandler<R>>,
    interrupt: Option<&'a dyn Interrupt>,
    seed: Option<u64>,
    start_depth: usize,
    seen_null: bool,
}

impl<'a, R, A, K> MultiKeySort<'a, R, A, K>
where
    A: RowAccessor<R> + ?Sized,
    K: KeySpecs<A::Value> + ?Sized,
{
    pub fn new(accessor: &'a A, keys: &'a K) -> Self {
        Self {
            accessor,
            keys,
            duplicates: None,
            interrupt: None,
            seed: None,
            start_depth: 0,
            seen_null: false,
        }
    }

    /// First key depth to consider. Rows must already be tied on every earlier depth.
    pub fn start_depth(mut self, depth: usize) -> Self {
        self.start_depth = depth;
        self
    }

    /// Whether a null was already observed on the depths before `start_depth`.
    pub fn seen_null(mut self, seen_null: bool) -> Self {
        self.seen_null = seen_null;
        self
    }

    /// Handler invoked once per maximal group of rows tied on every key.
    pub fn on_duplicates(mut self, handler: &'a mut dyn DuplicateHandler<R>) -> Self {
        self.duplicates = Some(handler);
        self
    }

    /// Cancellation source polled during the sort.
    pub fn interruptible(mut self, interrupt: &'a dyn Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Fixes the pivot RNG seed. By default each sort call draws a fresh seed once.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reorders `rows` in place.
    ///
    /// On error the slice is still a permutation of its input, but not ordered.
    ///
    /// # Panics
    ///
    /// Panics if the start depth exceeds the number of keys.
    pub fn sort(self, rows: &mut [R]) -> Result<()> {
        let key_count = self.keys.key_count();
        assert!(
            self.start_depth <= key_count,
            "start depth {} exceeds key count {}",
            self.start_depth,
            key_count
        );

        let _span = debug_span!(
            "mksort",
            rows = rows.len(),
            keys = key_count,
            start_depth = self.start_depth
        )
        .entered();

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut sorter = Sorter {
            accessor: self.accessor,
            keys: self.keys,
            key_count,
            duplicates: self.duplicates,
            interrupt: self.interrupt,
            rng,
            frames: Vec::new(),
        };
        sorter.frames.push(Frame::Partition {
            start: 0,
            len: rows.len(),
            depth: self.start_depth,
            seen_null: self.seen_null,
        });

        let result = sorter.run(rows);
        if let Err(err) = &result {
            debug!(%err, "multi-key sort aborted");
        }
        result
    }
}

/// Sorts `rows` by the composite key described by `keys`.
///
/// Shorthand for [`MultiKeySort`] without duplicate handling or cancellation.
///
/// # Arguments
///
/// * `rows` - Row handles, permuted in place.
/// * `accessor` - Reads the key value of a row at each depth.
/// * `keys` - One [`SortKey`](crate::core::SortKey) per key column.
///
/// # Examples
///
/// ```
/// use mksort::prelude::*;
///
/// let table = vec![vec![Some(1), Some(9)], vec![Some(1), Some(2)], vec![Some(0), None]];
/// let mut rows = vec![0usize, 1, 2];
/// mksort(&mut rows, &table, &[SortKey::asc(), SortKey::asc()]);
///
/// assert_eq!(rows, vec![2, 1, 0]);
/// ```
pub fn mksort<R, A, K>(rows: &mut [R], accessor: &A, keys: &K)
where
    A: RowAccessor<R> + ?Sized,
    K: KeySpecs<A::Value> + ?Sized,
{
    let result = MultiKeySort::new(accessor, keys).sort(rows);
    debug_assert!(result.is_ok(), "sort without hooks cannot fail");
}

/// Returns the row indices `0..len` ordered by the composite key.
///
/// # Arguments
///
/// * `accessor` - Reads the key value of a row index at each depth.
/// * `keys` - One [`SortKey`](crate::core::SortKey) per key column.
/// * `len` - Number of rows `accessor` can serve.
///
/// # Returns
///
/// A vector of indices such that no row compares greater than the row after it.
///
/// # Examples
///
/// ```
/// use mksort::prelude::*;
///
/// let table = vec![vec![Some(3)], vec![None], vec![Some(1)]];
/// let indices = mksort_indices(&table, &[SortKey::asc()], table.len());
///
/// assert_eq!(indices, vec![2, 0, 1]);
/// ```
pub fn mksort_indices<A, K>(accessor: &A, keys: &K, len: usize) -> Vec<usize>
where
    A: RowAccessor<usize> + ?Sized,
    K: KeySpecs<A::Value> + ?Sized,
{
    let mut indices: Vec<usize> = (0..len).collect();
    mksort(&mut indices, accessor, keys);
    indices
}

struct Sorter<'a, R, A: ?Sized, K: ?Sized> {
    accessor: &'a A,
    keys: &'a K,
    key_count: usize,
    duplicates: Option<&'a mut dyn DuplicateHandler<R>>,
    interrupt: Option<&'a dyn Interrupt>,
    rng: StdRng,
    frames: Vec<Frame>,
}

impl<'a, R, A, K> Sorter<'a, R, A, K>
where
    A: RowAccessor<R> + ?Sized,
    K: KeySpecs<A::Value> + ?Sized,
{
    fn run(&mut self, rows: &mut [R]) -> Result<()> {
        while let Some(frame) = self.frames.pop() {
            match frame {
                Frame::Partition {
                    start,
                    len,
                    depth,
                    seen_null,
                } => self.partition(&mut rows[start..start + len], start, depth, seen_null)?,
                Frame::Duplicates {
                    start,
                    len,
                    seen_null,
                } => {
                    if let Some(handler) = self.duplicates.as_deref_mut() {
                        trace!(start, rows = len, seen_null, "duplicate group");
                        handler.handle(&mut rows[start..start + len], seen_null)?;
                    }
                }
                #[cfg(any(test, feature = "verify"))]
                Frame::Verify { start, len, depth } => {
                    self.checkpoint()?;
                    verify_order(&rows[start..start + len], depth, self.accessor, self.keys);
                }
            }
        }
        Ok(())
    }

    #[inline(always)]
    fn checkpoint(&self) -> Result<()> {
        match self.interrupt {
            Some(interrupt) => interrupt.checkpoint(),
            None => Ok(()),
        }
    }

    /// Three-way partitions `x` (which starts at `start` in the full array) at `depth`.
    ///
    /// While scanning, `x` consists of five zones:
    /// `[0, less_start)` tied, `[less_start, less_end)` less,
    /// `[less_end, greater_start]` unprocessed, `(greater_start, greater_end]` greater,
    /// `(greater_end, n)` tied. Afterwards the tied blocks are swapped into the middle.
    fn partition(
        &mut self,
        x: &mut [R],
        start: usize,
        depth: usize,
        seen_null: bool,
    ) -> Result<()> {
        let n = x.len();
        if n <= 1 || depth == self.key_count {
            return Ok(());
        }

        self.checkpoint()?;

        let accessor = self.accessor;
        let keys = self.keys;

        let pivot_at = self.rng.random_range(0..n);
        x.swap(0, pivot_at);
        let pivot = accessor.value(&x[0], depth);

        let mut less_start = 1;
        let mut less_end = 1;
        let mut greater_start = n - 1;
        let mut greater_end = n - 1;

        loop {
            while less_end <= greater_start {
                self.checkpoint()?;
                match keys.compare(depth, accessor.value(&x[less_end], depth), pivot) {
                    Ordering::Greater => break,
                    Ordering::Equal => {
                        x.swap(less_end, less_start);
                        less_start += 1;
                    }
                    Ordering::Less => {}
                }
                less_end += 1;
            }

            while less_end <= greater_start {
                self.checkpoint()?;
                match keys.compare(depth, accessor.value(&x[greater_start], depth), pivot) {
                    Ordering::Less => break,
                    Ordering::Equal => {
                        x.swap(greater_start, greater_end);
                        greater_end -= 1;
                    }
                    Ordering::Greater => {}
                }
                greater_start -= 1;
            }

            if less_end > greater_start {
                break;
            }
            x.swap(less_end, greater_start);
            less_end += 1;
            greater_start -= 1;
        }

        // greater_start + 1 == less_end: tied, less, greater, tied.
        let dist = less_start.min(less_end - less_start);
        swap_blocks(x, 0, less_end - dist, dist);

        let dist = (greater_end - greater_start).min(n - greater_end - 1);
        swap_blocks(x, less_end, n - dist, dist);

        let less_len = less_end - less_start;
        let greater_len = greater_end - greater_start;
        let tied_len = n - less_len - greater_len;

        #[cfg(any(test, feature = "verify"))]
        self.frames.push(Frame::Verify {
            start,
            len: n,
            depth,
        });
        self.push_partition(start + n - greater_len, greater_len, depth, seen_null);
        self.descend(
            &x[less_len..less_len + tied_len],
            start + less_len,
            depth,
            seen_null,
        );
        self.push_partition(start, less_len, depth, seen_null);
        Ok(())
    }

    /// Schedules the zone tied with the pivot: one depth deeper, or to the
    /// duplicate handler once every key has been compared.
    fn descend(&mut self, tied: &[R], start: usize, depth: usize, seen_null: bool) {
        let len = tied.len();
        if len <= 1 {
            return;
        }

        // Every tied row has the same nullness at this depth.
        let seen_null = seen_null || self.accessor.value(&tied[0], depth).is_none();

        if depth + 1 < self.key_count {
            self.push_partition(start, len, depth + 1, seen_null);
        } else if self.duplicates.is_some() {
            self.frames.push(Frame::Duplicates {
                start,
                len,
                seen_null,
            });
        }
    }

    fn push_partition(&mut self, start: usize, len: usize, depth: usize, seen_null: bool) {
        if len > 1 {
            self.frames.push(Frame::Partition {
                start,
                len,
                depth,
                seen_null,
            });
        }
    }
}

/// Swaps `x[a..a + len]` with `x[b..b + len]`. The blocks must not overlap.
#[inline(always)]
fn swap_blocks<R>(x: &mut [R], a: usize, b: usize, len: usize) {
    debug_assert!(a + len <= b);
    let (left, right) = x.split_at_mut(b);
    left[a..a + len].swap_with_slice(&mut right[..len]);
}

/// Asserts that adjacent rows are non-decreasing at `depth`.
#[cfg(any(test, feature = "verify"))]
pub fn verify_order<R, A, K>(rows: &[R], depth: usize, accessor: &A, keys: &K)
where
    A: RowAccessor<R> + ?Sized,
    K: KeySpecs<A::Value> + ?Sized,
{
    rows.windows(2).enumerate().for_each(|(i, pair)| {
        let ord = keys.compare(
            depth,
            accessor.value(&pair[0], depth),
            accessor.value(&pair[1], depth),
        );
        assert!(
            ord.is_le(),
            "rows {} and {} out of order at depth {}",
            i,
            i + 1,
            depth
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NullsOrder, SortKey, compare_rows};
    use crate::error::SortError;

    #[test]
    fn test_swap_blocks() {
        let mut x = vec![1, 2, 3, 4, 5, 6];
        swap_blocks(&mut x, 0, 4, 2);
        assert_eq!(x, vec![5, 6, 3, 4, 1, 2]);

        swap_blocks(&mut x, 2, 6, 0);
        assert_eq!(x, vec![5, 6, 3, 4, 1, 2]);
    }

    #[test]
    fn test_partition_zones_every_pivot() {
        // Sorting a single depth exercises every pivot position across seeds.
        for seed in 0..64 {
            let table: Vec<Vec<Option<u8>>> = [3, 1, 3, 2, 3, 0, 4, 3, 1]
                .iter()
                .map(|&v| vec![Some(v)])
                .collect();
            let mut rows: Vec<usize> = (0..table.len()).collect();
            MultiKeySort::new(&table, &[SortKey::asc()])
                .seed(seed)
                .sort(&mut rows)
                .unwrap();

            let values: Vec<u8> = rows.iter().map(|&r| table[r][0].unwrap()).collect();
            assert_eq!(values, vec![0, 1, 1, 2, 3, 3, 3, 3, 4]);
        }
    }

    #[test]
    fn test_composite_order_matches_comparator() {
        let table: Vec<Vec<Option<i32>>> = (0..200)
            .map(|i| {
                let a = if i % 7 == 0 { None } else { Some(i % 3) };
                vec![a, Some(i % 5), Some(-(i % 4))]
            })
            .collect();
        let keys = [
            SortKey::asc().nulls(NullsOrder::First),
            SortKey::desc(),
            SortKey::asc(),
        ];

        let mut rows: Vec<usize> = (0..table.len()).collect();
        MultiKeySort::new(&table, &keys).seed(3).sort(&mut rows).unwrap();

        assert!(rows.windows(2).all(|w| {
            compare_rows(&table, &keys, &w[0], &w[1], 0) != Ordering::Greater
        }));
    }

    #[test]
    fn test_start_depth_at_key_count_is_noop() {
        let table = vec![vec![Some(2)], vec![Some(1)]];
        let mut rows = vec![0usize, 1];
        MultiKeySort::new(&table, &[SortKey::asc()])
            .start_depth(1)
            .sort(&mut rows)
            .unwrap();
        assert_eq!(rows, vec![0, 1]);
    }

    #[test]
    #[should_panic(expected = "exceeds key count")]
    fn test_start_depth_past_key_count_panics() {
        let table = vec![vec![Some(2)], vec![Some(1)]];
        let mut rows = vec![0usize, 1];
        let _ = MultiKeySort::new(&table, &[SortKey::asc()])
            .start_depth(2)
            .sort(&mut rows);
    }

    #[test]
    fn test_seen_null_threaded_from_caller() {
        let table = vec![vec![Some(1)], vec![Some(1)]];
        let mut seen = Vec::new();
        let mut handler = |group: &mut [usize], seen_null: bool| -> Result<()> {
            seen.push((group.len(), seen_null));
            Ok(())
        };
        let mut rows = vec![0usize, 1];
        MultiKeySort::new(&table, &[SortKey::asc()])
            .seen_null(true)
            .on_duplicates(&mut handler)
            .sort(&mut rows)
            .unwrap();
        assert_eq!(seen, vec![(2, true)]);
    }

    #[test]
    fn test_handler_error_propagates() {
        let table = vec![vec![Some(5)], vec![Some(1)], vec![Some(5)]];
        let mut handler = |_: &mut [usize], _: bool| -> Result<()> {
            Err(SortError::Handler("boom".into()))
        };
        let mut rows = vec![0usize, 1, 2];
        let result = MultiKeySort::new(&table, &[SortKey::asc()])
            .on_duplicates(&mut handler)
            .sort(&mut rows);
        assert_eq!(result, Err(SortError::Handler("boom".into())));
    }

    #[test]
    #[should_panic(expected = "out of order")]
    fn test_verify_order_detects_inversion() {
        let table = vec![vec![Some(2)], vec![Some(1)]];
        verify_order(&[0usize, 1], 0, &table, &[SortKey::asc()]);
    }
}
