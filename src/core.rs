//! Core traits and types for multi-key sorting.
//!
//! This module defines:
//! - [`RowAccessor`]: How the sorter reads the key value of a row at a given depth.
//! - [`KeySpecs`] / [`SortKey`]: Per-depth ordering policy (direction, null placement).
//! - [`KeyColumns`]: Accessor adapter mapping key depths onto arbitrary columns.

use std::cmp::Ordering;
use std::fmt;

/// A trait for reading key values of rows without copying them.
///
/// `R` is the row handle type stored in the array being sorted (typically a `usize`
/// index into caller-owned storage). The sorter only ever moves handles; values are
/// borrowed from the accessor each time they are needed, so implementations should
/// be cheap and must be deterministic.
///
/// `None` means the key is SQL `NULL` at that depth.
///
/// # Examples
///
/// ```
/// use mksort::core::RowAccessor;
///
/// struct Orders {
///     placed_at: Vec<Option<u64>>,
///     total: Vec<Option<u64>>,
/// }
///
/// impl RowAccessor<usize> for Orders {
///     type Value = u64;
///
///     fn value(&self, row: &usize, depth: usize) -> Option<&u64> {
///         match depth {
///             0 => self.placed_at[*row].as_ref(),
///             _ => self.total[*row].as_ref(),
///         }
///     }
/// }
/// ```
pub trait RowAccessor<R> {
    /// Value type shared by every key column.
    type Value: ?Sized;

    /// Returns the key value of `row` at `depth`, or `None` for null.
    fn value(&self, row: &R, depth: usize) -> Option<&Self::Value>;
}

impl<R, A: RowAccessor<R> + ?Sized> RowAccessor<R> for &A {
    type Value = A::Value;

    #[inline(always)]
    fn value(&self, row: &R, depth: usize) -> Option<&Self::Value> {
        (**self).value(row, depth)
    }
}

// Row-major tables: handle `i` is row `i`, depth `d` is column `d`.
impl<V> RowAccessor<usize> for [Vec<Option<V>>] {
    type Value = V;

    #[inline(always)]
    fn value(&self, row: &usize, depth: usize) -> Option<&V> {
        self[*row][depth].as_ref()
    }
}

impl<V> RowAccessor<usize> for Vec<Vec<Option<V>>> {
    type Value = V;

    #[inline(always)]
    fn value(&self, row: &usize, depth: usize) -> Option<&V> {
        self[*row][depth].as_ref()
    }
}

/// Adapter that reads key depth `d` from column `columns[d]` of the inner accessor.
///
/// ```
/// use mksort::core::{KeyColumns, RowAccessor};
///
/// let table = vec![vec![Some(10), Some(7), None]];
/// let keys = KeyColumns::new(&table, [2, 0]);
///
/// assert_eq!(keys.value(&0usize, 0), None);
/// assert_eq!(keys.value(&0usize, 1), Some(&10));
/// ```
#[derive(Clone, Debug)]
pub struct KeyColumns<A> {
    inner: A,
    columns: Vec<usize>,
}

impl<A> KeyColumns<A> {
    pub fn new(inner: A, columns: impl Into<Vec<usize>>) -> Self {
        Self {
            inner,
            columns: columns.into(),
        }
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }
}

impl<R, A: RowAccessor<R>> RowAccessor<R> for KeyColumns<A> {
    type Value = A::Value;

    #[inline(always)]
    fn value(&self, row: &R, depth: usize) -> Option<&Self::Value> {
        self.inner.value(row, self.columns[depth])
    }
}

/// Sort direction of a key column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Placement of nulls relative to non-null values, independent of [`Direction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NullsOrder {
    First,
    Last,
}

/// Ordering policy for one key column.
pub struct SortKey<V: ?Sized> {
    pub direction: Direction,
    pub nulls: NullsOrder,
    compare: fn(&V, &V) -> Ordering,
}

impl<V: Ord + ?Sized> SortKey<V> {
    /// `ASC NULLS LAST`, the SQL default for ascending keys.
    pub fn asc() -> Self {
        Self::with_comparator(Direction::Ascending, NullsOrder::Last, V::cmp)
    }

    /// `DESC NULLS FIRST`, the SQL default for descending keys.
    pub fn desc() -> Self {
        Self::with_comparator(Direction::Descending, NullsOrder::First, V::cmp)
    }
}

impl<V: ?Sized> SortKey<V> {
    /// Builds a key from an ascending comparator for non-null values.
    pub fn with_comparator(
        direction: Direction,
        nulls: NullsOrder,
        compare: fn(&V, &V) -> Ordering,
    ) -> Self {
        Self {
            direction,
            nulls,
            compare,
        }
    }

    /// Overrides null placement.
    pub fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = nulls;
        self
    }

    /// Compares two possibly-null values under this key's policy.
    ///
    /// Two nulls are equal; a null is ordered before or after every non-null value
    /// according to [`NullsOrder`]; only non-null comparisons are flipped by
    /// [`Direction::Descending`].
    #[inline(always)]
    pub fn compare(&self, a: Option<&V>, b: Option<&V>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => match self.nulls {
                NullsOrder::First => Ordering::Less,
                NullsOrder::Last => Ordering::Greater,
            },
            (Some(_), None) => match self.nulls {
                NullsOrder::First => Ordering::Greater,
                NullsOrder::Last => Ordering::Less,
            },
            (Some(a), Some(b)) => {
                let ord = (self.compare)(a, b);
                match self.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            }
        }
    }
}

impl<V: ?Sized> Clone for SortKey<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: ?Sized> Copy for SortKey<V> {}

impl<V: ?Sized> fmt::Debug for SortKey<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey")
            .field("direction", &self.direction)
            .field("nulls", &self.nulls)
            .finish_non_exhaustive()
    }
}

/// An ordered, immutable sequence of per-depth comparison policies.
///
/// The sign returned by [`compare`](KeySpecs::compare) is already oriented by the
/// key's direction and null placement; the sorter never inspects either itself.
/// Each depth must be a strict weak ordering on its own.
pub trait KeySpecs<V: ?Sized> {
    /// Number of key columns.
    fn key_count(&self) -> usize;

    /// Compares two values at `depth`. Panics if `depth >= key_count()`.
    fn compare(&self, depth: usize, a: Option<&V>, b: Option<&V>) -> Ordering;
}

impl<V: ?Sized> KeySpecs<V> for [SortKey<V>] {
    fn key_count(&self) -> usize {
        self.len()
    }

    #[inline(always)]
    fn compare(&self, depth: usize, a: Option<&V>, b: Option<&V>) -> Ordering {
        self[depth].compare(a, b)
    }
}

impl<V: ?Sized> KeySpecs<V> for Vec<SortKey<V>> {
    fn key_count(&self) -> usize {
        self.len()
    }

    #[inline(always)]
    fn compare(&self, depth: usize, a: Option<&V>, b: Option<&V>) -> Ordering {
        self[depth].compare(a, b)
    }
}

impl<V: ?Sized, const N: usize> KeySpecs<V> for [SortKey<V>; N] {
    fn key_count(&self) -> usize {
        N
    }

    #[inline(always)]
    fn compare(&self, depth: usize, a: Option<&V>, b: Option<&V>) -> Ordering {
        self[depth].compare(a, b)
    }
}

/// Compares two rows lexicographically over depths `from_depth..key_count`.
pub fn compare_rows<R, A, K>(accessor: &A, keys: &K, a: &R, b: &R, from_depth: usize) -> Ordering
where
    A: RowAccessor<R> + ?Sized,
    K: KeySpecs<A::Value> + ?Sized,
{
    (from_depth..keys.key_count())
        .map(|depth| keys.compare(depth, accessor.value(a, depth), accessor.value(b, depth)))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}
