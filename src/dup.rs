//! Handling of rows tied on every key column.
//!
//! Once the last key depth is exhausted, the sorter hands each maximal group of
//! tied rows (more than one row) to a [`DuplicateHandler`] exactly once. What happens
//! next is policy: nothing, a uniqueness check, or a deterministic tie-break.

use crate::error::{Result, SortError};
use std::cmp::Ordering;

/// Hook invoked on each fully-tied group.
///
/// `seen_null` is `true` when the group's key contained a null at any depth that
/// was compared on the way down.
pub trait DuplicateHandler<R> {
    fn handle(&mut self, group: &mut [R], seen_null: bool) -> Result<()>;
}

impl<R, F> DuplicateHandler<R> for F
where
    F: FnMut(&mut [R], bool) -> Result<()>,
{
    fn handle(&mut self, group: &mut [R], seen_null: bool) -> Result<()> {
        self(group, seen_null)
    }
}

/// Orders each tied group by a secondary comparator over row handles.
///
/// Typical use is ordering by physical position so that output is reproducible
/// regardless of pivot choices.
///
/// ```
/// use mksort::prelude::*;
///
/// let table = vec![vec![Some(1)], vec![Some(0)], vec![Some(1)], vec![Some(1)]];
/// let keys = [SortKey::asc()];
/// let mut rows: Vec<usize> = (0..table.len()).collect();
/// let mut by_position = TieBreak::new(|a: &usize, b: &usize| a.cmp(b));
///
/// MultiKeySort::new(&table, &keys)
///     .on_duplicates(&mut by_position)
///     .sort(&mut rows)
///     .unwrap();
///
/// assert_eq!(rows, vec![1, 0, 2, 3]);
/// ```
pub struct TieBreak<F> {
    compare: F,
}

impl<F> TieBreak<F> {
    pub fn new(compare: F) -> Self {
        Self { compare }
    }
}

impl<R, F> DuplicateHandler<R> for TieBreak<F>
where
    F: FnMut(&R, &R) -> Ordering,
{
    fn handle(&mut self, group: &mut [R], _seen_null: bool) -> Result<()> {
        group.sort_unstable_by(&mut self.compare);
        Ok(())
    }
}

/// Rejects groups of rows that share a complete non-null key.
///
/// Keys containing a null never collide, since `NULL` is distinct from every value
/// including another `NULL`; such groups are passed to the inner handler instead.
#[derive(Debug, Default)]
pub struct EnforceUnique<D = ()> {
    inner: D,
    checked: usize,
}

impl EnforceUnique {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D> EnforceUnique<D> {
    /// Wraps a handler that receives the groups accepted by the uniqueness check.
    pub fn with(inner: D) -> Self {
        Self { inner, checked: 0 }
    }

    /// Number of tied groups inspected so far.
    pub fn checked(&self) -> usize {
        self.checked
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<R> DuplicateHandler<R> for () {
    fn handle(&mut self, _group: &mut [R], _seen_null: bool) -> Result<()> {
        Ok(())
    }
}

impl<R, D: DuplicateHandler<R>> DuplicateHandler<R> for EnforceUnique<D> {
    fn handle(&mut self, group: &mut [R], seen_null: bool) -> Result<()> {
        self.checked += 1;
        if !seen_null {
            return Err(SortError::UniqueViolation { rows: group.len() });
        }
        self.inner.handle(group, seen_null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tie_break_orders_group() {
        let mut group = vec![7usize, 3, 5];
        let mut handler = TieBreak::new(|a: &usize, b: &usize| b.cmp(a));
        handler.handle(group.as_mut_slice(), false).unwrap();
        assert_eq!(group, vec![7, 5, 3]);

        let mut handler = TieBreak::new(|a: &usize, b: &usize| a.cmp(b));
        handler.handle(group.as_mut_slice(), false).unwrap();
        assert_eq!(group, vec![3, 5, 7]);
    }

    #[test]
    fn test_enforce_unique_allows_null_groups() {
        let mut handler = EnforceUnique::with(TieBreak::new(|a: &u32, b: &u32| a.cmp(b)));

        let mut nullable = vec![2u32, 1];
        handler.handle(nullable.as_mut_slice(), true).unwrap();
        assert_eq!(nullable, vec![1, 2]);

        let mut group = vec![4u32, 9, 9];
        assert_eq!(
            handler.handle(group.as_mut_slice(), false),
            Err(SortError::UniqueViolation { rows: 3 })
        );
        assert_eq!(handler.checked(), 2);
    }

    #[test]
    fn test_closure_handler() {
        let mut spans = Vec::new();
        let mut handler = |group: &mut [u8], seen_null: bool| -> Result<()> {
            spans.push((group.len(), seen_null));
            Ok(())
        };
        let (mut pair, mut triple) = ([1u8, 1], [2u8, 2, 2]);
        handler.handle(&mut pair[..], true).unwrap();
        handler.handle(&mut triple[..], false).unwrap();
        assert_eq!(spans, vec![(2, true), (3, false)]);
    }
}
