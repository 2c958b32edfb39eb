use std::{
    fmt::{self, Debug, Formatter},
    iter::{Chain, FusedIterator},
    ops::Index,
    slice,
};

use parking_lot::RwLockReadGuard;

use crate::cursor::{distance, prev_index, ForwardCursor, ReverseCursor};
use crate::error::{Result, RingError};
use crate::ring_store::position_of;

/// How a [`RangeView`] decides whether it is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyRule {
    /// Empty when both bounds sit on the same slot, i.e. `count() == 0`.
    #[default]
    BoundsEqual,
    /// Empty when the bounds differ. This is the inverted predicate some
    /// callers were written against.
    BoundsDiffer,
}

/// Half-open circular window `[start, end)` over a ring of `capacity` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    start: usize,
    end: usize,
    capacity: usize,
}

impl Bounds {
    fn new((start, end): (usize, usize), capacity: usize) -> Self {
        debug_assert!(start < capacity && end < capacity);
        Self { start, end, capacity }
    }

    fn count(&self) -> usize {
        distance(self.start, self.end, self.capacity)
    }

    fn is_empty_by(&self, rule: EmptyRule) -> bool {
        match rule {
            EmptyRule::BoundsEqual => self.start == self.end,
            EmptyRule::BoundsDiffer => self.start != self.end,
        }
    }

    fn newest(&self) -> usize {
        prev_index(self.end, self.capacity)
    }

    fn slot_at(&self, offset: usize) -> Result<usize> {
        let len = self.count();
        if offset >= len {
            return Err(RingError::OutOfRange { offset, len });
        }

        Ok((self.start + offset) % self.capacity)
    }

    fn cursors(&self) -> (ForwardCursor, ForwardCursor) {
        (
            ForwardCursor::new(self.start, self.capacity),
            ForwardCursor::new(self.end, self.capacity),
        )
    }

    fn reverse_cursors(&self) -> (ReverseCursor, ReverseCursor) {
        (
            ReverseCursor::new(self.newest(), self.capacity),
            ReverseCursor::new(prev_index(self.start, self.capacity), self.capacity),
        )
    }
}

/// A contiguous window over a [`RingStore`](crate::RingStore), oldest to newest.
///
/// The bounds are taken once when the view is created. The view holds a shared
/// lease on the store's slots, so no `put` can land while it is alive.
pub struct RangeView<'a, T> {
    slots: RwLockReadGuard<'a, Box<[T]>>,
    bounds: Bounds,
}

impl<'a, T> RangeView<'a, T> {
    pub(crate) fn new(slots: RwLockReadGuard<'a, Box<[T]>>, range: (usize, usize)) -> Self {
        let bounds = Bounds::new(range, slots.len());
        Self { slots, bounds }
    }

    pub fn count(&self) -> usize {
        self.bounds.count()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty_by(EmptyRule::BoundsEqual)
    }

    pub fn is_empty_by(&self, rule: EmptyRule) -> bool {
        self.bounds.is_empty_by(rule)
    }

    /// The `(start, end)` slot pair this view was created from.
    pub fn range(&self) -> (usize, usize) {
        (self.bounds.start, self.bounds.end)
    }

    /// Oldest element of the window.
    pub fn first(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(RingError::Empty);
        }
        Ok(&self.slots[self.bounds.start])
    }

    /// Newest element of the window.
    pub fn last(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(RingError::Empty);
        }
        Ok(&self.slots[self.bounds.newest()])
    }

    /// The element `offset` steps after the oldest one.
    ///
    /// ```
    /// use circular_buffer::{RingError, RingStore};
    ///
    /// let store = RingStore::<u32>::new(4).unwrap();
    /// for i in 0..6 {
    ///     store.put(i);
    /// }
    ///
    /// let view = store.sub_buffer();
    /// assert_eq!(Ok(&3), view.get(0));
    /// assert_eq!(Ok(&5), view.get(2));
    /// assert_eq!(Err(RingError::OutOfRange { offset: 3, len: 3 }), view.get(3));
    /// ```
    pub fn get(&self, offset: usize) -> Result<&T> {
        let slot = self.bounds.slot_at(offset)?;
        Ok(&self.slots[slot])
    }

    pub fn cursors(&self) -> (ForwardCursor, ForwardCursor) {
        self.bounds.cursors()
    }

    pub fn reverse_cursors(&self) -> (ReverseCursor, ReverseCursor) {
        self.bounds.reverse_cursors()
    }

    /// Slot index of `item` if it lives in the viewed store.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        position_of(&self.slots, item)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.slots, self.bounds)
    }

    pub fn iter_rev(&self) -> RevIter<'_, T> {
        RevIter(self.iter())
    }
}

impl<T> Index<usize> for RangeView<'_, T> {
    type Output = T;

    fn index(&self, offset: usize) -> &Self::Output {
        match self.get(offset) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<'v, T> IntoIterator for &'v RangeView<'_, T> {
    type Item = &'v T;
    type IntoIter = Iter<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Debug> Debug for RangeView<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeView")
            .field("range", &self.range())
            .field("items", &DebugItems(self.iter()))
            .finish()
    }
}

struct DebugItems<I>(I);

impl<I: Iterator + Clone> Debug for DebugItems<I>
where
    I::Item: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.clone()).finish()
    }
}

/// Exclusive counterpart of [`RangeView`], obtained through `&mut RingStore`.
pub struct RangeViewMut<'a, T> {
    slots: &'a mut [T],
    bounds: Bounds,
}

impl<'a, T> RangeViewMut<'a, T> {
    pub(crate) fn new(slots: &'a mut [T], range: (usize, usize)) -> Self {
        let bounds = Bounds::new(range, slots.len());
        Self { slots, bounds }
    }

    pub fn count(&self) -> usize {
        self.bounds.count()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty_by(EmptyRule::BoundsEqual)
    }

    pub fn is_empty_by(&self, rule: EmptyRule) -> bool {
        self.bounds.is_empty_by(rule)
    }

    pub fn range(&self) -> (usize, usize) {
        (self.bounds.start, self.bounds.end)
    }

    pub fn first(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(RingError::Empty);
        }
        Ok(&self.slots[self.bounds.start])
    }

    pub fn first_mut(&mut self) -> Result<&mut T> {
        if self.is_empty() {
            return Err(RingError::Empty);
        }
        Ok(&mut self.slots[self.bounds.start])
    }

    pub fn last(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(RingError::Empty);
        }
        Ok(&self.slots[self.bounds.newest()])
    }

    pub fn last_mut(&mut self) -> Result<&mut T> {
        if self.is_empty() {
            return Err(RingError::Empty);
        }
        Ok(&mut self.slots[self.bounds.newest()])
    }

    pub fn get(&self, offset: usize) -> Result<&T> {
        let slot = self.bounds.slot_at(offset)?;
        Ok(&self.slots[slot])
    }

    pub fn get_mut(&mut self, offset: usize) -> Result<&mut T> {
        let slot = self.bounds.slot_at(offset)?;
        Ok(&mut self.slots[slot])
    }

    pub fn cursors(&self) -> (ForwardCursor, ForwardCursor) {
        self.bounds.cursors()
    }

    pub fn reverse_cursors(&self) -> (ReverseCursor, ReverseCursor) {
        self.bounds.reverse_cursors()
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        position_of(&*self.slots, item)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&*self.slots, self.bounds)
    }

    pub fn iter_rev(&self) -> RevIter<'_, T> {
        RevIter(self.iter())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(&mut *self.slots, self.bounds)
    }
}

impl<'a, T> IntoIterator for RangeViewMut<'a, T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        IterMut::new(self.slots, self.bounds)
    }
}

impl<'v, T> IntoIterator for &'v mut RangeViewMut<'_, T> {
    type Item = &'v mut T;
    type IntoIter = IterMut<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: Debug> Debug for RangeViewMut<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeViewMut")
            .field("range", &self.range())
            .field("items", &DebugItems(self.iter()))
            .finish()
    }
}

/// Forward iterator over a window, driven by a front and a back cursor.
#[derive(Debug)]
pub struct Iter<'a, T> {
    slots: &'a [T],
    front: ForwardCursor,
    back: ReverseCursor,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn new(slots: &'a [T], bounds: Bounds) -> Self {
        let (front, _) = bounds.cursors();
        let (back, _) = bounds.reverse_cursors();
        Self {
            slots,
            front,
            back,
            remaining: bounds.count(),
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let item = &self.slots[self.front.index()];
        self.front.advance();
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let item = &self.slots[self.back.index()];
        self.back.advance();
        self.remaining -= 1;
        Some(item)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Newest to oldest traversal of a window.
#[derive(Debug)]
pub struct RevIter<'a, T>(Iter<'a, T>);

impl<T> Clone for RevIter<'_, T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<'a, T> Iterator for RevIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> DoubleEndedIterator for RevIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl<T> ExactSizeIterator for RevIter<'_, T> {}
impl<T> FusedIterator for RevIter<'_, T> {}

/// Mutable forward iterator over a window. Every slot is yielded at most once.
#[derive(Debug)]
pub struct IterMut<'a, T> {
    inner: Chain<slice::IterMut<'a, T>, slice::IterMut<'a, T>>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    fn new(slots: &'a mut [T], bounds: Bounds) -> Self {
        let Bounds { start, end, .. } = bounds;
        let remaining = bounds.count();
        let inner = if start <= end {
            slots[start..end].iter_mut().chain(slice::IterMut::default())
        } else {
            let (head, tail) = slots.split_at_mut(start);
            tail.iter_mut().chain(head[..end].iter_mut())
        };
        Self { inner, remaining }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let item = self.inner.next_back()?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

#[cfg(test)]
mod tests {
    use crate::{RingError, RingStore};

    use super::*;

    fn store_with(capacity: usize, values: impl IntoIterator<Item = u32>) -> RingStore<u32> {
        let store = RingStore::new(capacity).unwrap();
        for value in values {
            store.put(value);
        }
        store
    }

    #[test]
    fn forward_then_reverse_visit_same_elements() {
        let store = store_with(5, 0..7);
        let view = store.sub_buffer();

        let forward: Vec<u32> = view.iter().copied().collect();
        let mut reverse: Vec<u32> = view.iter_rev().copied().collect();
        assert_eq!(vec![3, 4, 5, 6], forward);
        reverse.reverse();
        assert_eq!(forward, reverse);
    }

    #[test]
    fn first_and_last_are_oldest_and_newest() {
        let store = store_with(5, 0..7);
        let view = store.sub_buffer();
        assert_eq!(Ok(&3), view.first());
        assert_eq!(Ok(&6), view.last());
        assert_eq!(4, view.count());
        assert_eq!(6, view[3]);
    }

    #[test]
    fn empty_rule_is_pinned_to_count() {
        let store = store_with(4, 0..2);

        let view = store.sub_buffer_between(1, 1).unwrap();
        assert_eq!(0, view.count());
        assert!(view.is_empty());
        assert!(!view.is_empty_by(EmptyRule::BoundsDiffer));
        assert_eq!(None, view.iter().next());
        assert_eq!(Err(RingError::Empty), view.first());
        assert_eq!(Err(RingError::Empty), view.last());
        drop(view);

        let view = store.sub_buffer();
        assert_eq!(2, view.count());
        assert!(!view.is_empty());
        assert!(view.is_empty_by(EmptyRule::BoundsDiffer));
        assert_eq!(view.is_empty(), view.count() == 0);
    }

    #[test]
    fn explicit_range_wraps_around_the_end() {
        let store = store_with(6, 10..16);
        let view = store.sub_buffer_between(4, 2).unwrap();
        assert_eq!(4, view.count());
        assert_eq!(vec![14, 15, 10, 11], view.iter().copied().collect::<Vec<_>>());
        assert_eq!(vec![11, 10, 15, 14], view.iter_rev().copied().collect::<Vec<_>>());
    }

    #[test]
    fn indexed_access_is_bounds_checked() {
        let store = store_with(6, 0..3);
        let view = store.sub_buffer();
        assert_eq!(Ok(&2), view.get(2));
        assert_eq!(Err(RingError::OutOfRange { offset: 3, len: 3 }), view.get(3));
    }

    #[test]
    #[should_panic(expected = "offset 5 is out of range")]
    fn index_operator_panics_past_the_window() {
        let store = store_with(6, 0..3);
        let view = store.sub_buffer();
        _ = view[5];
    }

    #[test]
    fn iterator_can_be_consumed_from_both_ends() {
        let store = store_with(5, 0..7);
        let view = store.sub_buffer();
        let mut iter = view.iter();
        assert_eq!(4, iter.len());
        assert_eq!(Some(&3), iter.next());
        assert_eq!(Some(&6), iter.next_back());
        assert_eq!(Some(&4), iter.next());
        assert_eq!(Some(&5), iter.next_back());
        assert_eq!(None, iter.next());
        assert_eq!(None, iter.next_back());
    }

    #[test]
    fn cursors_match_the_bounds() {
        let store = store_with(5, 0..7);
        let view = store.sub_buffer();
        let (begin, end) = view.cursors();
        assert_eq!((3, 2), (begin.index(), end.index()));
        assert_eq!(end, begin + view.count());

        let (rbegin, rend) = view.reverse_cursors();
        assert_eq!((1, 2), (rbegin.index(), rend.index()));
        assert_eq!(rend, rbegin + view.count());
    }

    #[test]
    fn index_of_finds_view_elements() {
        let store = store_with(5, 0..3);
        let view = store.sub_buffer();
        let newest = view.last().unwrap();
        assert_eq!(Some(2), view.index_of(newest));
        assert_eq!(None, view.index_of(&2));
    }

    #[test]
    fn mutable_view_writes_through() {
        let mut store = store_with(5, 0..7);
        {
            let mut view = store.sub_buffer_mut();
            for value in view.iter_mut() {
                *value *= 10;
            }
            *view.first_mut().unwrap() += 1;
            *view.last_mut().unwrap() += 2;
            assert_eq!(Ok(&40), view.get(1));
        }

        let view = store.sub_buffer();
        assert_eq!(vec![31, 40, 50, 62], view.iter().copied().collect::<Vec<_>>());
    }

    #[test]
    fn unwrapped_mutable_window_touches_only_its_slots() {
        let mut store = store_with(6, 0..5);
        let mut view = store.sub_buffer_between_mut(1, 4).unwrap();
        let iter = view.iter_mut();
        assert_eq!(3, iter.len());
        for value in iter {
            *value += 100;
        }
        drop(view);

        let slots: Vec<u32> = (0..6).map(|i| store.get(i).unwrap()).collect();
        assert_eq!(vec![0, 101, 102, 103, 4, 0], slots);
    }

    #[test]
    fn mutable_iteration_runs_in_both_directions() {
        let mut store = store_with(4, 0..4);
        let view = store.sub_buffer_mut();
        assert_eq!(vec![1, 2, 3], view.iter().copied().collect::<Vec<_>>());

        let mut iter = view.into_iter();
        assert_eq!(3, iter.len());
        assert_eq!(Some(3), iter.next_back().map(|v| *v));
        assert_eq!(Some(1), iter.next().map(|v| *v));
        assert_eq!(1, iter.len());
    }

    #[test]
    fn mutable_view_of_unwrapped_range() {
        let mut store = store_with(6, 0..4);
        let mut view = store.sub_buffer_between_mut(1, 3).unwrap();
        for value in &mut view {
            *value = 9;
        }
        drop(view);

        assert_eq!(vec![0, 9, 9, 3], store.sub_buffer().iter().copied().collect::<Vec<_>>());
    }
}
