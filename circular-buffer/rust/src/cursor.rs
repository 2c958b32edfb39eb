use std::ops::{Add, Sub};

#[inline(always)]
pub(crate) fn next_index(index: usize, capacity: usize) -> usize {
    let next = index + 1;
    if next >= capacity {
        0
    } else {
        next
    }
}

#[inline(always)]
pub(crate) fn prev_index(index: usize, capacity: usize) -> usize {
    if index == 0 {
        capacity - 1
    } else {
        index - 1
    }
}

/// Number of forward steps from `start` to `finish` on a ring of `capacity` slots.
#[inline(always)]
pub(crate) fn distance(start: usize, finish: usize, capacity: usize) -> usize {
    if finish >= start {
        finish - start
    } else {
        finish + capacity - start
    }
}

#[inline(always)]
fn offset_forward(index: usize, steps: usize, capacity: usize) -> usize {
    (index + steps % capacity) % capacity
}

#[inline(always)]
fn offset_backward(index: usize, steps: usize, capacity: usize) -> usize {
    (index + capacity - steps % capacity) % capacity
}

/// A position in a ring of slots that moves from older towards newer slots.
///
/// Two cursors are equal when they sit on the same slot of equally sized rings.
/// Cursors are handed out by [`RingStore`](crate::RingStore) and its views, so
/// their ring always has at least one slot.
///
/// ```
/// use circular_buffer::RingStore;
///
/// let store = RingStore::<u32>::new(4).unwrap();
/// for i in 0..3 {
///     store.put(i);
/// }
///
/// let (_, mut cursor) = store.cursors();
/// assert_eq!(3, cursor.index());
/// cursor.advance();
/// assert_eq!(0, cursor.index());
/// assert_eq!(2, (cursor - 2).index());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ForwardCursor {
    index: usize,
    capacity: usize,
}

impl ForwardCursor {
    pub(crate) fn new(index: usize, capacity: usize) -> Self {
        debug_assert!(index < capacity, "cursor index {index} outside of ring of {capacity}");
        Self { index, capacity }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline(always)]
    pub fn advance(&mut self) {
        self.index = next_index(self.index, self.capacity);
    }

    #[inline(always)]
    pub fn retreat(&mut self) {
        self.index = prev_index(self.index, self.capacity);
    }

    pub fn advance_by(&mut self, steps: usize) {
        self.index = offset_forward(self.index, steps, self.capacity);
    }

    pub fn retreat_by(&mut self, steps: usize) {
        self.index = offset_backward(self.index, steps, self.capacity);
    }
}

impl Add<usize> for ForwardCursor {
    type Output = Self;

    fn add(mut self, steps: usize) -> Self::Output {
        self.advance_by(steps);
        self
    }
}

impl Sub<usize> for ForwardCursor {
    type Output = Self;

    fn sub(mut self, steps: usize) -> Self::Output {
        self.retreat_by(steps);
        self
    }
}

/// Mirror image of [`ForwardCursor`]: advancing moves towards older slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReverseCursor {
    index: usize,
    capacity: usize,
}

impl ReverseCursor {
    pub(crate) fn new(index: usize, capacity: usize) -> Self {
        debug_assert!(index < capacity, "cursor index {index} outside of ring of {capacity}");
        Self { index, capacity }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline(always)]
    pub fn advance(&mut self) {
        self.index = prev_index(self.index, self.capacity);
    }

    #[inline(always)]
    pub fn retreat(&mut self) {
        self.index = next_index(self.index, self.capacity);
    }

    pub fn advance_by(&mut self, steps: usize) {
        self.index = offset_backward(self.index, steps, self.capacity);
    }

    pub fn retreat_by(&mut self, steps: usize) {
        self.index = offset_forward(self.index, steps, self.capacity);
    }
}

impl Add<usize> for ReverseCursor {
    type Output = Self;

    fn add(mut self, steps: usize) -> Self::Output {
        self.advance_by(steps);
        self
    }
}

impl Sub<usize> for ReverseCursor {
    type Output = Self;

    fn sub(mut self, steps: usize) -> Self::Output {
        self.retreat_by(steps);
        self
    }
}

/// A position within a caller supplied list of slot indexes.
///
/// Movement is linear, there is no wraparound. Retreating past the first
/// position stays on the first position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectiveCursor {
    position: usize,
}

impl SelectiveCursor {
    pub fn new(position: usize) -> Self {
        Self { position }
    }

    #[inline(always)]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The slot index this cursor points at, if it is still inside `indexes`.
    #[inline(always)]
    pub fn resolve(&self, indexes: &[usize]) -> Option<usize> {
        indexes.get(self.position).copied()
    }

    #[inline(always)]
    pub fn advance(&mut self) {
        self.position += 1;
    }

    #[inline(always)]
    pub fn retreat(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    pub fn advance_by(&mut self, steps: usize) {
        self.position += steps;
    }

    pub fn retreat_by(&mut self, steps: usize) {
        self.position = self.position.saturating_sub(steps);
    }
}

impl Add<usize> for SelectiveCursor {
    type Output = Self;

    fn add(mut self, steps: usize) -> Self::Output {
        self.advance_by(steps);
        self
    }
}

impl Sub<usize> for SelectiveCursor {
    type Output = Self;

    fn sub(mut self, steps: usize) -> Self::Output {
        self.retreat_by(steps);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_helpers_wrap() {
        assert_eq!(1, next_index(0, 5));
        assert_eq!(0, next_index(4, 5));
        assert_eq!(4, prev_index(0, 5));
        assert_eq!(2, prev_index(3, 5));
        assert_eq!(0, next_index(0, 1));
        assert_eq!(0, prev_index(0, 1));
    }

    #[test]
    fn distance_is_circular() {
        assert_eq!(0, distance(3, 3, 5));
        assert_eq!(2, distance(1, 3, 5));
        assert_eq!(4, distance(3, 2, 5));
        assert_eq!(1, distance(4, 0, 5));
    }

    #[test]
    fn forward_cursor_wraps_both_ways() {
        let mut cursor = ForwardCursor::new(4, 5);
        cursor.advance();
        assert_eq!(0, cursor.index());
        cursor.retreat();
        assert_eq!(4, cursor.index());
        cursor.retreat();
        assert_eq!(3, cursor.index());
    }

    #[test]
    fn forward_cursor_jumps_more_than_one_lap() {
        let cursor = ForwardCursor::new(2, 5);
        assert_eq!(4, (cursor + 12).index());
        assert_eq!(0, (cursor - 12).index());
        assert_eq!(cursor, cursor + 5);
        assert_eq!(cursor, cursor - 10);
    }

    #[test]
    fn reverse_cursor_mirrors_forward() {
        let mut cursor = ReverseCursor::new(0, 5);
        cursor.advance();
        assert_eq!(4, cursor.index());
        cursor.retreat();
        assert_eq!(0, cursor.index());
        assert_eq!(3, (cursor + 2).index());
        assert_eq!(2, (cursor - 7).index());
    }

    #[test]
    fn cursors_compare_by_slot() {
        let a = ForwardCursor::new(1, 5);
        let mut b = ForwardCursor::new(0, 5);
        assert_ne!(a, b);
        b.advance();
        assert_eq!(a, b);
        assert!(ForwardCursor::new(0, 5) < a);
    }

    #[test]
    fn selective_cursor_is_linear() {
        let indexes = [3, 1, 3];
        let mut cursor = SelectiveCursor::default();
        assert_eq!(Some(3), cursor.resolve(&indexes));
        cursor.advance();
        assert_eq!(Some(1), cursor.resolve(&indexes));
        cursor.advance_by(2);
        assert_eq!(3, cursor.position());
        assert_eq!(None, cursor.resolve(&indexes));
        cursor.retreat_by(10);
        assert_eq!(0, cursor.position());
        assert_eq!(SelectiveCursor::new(2), cursor + 2);
    }
}
