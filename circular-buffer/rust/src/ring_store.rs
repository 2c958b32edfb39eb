use std::fmt::{self, Debug, Formatter};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::cursor::{distance, next_index, prev_index, ForwardCursor, ReverseCursor};
use crate::error::{Result, RingError};
use crate::range_view::{RangeView, RangeViewMut};
use crate::selective_view::{check_indexes, SelectiveView, SelectiveViewMut};

/// Slot index of `item` when it is one of `slots`, compared by address.
pub(crate) fn position_of<T>(slots: &[T], item: &T) -> Option<usize> {
    slots.iter().position(|slot| std::ptr::eq(slot, item))
}

/// Write cursor and full flag, the only state guarded by the bookkeeping mutex.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    /// Slot the next `put` lands in, not the slot written last.
    write: usize,
    full: bool,
}

impl Cursor {
    fn is_empty(&self) -> bool {
        self.write == 0 && !self.full
    }

    fn count(&self, capacity: usize) -> usize {
        // One slot is held back once full, it separates the oldest from the newest
        if self.full {
            capacity - 1
        } else {
            self.write
        }
    }

    fn last_valid_index(&self, capacity: usize) -> Result<usize> {
        if self.is_empty() {
            return Err(RingError::Empty);
        }
        Ok(prev_index(self.write, capacity))
    }

    fn range(&self, capacity: usize) -> (usize, usize) {
        let start = if self.full { next_index(self.write, capacity) } else { 0 };
        (start, self.write)
    }

    fn reverse_range(&self, capacity: usize) -> (usize, usize) {
        let start = prev_index(self.write, capacity);
        let finish = if self.full { self.write } else { capacity - 1 };
        (start, finish)
    }
}

/// Fixed capacity ring buffer that overwrites its oldest element when full.
///
/// The write cursor is guarded by a mutex held only for the duration of each
/// call. Element storage sits behind a reader-writer lock: shared views hold a
/// read lease for as long as they live and `put` takes the write side, so a
/// view never observes a half written window. Storage is always locked
/// before the cursor.
///
/// Once `capacity` items have been written, one slot is reserved and the store
/// reports `capacity - 1` elements.
///
/// ```
/// use circular_buffer::RingStore;
///
/// let store = RingStore::<u32>::new(5).unwrap();
/// for i in 0..7 {
///     store.put(i);
/// }
///
/// assert_eq!(4, store.count());
/// let recent: Vec<u32> = store.sub_buffer().iter().copied().collect();
/// assert_eq!(vec![3, 4, 5, 6], recent);
/// ```
pub struct RingStore<T> {
    capacity: usize,
    slots: RwLock<Box<[T]>>,
    cursor: Mutex<Cursor>,
}

impl<T: Default> RingStore<T> {
    /// Allocates `capacity` default initialized slots in a single allocation.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RingError::InvalidCapacity(capacity));
        }

        let slots: Box<[T]> = std::iter::repeat_with(T::default).take(capacity).collect();
        debug!(capacity, "ring store allocated");

        Ok(Self {
            capacity,
            slots: RwLock::new(slots),
            cursor: Mutex::new(Cursor::default()),
        })
    }
}

impl<T> RingStore<T> {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forgets every element. Slot contents stay in place until overwritten.
    pub fn reset(&self) {
        *self.cursor.lock() = Cursor::default();
        debug!(capacity = self.capacity, "ring store reset");
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.lock().is_empty()
    }

    pub fn count(&self) -> usize {
        self.cursor.lock().count(self.capacity)
    }

    /// Writes `item` into the next slot and returns that slot's index.
    ///
    /// Once full, this overwrites the oldest element. Blocks while any shared
    /// view of this store is alive.
    ///
    /// # Deadlocks
    ///
    /// Calling `put` on a thread that itself holds a [`RangeView`] or
    /// [`SelectiveView`] of this store never returns. Drop the view first.
    /// Point reads ([`get`](Self::get), [`last_element`](Self::last_element))
    /// hand out copies and never hold the lock past their own call.
    pub fn put(&self, item: T) -> usize {
        let mut slots = self.slots.write();
        let mut cursor = self.cursor.lock();

        let index = cursor.write;
        slots[index] = item;
        cursor.write = next_index(index, self.capacity);
        if cursor.write == 0 {
            if !cursor.full {
                debug!(
                    capacity = self.capacity,
                    "ring store is full, oldest elements will be overwritten"
                );
            }
            cursor.full = true;
        }

        trace!(index, full = cursor.full, "put");
        index
    }

    /// Slot index of the newest element.
    pub fn last_valid_index(&self) -> Result<usize> {
        self.cursor.lock().last_valid_index(self.capacity)
    }

    /// Copy of the newest element.
    ///
    /// ```
    /// use circular_buffer::RingStore;
    ///
    /// let store = RingStore::<u32>::new(4).unwrap();
    /// store.put(1);
    /// store.put(store.last_element().unwrap() + 1);
    /// assert_eq!(Ok(2), store.last_element());
    /// ```
    pub fn last_element(&self) -> Result<T>
    where
        T: Clone,
    {
        let slots = self.slots.read_recursive();
        let index = self.last_valid_index()?;
        Ok(slots[index].clone())
    }

    pub fn last_element_mut(&mut self) -> Result<&mut T> {
        let index = self.cursor.get_mut().last_valid_index(self.capacity)?;
        Ok(&mut self.slots.get_mut()[index])
    }

    /// Copy of the element in slot `index`, whether or not it is inside the current window.
    pub fn get(&self, index: usize) -> Result<T>
    where
        T: Clone,
    {
        self.check_index(index)?;
        Ok(self.slots.read_recursive()[index].clone())
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.check_index(index)?;
        Ok(&mut self.slots.get_mut()[index])
    }

    /// Slot index of an element reference handed out by this store.
    ///
    /// Lookup is by address, so an equal value living elsewhere is not found.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        position_of(&self.slots.read_recursive(), item)
    }

    /// `(oldest, end)` of the current window, `end` exclusive.
    pub fn range(&self) -> (usize, usize) {
        self.cursor.lock().range(self.capacity)
    }

    /// `(newest, end)` of the current window walked backwards, `end` exclusive.
    pub fn reverse_range(&self) -> (usize, usize) {
        self.cursor.lock().reverse_range(self.capacity)
    }

    pub fn cursors(&self) -> (ForwardCursor, ForwardCursor) {
        let (start, finish) = self.range();
        (
            ForwardCursor::new(start, self.capacity),
            ForwardCursor::new(finish, self.capacity),
        )
    }

    pub fn reverse_cursors(&self) -> (ReverseCursor, ReverseCursor) {
        let (start, finish) = self.reverse_range();
        (
            ReverseCursor::new(start, self.capacity),
            ReverseCursor::new(finish, self.capacity),
        )
    }

    #[inline(always)]
    pub fn next_index(&self, index: usize) -> usize {
        next_index(index, self.capacity)
    }

    #[inline(always)]
    pub fn prev_index(&self, index: usize) -> usize {
        prev_index(index, self.capacity)
    }

    /// Number of forward steps from slot `start` to slot `finish`.
    pub fn distance(&self, start: usize, finish: usize) -> usize {
        distance(start, finish, self.capacity)
    }

    /// View over the current window, oldest to newest.
    ///
    /// # Deadlocks
    ///
    /// The view holds a read lease on the slots until dropped. A [`put`](Self::put)
    /// from the same thread while it is alive never returns.
    pub fn sub_buffer(&self) -> RangeView<'_, T> {
        let slots = self.slots.read_recursive();
        let range = self.range();
        RangeView::new(slots, range)
    }

    /// View over the slots `start..finish`, wrapping past the last slot when `finish < start`.
    pub fn sub_buffer_between(&self, start: usize, finish: usize) -> Result<RangeView<'_, T>> {
        self.check_index(start)?;
        self.check_index(finish)?;
        Ok(RangeView::new(self.slots.read_recursive(), (start, finish)))
    }

    pub fn sub_buffer_from(&self, (start, finish): (usize, usize)) -> Result<RangeView<'_, T>> {
        self.sub_buffer_between(start, finish)
    }

    pub fn sub_buffer_mut(&mut self) -> RangeViewMut<'_, T> {
        let range = self.cursor.get_mut().range(self.capacity);
        RangeViewMut::new(self.slots.get_mut(), range)
    }

    pub fn sub_buffer_between_mut(
        &mut self,
        start: usize,
        finish: usize,
    ) -> Result<RangeViewMut<'_, T>> {
        self.check_index(start)?;
        self.check_index(finish)?;
        Ok(RangeViewMut::new(self.slots.get_mut(), (start, finish)))
    }

    /// View over the slots named by `indexes`, in that order.
    ///
    /// # Deadlocks
    ///
    /// Like [`sub_buffer`](Self::sub_buffer), the view holds a read lease until
    /// dropped and a same-thread [`put`](Self::put) meanwhile never returns.
    pub fn selective<'i>(&self, indexes: &'i [usize]) -> Result<SelectiveView<'_, 'i, T>> {
        check_indexes(indexes, self.capacity)?;
        Ok(SelectiveView::new(self.slots.read_recursive(), indexes))
    }

    pub fn selective_mut<'i>(
        &mut self,
        indexes: &'i [usize],
    ) -> Result<SelectiveViewMut<'_, 'i, T>> {
        check_indexes(indexes, self.capacity)?;
        Ok(SelectiveViewMut::new(self.slots.get_mut(), indexes))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.capacity {
            return Err(RingError::IndexOutOfBounds {
                index,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

impl<T: Debug> Debug for RingStore<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let slots = self.slots.read_recursive();
        let cursor = *self.cursor.lock();
        f.debug_struct("RingStore")
            .field("storage", &&**slots)
            .field("write_cursor", &cursor.write)
            .field("full", &cursor.full)
            .finish()
    }
}
