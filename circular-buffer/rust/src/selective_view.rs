use std::{
    fmt::{self, Debug, Formatter},
    iter::FusedIterator,
};

use parking_lot::RwLockReadGuard;

use crate::cursor::SelectiveCursor;
use crate::error::{Result, RingError};

/// Checks every index up front so iteration never has to.
pub(crate) fn check_indexes(indexes: &[usize], capacity: usize) -> Result<()> {
    match indexes.iter().find(|&&index| index >= capacity) {
        Some(&index) => Err(RingError::IndexOutOfBounds { index, capacity }),
        None => Ok(()),
    }
}

fn position(indexes: &[usize], offset: usize) -> Result<usize> {
    indexes.get(offset).copied().ok_or(RingError::OutOfRange {
        offset,
        len: indexes.len(),
    })
}

/// A view that visits store slots in the order of a caller supplied index list.
///
/// Indexes may repeat and need not be ordered. The list is borrowed, not copied.
///
/// ```
/// use circular_buffer::RingStore;
///
/// let store = RingStore::<u32>::new(8).unwrap();
/// for i in 0..5 {
///     store.put(i * 10);
/// }
///
/// let indexes = [4, 0, 4];
/// let view = store.selective(&indexes).unwrap();
/// let values: Vec<u32> = view.iter().copied().collect();
/// assert_eq!(vec![40, 0, 40], values);
/// ```
pub struct SelectiveView<'a, 'i, T> {
    slots: RwLockReadGuard<'a, Box<[T]>>,
    indexes: &'i [usize],
}

impl<'a, 'i, T> SelectiveView<'a, 'i, T> {
    pub(crate) fn new(slots: RwLockReadGuard<'a, Box<[T]>>, indexes: &'i [usize]) -> Self {
        Self { slots, indexes }
    }

    pub fn indexes(&self) -> &'i [usize] {
        self.indexes
    }

    pub fn count(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn first(&self) -> Result<&T> {
        let index = self.indexes.first().ok_or(RingError::Empty)?;
        Ok(&self.slots[*index])
    }

    pub fn last(&self) -> Result<&T> {
        let index = self.indexes.last().ok_or(RingError::Empty)?;
        Ok(&self.slots[*index])
    }

    pub fn get(&self, offset: usize) -> Result<&T> {
        Ok(&self.slots[position(self.indexes, offset)?])
    }

    pub fn iter(&self) -> SelectiveIter<'_, T> {
        SelectiveIter::new(&self.slots, self.indexes)
    }
}

impl<'v, T> IntoIterator for &'v SelectiveView<'_, '_, T> {
    type Item = &'v T;
    type IntoIter = SelectiveIter<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Debug> Debug for SelectiveView<'_, '_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectiveView")
            .field("indexes", &self.indexes)
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Exclusive counterpart of [`SelectiveView`].
///
/// Repeated indexes alias the same slot, so mutation goes through
/// [`for_each_mut`](Self::for_each_mut) rather than an iterator of `&mut T`.
pub struct SelectiveViewMut<'a, 'i, T> {
    slots: &'a mut [T],
    indexes: &'i [usize],
}

impl<'a, 'i, T> SelectiveViewMut<'a, 'i, T> {
    pub(crate) fn new(slots: &'a mut [T], indexes: &'i [usize]) -> Self {
        Self { slots, indexes }
    }

    pub fn indexes(&self) -> &'i [usize] {
        self.indexes
    }

    pub fn count(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn first(&self) -> Result<&T> {
        let index = self.indexes.first().ok_or(RingError::Empty)?;
        Ok(&self.slots[*index])
    }

    pub fn first_mut(&mut self) -> Result<&mut T> {
        let index = self.indexes.first().ok_or(RingError::Empty)?;
        Ok(&mut self.slots[*index])
    }

    pub fn last(&self) -> Result<&T> {
        let index = self.indexes.last().ok_or(RingError::Empty)?;
        Ok(&self.slots[*index])
    }

    pub fn last_mut(&mut self) -> Result<&mut T> {
        let index = self.indexes.last().ok_or(RingError::Empty)?;
        Ok(&mut self.slots[*index])
    }

    pub fn get(&self, offset: usize) -> Result<&T> {
        Ok(&self.slots[position(self.indexes, offset)?])
    }

    pub fn get_mut(&mut self, offset: usize) -> Result<&mut T> {
        Ok(&mut self.slots[position(self.indexes, offset)?])
    }

    pub fn iter(&self) -> SelectiveIter<'_, T> {
        SelectiveIter::new(&*self.slots, self.indexes)
    }

    /// Visits every selected slot in order, once per occurrence of its index.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T),
    {
        for &index in self.indexes {
            f(&mut self.slots[index]);
        }
    }

    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.for_each_mut(|slot| *slot = value.clone());
    }
}

impl<T: Debug> Debug for SelectiveViewMut<'_, '_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectiveViewMut")
            .field("indexes", &self.indexes)
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug)]
pub struct SelectiveIter<'a, T> {
    slots: &'a [T],
    indexes: &'a [usize],
    front: SelectiveCursor,
    back: SelectiveCursor,
}

impl<'a, T> SelectiveIter<'a, T> {
    fn new(slots: &'a [T], indexes: &'a [usize]) -> Self {
        Self {
            slots,
            indexes,
            front: SelectiveCursor::default(),
            back: SelectiveCursor::new(indexes.len()),
        }
    }
}

impl<T> Clone for SelectiveIter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T> Iterator for SelectiveIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        let index = self.front.resolve(self.indexes)?;
        self.front.advance();
        Some(&self.slots[index])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back.position() - self.front.position();
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for SelectiveIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        self.back.retreat();
        let index = self.back.resolve(self.indexes)?;
        Some(&self.slots[index])
    }
}

impl<T> ExactSizeIterator for SelectiveIter<'_, T> {}
impl<T> FusedIterator for SelectiveIter<'_, T> {}
