//! Fixed capacity, thread synchronized ring buffer.
//!
//! [`RingStore`] keeps the most recent `capacity - 1` items and silently
//! overwrites older ones. Its contents are read through views:
//!
//! * [`RangeView`], a contiguous window iterated oldest to newest or back
//! * [`SelectiveView`], an arbitrary, possibly repeating, list of slots
//!
//! Both have exclusive `*Mut` counterparts reachable through `&mut RingStore`.

mod cursor;
mod error;
mod range_view;
mod ring_store;
mod selective_view;

pub use cursor::{ForwardCursor, ReverseCursor, SelectiveCursor};
pub use error::{Result, RingError};
pub use range_view::{EmptyRule, Iter, IterMut, RangeView, RangeViewMut, RevIter};
pub use ring_store::RingStore;
pub use selective_view::{SelectiveIter, SelectiveView, SelectiveViewMut};
