use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    #[error("capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),
    #[error("the ring buffer is empty")]
    Empty,
    #[error("slot index {index} is out of bounds for capacity {capacity}")]
    IndexOutOfBounds { index: usize, capacity: usize },
    #[error("offset {offset} is out of range for a view of {len} elements")]
    OutOfRange { offset: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, RingError>;
