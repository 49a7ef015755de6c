//! Error types for vector operations.

use thiserror::Error;

/// Result type for fallible vector operations.
pub type Result<T> = std::result::Result<T, VecError>;

/// Errors reported by the checked [`Vector`](crate::Vector) API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VecError {
    /// Index is not below the logical length.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Position handle points outside `[begin, end]` of the current buffer.
    #[error("position at offset {offset} out of range for length {len}")]
    PositionOutOfRange { offset: isize, len: usize },

    /// Position handle was issued before a reallocation or shift.
    #[error("stale position: issued under generation {issued}, buffer is at {current}")]
    StalePosition { issued: u64, current: u64 },

    /// `first` comes after `last`.
    #[error("invalid range: first offset {first} is past last offset {last}")]
    InvalidRange { first: usize, last: usize },

    /// Requested capacity does not fit in the address space.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The global allocator returned null.
    #[error("allocation of {bytes} bytes failed")]
    AllocFailed { bytes: usize },
}
