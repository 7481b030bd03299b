use std::error::Error;
use std::fmt;

/// Errors reported by a [`crate::MemoryResource`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The size and alignment do not describe a valid layout.
    BadRequest,
    /// The underlying system allocation failed.
    OutOfMemory,
    /// The address is not tracked by the resource, or is already free.
    InvalidDeallocation,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "invalid size or alignment requested"),
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::InvalidDeallocation => {
                write!(f, "deallocation of an unmanaged or already freed address")
            }
        }
    }
}

impl Error for AllocError {}

/// Errors reported by a [`crate::DynamicArray`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// The operation needs at least one element.
    EmptyContainer,
    /// The index lies outside of the live range.
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// The length of the array at the time of the request.
        len: usize,
    },
    /// The backing memory resource refused a request.
    Alloc(AllocError),
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyContainer => write!(f, "operation on an empty array"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for array of length {len}")
            }
            Self::Alloc(err) => write!(f, "allocation failed: {err}"),
        }
    }
}

impl Error for ArrayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AllocError> for ArrayError {
    fn from(error: AllocError) -> ArrayError {
        ArrayError::Alloc(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_errors_keep_their_kind() {
        let err: ArrayError = AllocError::OutOfMemory.into();

        assert_eq!(err, ArrayError::Alloc(AllocError::OutOfMemory));
        assert_ne!(err, ArrayError::EmptyContainer);
        assert!(err.source().is_some());
    }

    #[test]
    fn index_error_message() {
        let err = ArrayError::IndexOutOfRange { index: 7, len: 3 };

        assert_eq!(err.to_string(), "index 7 out of range for array of length 3");
    }
}
