//! Error types for vecbuf containers.
//!
//! [`VecError`] is what callers see. [`AllocError`] is the narrower signal
//! an [`Allocator`](crate::Allocator) returns; the store maps it onto
//! [`VecError::OutOfMemory`] together with the capacity that was requested.

use std::error::Error;
use std::fmt;

/// Errors returned by vector operations and layout construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VecError {
    /// The allocator refused the request, or the byte size of the requested
    /// capacity is not representable. Both cases are reported the same way.
    OutOfMemory {
        /// Capacity (in elements) that was asked for. `usize::MAX` when the
        /// capacity computation itself overflowed.
        requested: usize,
        /// Byte size of one element.
        element_size: usize,
    },
    /// A layout with a zero element size was requested.
    ZeroSizedElement,
    /// The alignment is not a power of two, or the size is not a multiple
    /// of the alignment.
    InvalidLayout {
        /// Requested element size in bytes.
        size: usize,
        /// Requested alignment in bytes.
        align: usize,
    },
    /// A pushed element's byte length differs from the vector's element size.
    ElementSizeMismatch {
        /// The vector's element size.
        expected: usize,
        /// Length of the slice that was supplied.
        actual: usize,
    },
    /// The vector was torn down with `destroy` and has no element size.
    Destroyed,
}

impl fmt::Display for VecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                element_size,
            } => {
                write!(
                    f,
                    "out of memory: cannot hold {requested} elements of {element_size} bytes"
                )
            }
            Self::ZeroSizedElement => write!(f, "element size must be non-zero"),
            Self::InvalidLayout { size, align } => {
                write!(f, "invalid element layout: size {size}, align {align}")
            }
            Self::ElementSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "element is {actual} bytes but the vector stores {expected}-byte elements"
                )
            }
            Self::Destroyed => write!(f, "vector has been destroyed"),
        }
    }
}

impl Error for VecError {}

/// The allocator could not satisfy a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory allocation failed")
    }
}

impl Error for AllocError {}
