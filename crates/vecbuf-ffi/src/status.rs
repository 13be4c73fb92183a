//! C-compatible status codes.
//!
//! [`VecbufStatus`] is a `repr(i32)` enum. `Ok` is zero and every error is
//! negative; values are ABI-stable.

use vecbuf_core::VecError;

/// Status code returned by FFI functions.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VecbufStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or the vector was already destroyed.
    InvalidHandle = -1,
    /// A required pointer argument is null, or an element has the wrong size.
    InvalidArgument = -2,
    /// Allocation failed or the requested capacity overflows.
    OutOfMemory = -3,
    /// Index is not below the vector's length.
    IndexOutOfRange = -4,
    /// Element size is zero or otherwise unusable.
    InvalidLayout = -5,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -6,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&VecError> for VecbufStatus {
    fn from(e: &VecError) -> Self {
        match e {
            VecError::OutOfMemory { .. } => VecbufStatus::OutOfMemory,
            VecError::ZeroSizedElement | VecError::InvalidLayout { .. } => {
                VecbufStatus::InvalidLayout
            }
            VecError::ElementSizeMismatch { .. } => VecbufStatus::InvalidArgument,
            VecError::Destroyed => VecbufStatus::InvalidHandle,
        }
    }
}
