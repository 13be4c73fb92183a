//! C ABI for vecbuf byte vectors.
//!
//! Vectors are owned by a process-wide registry and addressed from C
//! through opaque `u64` handles. Every entry point returns a
//! [`VecbufStatus`] code (or a null pointer / zero for accessors) and
//! catches panics at the boundary. The generated header is written to
//! `include/vecbuf.h` by the build script.
//!
//! Pointers handed out by `vecbuf_push`, `vecbuf_at`, `vecbuf_back`,
//! `vecbuf_begin` and `vecbuf_end` stay valid only until the next call that
//! mutates the same vector.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run `$body`, converting a panic into `$fallback`.
macro_rules! ffi_guard_or {
    ($fallback:expr, $body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(_) => {
                tracing::error!("panic caught at the vecbuf FFI boundary");
                $fallback
            }
        }
    };
}

/// Run `$body`, converting a panic into `VecbufStatus::Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::VecbufStatus::Panicked as i32, $body)
    };
}

/// Lock a mutex, returning `InternalError` (or `$fallback`) if poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        ffi_lock!(
            $mutex,
            $crate::status::VecbufStatus::InternalError as i32
        )
    };
    ($mutex:expr, $fallback:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $fallback,
        }
    };
}

mod handle;
pub mod status;
pub mod vector;

pub use status::VecbufStatus;
