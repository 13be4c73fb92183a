//! Vector lifecycle and element access over the C ABI.
//!
//! All vectors live in one `Mutex`-guarded table. The lock is held only
//! for the duration of a single call; concurrent use of the *same* vector
//! from several C threads is still the caller's responsibility, because
//! returned element pointers escape the lock.

use std::ptr;
use std::sync::Mutex;

use vecbuf_store::ByteVec;

use crate::handle::Registry;
use crate::status::VecbufStatus;

static VECTORS: Mutex<Registry<ByteVec>> = Mutex::new(Registry::new());

/// Create an empty vector of `element_size`-byte elements.
///
/// Writes the new handle to `handle_out`. Nothing is allocated until the
/// first push or reserve. A zero `element_size` is rejected with
/// `InvalidLayout`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_new(element_size: usize, handle_out: *mut u64) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return VecbufStatus::InvalidArgument as i32;
        }
        let vector = match ByteVec::new(element_size) {
            Ok(v) => v,
            Err(e) => return VecbufStatus::from(&e) as i32,
        };
        let Some(handle) = ffi_lock!(VECTORS).insert(vector) else {
            return VecbufStatus::InternalError as i32;
        };
        // SAFETY: handle_out is non-null and valid per caller contract.
        unsafe { *handle_out = handle };
        VecbufStatus::Ok as i32
    })
}

/// Destroy a vector and free its buffer.
///
/// The handle becomes stale: destroying it again returns `InvalidHandle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_destroy(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(VECTORS).remove(handle) {
            Some(mut v) => {
                v.destroy();
                VecbufStatus::Ok as i32
            }
            None => VecbufStatus::InvalidHandle as i32,
        }
    })
}

/// Append a copy of the `element_size` bytes at `element`.
///
/// If `slot_out` is non-null it receives a pointer to the stored copy. On
/// `OutOfMemory` the vector is unchanged. `element` may point anywhere
/// into the vector's own buffer, spare capacity included.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_push(handle: u64, element: *const u8, slot_out: *mut *mut u8) -> i32 {
    ffi_guard!({
        if element.is_null() {
            return VecbufStatus::InvalidArgument as i32;
        }
        let mut table = ffi_lock!(VECTORS);
        let Some(v) = table.get_mut(handle) else {
            return VecbufStatus::InvalidHandle as i32;
        };

        let size = v.element_size();
        // Growth would free it, and a spare slot may be the destination.
        let aliased = v.buffer_ptr_range().contains(&element);
        // SAFETY: the caller guarantees `element` points at `element_size`
        // readable bytes.
        let bytes = unsafe { std::slice::from_raw_parts(element, size) };
        let owned;
        let bytes = if aliased {
            owned = bytes.to_vec();
            owned.as_slice()
        } else {
            bytes
        };

        match v.push(bytes) {
            Ok(slot) => {
                if !slot_out.is_null() {
                    // SAFETY: slot_out is non-null and valid per caller contract.
                    unsafe { *slot_out = slot.as_mut_ptr() };
                }
                VecbufStatus::Ok as i32
            }
            Err(e) => VecbufStatus::from(&e) as i32,
        }
    })
}

/// Drop the last element. A no-op on an empty vector.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_pop(handle: u64) -> i32 {
    with_vector(handle, |v| {
        v.pop();
        VecbufStatus::Ok
    })
}

/// Ensure capacity for at least `capacity` elements.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_reserve(handle: u64, capacity: usize) -> i32 {
    with_vector(handle, |v| match v.reserve(capacity) {
        Ok(()) => VecbufStatus::Ok,
        Err(e) => VecbufStatus::from(&e),
    })
}

/// Fit capacity to length; frees the buffer when empty. Reallocation
/// failure is absorbed and still reports `Ok`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_shrink(handle: u64) -> i32 {
    with_vector(handle, |v| {
        v.shrink();
        VecbufStatus::Ok
    })
}

/// Set the length to zero, keeping the buffer.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_clear(handle: u64) -> i32 {
    with_vector(handle, |v| {
        v.clear();
        VecbufStatus::Ok
    })
}

/// Remove element `index`, shifting later elements down.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_remove(handle: u64, index: usize) -> i32 {
    with_vector(handle, |v| {
        if v.remove(index) {
            VecbufStatus::Ok
        } else {
            VecbufStatus::IndexOutOfRange
        }
    })
}

/// Pointer to element `index`, or null if out of range or invalid handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_at(handle: u64, index: usize) -> *mut u8 {
    element_ptr(handle, |v| v.at_mut(index).map(<[u8]>::as_mut_ptr))
}

/// Pointer to the last element, or null if empty or invalid handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_back(handle: u64) -> *mut u8 {
    element_ptr(handle, |v| v.back_mut().map(<[u8]>::as_mut_ptr))
}

/// Pointer to the first element; null when no buffer is allocated.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_begin(handle: u64) -> *mut u8 {
    element_ptr(handle, |v| Some(v.as_mut_ptr_range().start))
}

/// One past the last element; null when no buffer is allocated.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_end(handle: u64) -> *mut u8 {
    element_ptr(handle, |v| Some(v.as_mut_ptr_range().end))
}

/// Number of live elements; 0 for an invalid handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_len(handle: u64) -> usize {
    read_field(handle, ByteVec::len)
}

/// Current capacity in elements; 0 for an invalid handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_capacity(handle: u64) -> usize {
    read_field(handle, ByteVec::capacity)
}

/// Element size in bytes; 0 for an invalid handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn vecbuf_element_size(handle: u64) -> usize {
    read_field(handle, ByteVec::element_size)
}

fn with_vector(handle: u64, f: impl FnOnce(&mut ByteVec) -> VecbufStatus) -> i32 {
    ffi_guard!({
        let mut table = ffi_lock!(VECTORS);
        match table.get_mut(handle) {
            Some(v) => f(v) as i32,
            None => VecbufStatus::InvalidHandle as i32,
        }
    })
}

fn element_ptr(handle: u64, f: impl FnOnce(&mut ByteVec) -> Option<*mut u8>) -> *mut u8 {
    ffi_guard_or!(ptr::null_mut(), {
        let mut table = ffi_lock!(VECTORS, ptr::null_mut());
        table
            .get_mut(handle)
            .and_then(f)
            .unwrap_or(ptr::null_mut())
    })
}

fn read_field(handle: u64, f: impl FnOnce(&ByteVec) -> usize) -> usize {
    ffi_guard_or!(0, {
        let table = ffi_lock!(VECTORS, 0);
        table.get(handle).map_or(0, f)
    })
}
