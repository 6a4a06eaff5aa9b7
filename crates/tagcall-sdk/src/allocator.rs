//! Host allocator capability
//!
//! String and blob payloads written into a slot are allocated through the
//! host's allocator and belong to the host from the moment they are written.
//! The conversion layer never frees them.

use std::ptr::NonNull;

use crate::error::{CallError, CallResult};

/// Host-provided memory allocator.
///
/// Returned buffers must be valid for `size` bytes and aligned to at least
/// `align_of::<u16>()` so wide strings can be written in place. A zero-byte
/// request may return any non-null pointer.
pub trait Allocator {
    /// Allocate `size` bytes, or `None` if the host refuses.
    fn alloc(&self, size: usize) -> Option<NonNull<u8>>;
}

/// Allocate `size` bytes suitable for elements of type `T`.
pub(crate) fn alloc_for<T>(allocator: Option<&dyn Allocator>, size: usize) -> CallResult<NonNull<T>> {
    let failure = CallError::AllocationFailure { size };
    let ptr = allocator.and_then(|a| a.alloc(size)).ok_or(failure.clone())?;
    if ptr.as_ptr() as usize % std::mem::align_of::<T>() != 0 {
        return Err(failure);
    }
    Ok(ptr.cast())
}
