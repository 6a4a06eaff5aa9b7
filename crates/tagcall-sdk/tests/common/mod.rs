//! Shared helpers for integration tests

#![allow(dead_code)]

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use tagcall_sdk::{Allocator, TaggedValue};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Allocator backed by the global allocator.
///
/// Records every request and frees all blocks when dropped, so slots written
/// through it must not outlive it.
#[derive(Default)]
pub struct TrackingAllocator {
    blocks: RefCell<Vec<(NonNull<u8>, Layout)>>,
    requests: RefCell<Vec<usize>>,
}

impl TrackingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes of every request so far, in order
    pub fn requests(&self) -> Vec<usize> {
        self.requests.borrow().clone()
    }

    pub fn allocation_count(&self) -> usize {
        self.blocks.borrow().len()
    }
}

impl Allocator for TrackingAllocator {
    fn alloc(&self, size: usize) -> Option<NonNull<u8>> {
        self.requests.borrow_mut().push(size);
        let layout = Layout::from_size_align(size.max(1), 8).ok()?;
        let ptr = NonNull::new(unsafe { std::alloc::alloc(layout) })?;
        self.blocks.borrow_mut().push((ptr, layout));
        Some(ptr)
    }
}

impl Drop for TrackingAllocator {
    fn drop(&mut self) {
        for (ptr, layout) in self.blocks.borrow_mut().drain(..) {
            unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
        }
    }
}

/// Allocator that refuses every request
#[derive(Default)]
pub struct FailingAllocator {
    pub attempts: Cell<usize>,
}

impl Allocator for FailingAllocator {
    fn alloc(&self, _size: usize) -> Option<NonNull<u8>> {
        self.attempts.set(self.attempts.get() + 1);
        None
    }
}

/// Test-owned narrow string buffer that a slot can point at
pub struct NarrowBuf(pub Vec<u8>);

impl NarrowBuf {
    pub fn new(text: &str) -> Self {
        NarrowBuf(text.as_bytes().to_vec())
    }

    pub fn slot(&mut self) -> TaggedValue {
        unsafe { TaggedValue::from_narrow_raw(self.0.as_mut_ptr(), self.0.len() as u32) }
    }
}

/// Test-owned wide string buffer that a slot can point at
pub struct WideBuf(pub Vec<u16>);

impl WideBuf {
    pub fn new(text: &str) -> Self {
        WideBuf(text.encode_utf16().collect())
    }

    pub fn slot(&mut self) -> TaggedValue {
        unsafe { TaggedValue::from_wide_raw(self.0.as_mut_ptr(), self.0.len() as u32) }
    }
}

/// Test-owned blob buffer that a slot can point at
pub struct BlobBuf(pub Vec<u8>);

impl BlobBuf {
    pub fn slot(&mut self) -> TaggedValue {
        unsafe { TaggedValue::from_blob_raw(self.0.as_mut_ptr(), self.0.len() as u32) }
    }
}

/// Read the zero element written just past a string slot's declared length
pub fn narrow_terminator(slot: &TaggedValue) -> u8 {
    let len = slot.narrow_bytes().map_or(0, <[u8]>::len);
    unsafe { *slot.buffer_ptr().add(len) }
}

/// Read the zero code unit written just past a wide slot's declared length
pub fn wide_terminator(slot: &TaggedValue) -> u16 {
    let len = slot.wide_units().map_or(0, <[u16]>::len);
    unsafe { *(slot.buffer_ptr() as *const u16).add(len) }
}
