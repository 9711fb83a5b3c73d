// vertex_core/src/queue.rs
//
// Single-producer/single-consumer lock-free ring queue. Translates
// `Utils::LFQueue<T>` (original_source/source/utils/lfqueue.h) into safe
// Rust: a fixed `Vec<T>` of blocks, a single atomic length counter, and
// separate write/read cursors each touched by exactly one side.
//
// Not resizable at runtime and not safe for more than one producer or more
// than one consumer — that contract is static, not enforced.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{VertexError, VertexResult};

pub struct Spsc<T> {
    blocks: Box<[UnsafeCell<T>]>,
    capacity: usize,
    len: AtomicUsize,
    i_write: UnsafeCell<usize>,
    i_read: UnsafeCell<usize>,
}

// SAFETY: `i_write`/the write half of `blocks` are touched only by the
// producer thread; `i_read`/the read half only by the consumer thread.
// `len` is the sole point of cross-thread communication and is always
// accessed through atomic operations with acquire/release ordering.
unsafe impl<T: Send> Sync for Spsc<T> {}
unsafe impl<T: Send> Send for Spsc<T> {}

impl<T: Default> Spsc<T> {
    pub fn new(capacity: usize) -> VertexResult<Self> {
        if capacity == 0 {
            return Err(VertexError::ZeroCapacityQueue);
        }
        let mut blocks = Vec::with_capacity(capacity);
        blocks.resize_with(capacity, || UnsafeCell::new(T::default()));
        Ok(Spsc {
            blocks: blocks.into_boxed_slice(),
            capacity,
            len: AtomicUsize::new(0),
            i_write: UnsafeCell::new(0),
            i_read: UnsafeCell::new(0),
        })
    }
}

impl<T> Spsc<T> {
    /// Producer-only. Returns a pointer to the next slot to write. Always
    /// valid; the caller is responsible for sizing capacity so the queue
    /// never actually wraps onto unread data.
    pub fn next_to_write(&self) -> *mut T {
        // SAFETY: only the producer thread calls this.
        let i = unsafe { *self.i_write.get() };
        self.blocks[i].get()
    }

    /// Producer-only. Publishes the slot written via `next_to_write`.
    pub fn commit_write(&self) {
        // SAFETY: only the producer thread touches `i_write`.
        let i_write = unsafe { &mut *self.i_write.get() };
        *i_write = (*i_write + 1) % self.capacity;
        self.len.fetch_add(1, Ordering::Release);
    }

    /// Consumer-only. Returns a pointer to the next slot to read, or
    /// `None` if the queue is empty.
    pub fn next_to_read(&self) -> Option<*const T> {
        if self.len.load(Ordering::Acquire) == 0 {
            return None;
        }
        // SAFETY: only the consumer thread calls this.
        let i = unsafe { *self.i_read.get() };
        Some(self.blocks[i].get() as *const T)
    }

    /// Consumer-only. Releases the slot returned by `next_to_read`. Fatal
    /// if called when the queue is empty.
    pub fn commit_read(&self) {
        // SAFETY: only the consumer thread touches `i_read`.
        let i_read = unsafe { &mut *self.i_read.get() };
        *i_read = (*i_read + 1) % self.capacity;
        let prev = self.len.fetch_sub(1, Ordering::AcqRel);
        assert!(prev != 0, "Spsc::commit_read: read past an empty queue");
    }

    pub fn size(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
