// vertex_core/src/pool.rs
//
// Fixed-capacity object pool. Allocates and frees blocks of a single type
// `T` from a pre-sized arena without ever touching the system allocator
// once constructed. Grounded on the exchange's `LL::MemPool<T>`
// (order_pool, orders_at_price_pool in ome_order_book.h), reshaped to hand
// out stable indices instead of raw pointers so the book can hold links as
// plain `usize`s.

use crate::error::{PoolError, PoolResult};

/// Sentinel index meaning "no slot" — analogous to the `_INVALID` id
/// sentinels, but scoped to pool-internal linkage.
pub const NIL: usize = usize::MAX;

struct Slot<T> {
    value: Option<T>,
}

/// A fixed-capacity arena of `T`. `allocate` and `deallocate` are O(1) and
/// never grow the backing storage past the capacity given at construction.
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    cursor: usize,
    n_used: usize,
}

impl<T> Pool<T> {
    pub fn new(capacity: usize) -> PoolResult<Self> {
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot { value: None });
        Ok(Pool {
            slots,
            cursor: 0,
            n_used: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.n_used
    }

    pub fn is_empty(&self) -> bool {
        self.n_used == 0
    }

    /// Construct `value` in a free slot and return its stable index.
    ///
    /// Fatal if the pool is exhausted: capacities are sized for the
    /// worst case the caller configured, so exhaustion here means a
    /// configuration defect, not a recoverable runtime condition.
    pub fn allocate(&mut self, value: T) -> usize {
        let capacity = self.slots.len();
        assert!(
            self.n_used < capacity,
            "Pool::allocate: exhausted (capacity={capacity})"
        );
        let start = self.cursor;
        loop {
            if self.slots[self.cursor].value.is_none() {
                break;
            }
            self.cursor = (self.cursor + 1) % capacity;
            assert!(
                self.cursor != start || self.n_used == 0,
                "Pool::allocate: no free slot found despite n_used < capacity"
            );
        }
        let index = self.cursor;
        self.slots[index].value = Some(value);
        self.cursor = (self.cursor + 1) % capacity;
        self.n_used += 1;
        index
    }

    /// Destroy the value at `index`, returning it to the free list.
    ///
    /// Fatal on double-free or an out-of-range index: both indicate a
    /// broken index graph upstream.
    pub fn deallocate(&mut self, index: usize) -> T {
        let slot = self
            .slots
            .get_mut(index)
            .unwrap_or_else(|| panic!("Pool::deallocate: index {index} out of range"));
        let value = slot
            .value
            .take()
            .unwrap_or_else(|| panic!("Pool::deallocate: double free at index {index}"));
        self.n_used -= 1;
        value
    }

    pub fn get(&self, index: usize) -> &T {
        self.slots[index]
            .value
            .as_ref()
            .unwrap_or_else(|| panic!("Pool::get: index {index} is not allocated"))
    }

    pub fn get_mut(&mut self, index: usize) -> &mut T {
        self.slots[index]
            .value
            .as_mut()
            .unwrap_or_else(|| panic!("Pool::get_mut: index {index} is not allocated"))
    }
}
