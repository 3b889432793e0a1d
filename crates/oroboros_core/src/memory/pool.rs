//! # Slot Pool
//!
//! Generational free-list over values that are created once and recycled.

/// A pool of pre-created values that are checked out and returned.
///
/// Unlike an allocator, values are never dropped when released: a slot
/// keeps its value for the lifetime of the pool and only flips between
/// *free* and *in use*. Every checkout bumps the slot's generation, so a
/// handle from an earlier checkout can never reach the current one.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Use one pool per thread or wrap in a mutex.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: SlotPool<Shadow> = SlotPool::with_capacity(16);
/// pool.prefill(16, |_| Shadow::default());
///
/// // Checkout - O(1), no heap allocation
/// let handle = pool.checkout().unwrap();
///
/// // Return - O(1)
/// pool.release(handle);
/// ```
pub struct SlotPool<T> {
    /// Slot storage. Never shrinks.
    slots: Vec<Slot<T>>,
    /// Indices of free slots. The last entry is handed out first.
    free_list: Vec<u32>,
    /// Number of slots currently checked out.
    in_use: usize,
}

struct Slot<T> {
    value: T,
    generation: u32,
    in_use: bool,
}

/// Handle to one checkout of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotHandle {
    index: u32,
    generation: u32,
}

impl SlotHandle {
    /// Index of the slot.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the checkout this handle refers to.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl<T> SlotPool<T> {
    /// Creates an empty pool with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::with_capacity(capacity),
            in_use: 0,
        }
    }

    /// Appends `count` free slots, building each value from its index.
    pub fn prefill(&mut self, count: usize, mut make: impl FnMut(u32) -> T) {
        self.slots.reserve(count);
        let start = self.slots.len();
        for offset in 0..count {
            let index = slot_index(start + offset);
            self.slots.push(Slot {
                value: make(index),
                generation: 0,
                in_use: false,
            });
        }
        // Lowest index first out.
        self.free_list.extend((start..start + count).rev().map(slot_index));
    }

    /// Appends a single free slot and returns its index.
    pub fn push(&mut self, value: T) -> u32 {
        let index = slot_index(self.slots.len());
        self.slots.push(Slot {
            value,
            generation: 0,
            in_use: false,
        });
        self.free_list.push(index);
        index
    }

    /// Total number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently checked out.
    #[inline]
    #[must_use]
    pub const fn in_use_count(&self) -> usize {
        self.in_use
    }

    /// Number of free slots.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Checks out a free slot.
    ///
    /// This is a **O(1)** operation with **zero heap allocations**.
    ///
    /// # Returns
    ///
    /// A handle to the slot, or None if every slot is in use.
    pub fn checkout(&mut self) -> Option<SlotHandle> {
        let index = self.free_list.pop()?;
        let slot = &mut self.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.in_use = true;
        self.in_use += 1;

        Some(SlotHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Forcibly re-checks out a slot that is already in use.
    ///
    /// The previous handle for the slot becomes stale.
    ///
    /// # Returns
    ///
    /// The new handle, or None if the slot does not exist or is free.
    pub fn reclaim(&mut self, index: u32) -> Option<SlotHandle> {
        let slot = self.slots.get_mut(index as usize)?;
        if !slot.in_use {
            return None;
        }
        slot.generation = slot.generation.wrapping_add(1);

        Some(SlotHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Returns a checked-out slot to the free list.
    ///
    /// # Returns
    ///
    /// The slot's value, or None if the handle is stale or already released.
    pub fn release(&mut self, handle: SlotHandle) -> Option<&mut T> {
        if !self.is_live(handle) {
            return None;
        }
        let slot = &mut self.slots[handle.index as usize];
        slot.in_use = false;
        self.free_list.push(handle.index);
        self.in_use -= 1;

        Some(&mut slot.value)
    }

    /// Whether `handle` refers to the current checkout of its slot.
    #[inline]
    #[must_use]
    pub fn is_live(&self, handle: SlotHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|slot| slot.in_use && slot.generation == handle.generation)
    }

    /// Gets a reference to a checked-out value.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: SlotHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        (slot.in_use && slot.generation == handle.generation).then_some(&slot.value)
    }

    /// Gets a mutable reference to a checked-out value.
    #[inline]
    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        (slot.in_use && slot.generation == handle.generation).then_some(&mut slot.value)
    }

    /// Iterates over checked-out values with their current handles.
    pub fn iter_in_use(&self) -> impl Iterator<Item = (SlotHandle, &T)> {
        self.slots.iter().enumerate().filter(|(_, slot)| slot.in_use).map(|(index, slot)| {
            (
                SlotHandle {
                    index: slot_index(index),
                    generation: slot.generation,
                },
                &slot.value,
            )
        })
    }

    /// Iterates over every value, free or not.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map(|slot| &slot.value)
    }

    /// Iterates mutably over every value, free or not.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().map(|slot| &mut slot.value)
    }

    /// Returns every slot to the free list. Values are kept.
    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            slot.in_use = false;
        }
        self.free_list.clear();
        self.free_list.extend((0..self.slots.len()).rev().map(slot_index));
        self.in_use = 0;
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
const fn slot_index(index: usize) -> u32 {
    index as u32
}
