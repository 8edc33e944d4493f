//! Fixed-capacity entity pool.
//!
//! Slots live in a generational arena that is sized once and never grows, so
//! a full pool simply refuses new entities.  Handles stay valid until the
//! entity is released; a released slot goes back on the arena's free list.

use generational_arena::{Arena, Index};

/// Stable reference to a pooled entity.
pub type Handle = Index;

#[derive(Clone, Debug)]
pub struct Pool<T> {
    slots: Arena<T>,
}

impl<T> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Arena::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Store `value` in a free slot.  `None` when every slot is taken; the
    /// value is dropped.
    pub fn insert(&mut self, value: T) -> Option<Handle> {
        self.slots.try_insert(value).ok()
    }

    /// Get-or-null allocation: build a fresh entity with `make` and hand it
    /// back for activation, or `None` if the pool is exhausted (`make` is not
    /// called in that case).
    pub fn acquire(&mut self, make: impl FnOnce() -> T) -> Option<(Handle, &mut T)> {
        if self.is_full() {
            return None;
        }
        let handle = self.insert(make())?;
        self.slots.get_mut(handle).map(|value| (handle, value))
    }

    /// Return an entity's slot to the free list.
    pub fn release(&mut self, handle: Handle) -> Option<T> {
        self.slots.remove(handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots.get_mut(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map(|(_, value)| value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().map(|(_, value)| value)
    }

    /// Release every entity for which `keep` returns false.  Returns how many
    /// were released.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, value| keep(value));
        before - self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
