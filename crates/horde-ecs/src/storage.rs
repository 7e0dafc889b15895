//! Per-component slot storage.
//!
//! A [`ComponentArena`] is a dense `Vec<Option<T>>` indexed by
//! [`EntityId::index`](crate::entity::EntityId::index). `Some` means the
//! entity carries the component. Liveness and generation checks are the
//! [`World`](crate::world::World)'s job; the arena only knows slots.

use serde::{Deserialize, Serialize};

/// Optional component value per entity slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentArena<T> {
    slots: Vec<Option<T>>,
    len: usize,
}

impl<T> Default for ComponentArena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
        }
    }
}

impl<T> ComponentArena<T> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` at `index`, returning the previous value if there was one.
    pub fn insert(&mut self, index: u32, value: T) -> Option<T> {
        let index = index as usize;
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        let previous = self.slots[index].replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Take the value at `index` out of the arena.
    pub fn remove(&mut self, index: u32) -> Option<T> {
        let taken = self.slots.get_mut(index as usize)?.take();
        if taken.is_some() {
            self.len -= 1;
        }
        taken
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<&T> {
        self.slots.get(index as usize)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.slots.get_mut(index as usize)?.as_mut()
    }

    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        self.get(index).is_some()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Occupied slots in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i as u32, v)))
    }

    /// Occupied slots in ascending index order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|v| (i as u32, v)))
    }

    /// Drop every value. Keeps the allocation; serializes like a fresh arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.len = 0;
    }
}
