//! Entity handles and their allocator.
//!
//! An [`EntityId`] is a small integer handle with no intrinsic type. What an
//! entity *is* (enemy, projectile, ...) is decided by which component arenas
//! hold a value for it. Each handle also carries a *generation* so that a
//! handle kept past despawn is detected instead of silently aliasing whatever
//! entity later reuses the same slot.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A generational entity handle.
///
/// Ordering is by `(index, generation)`, which matches slot order and gives
/// the simulation a stable iteration order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Build a handle from its parts.
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index into the component arenas.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// How many times the slot has been recycled before this handle.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Hands out [`EntityId`]s and takes them back.
///
/// Released indices go to the back of a FIFO queue, so a slot is reused only
/// after every older free slot has been, which keeps generation churn spread
/// over the whole table.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EntityAllocator {
    slots: Vec<Slot>,
    free: VecDeque<u32>,
    live: usize,
}

impl EntityAllocator {
    /// Create an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle, reusing a released slot when one is available.
    pub fn allocate(&mut self) -> EntityId {
        self.live += 1;
        match self.free.pop_front() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.alive = true;
                EntityId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    alive: true,
                });
                EntityId::new(index, 0)
            }
        }
    }

    /// Release a handle. The slot's generation is bumped so every copy of
    /// `id` still held elsewhere becomes stale.
    ///
    /// Returns `false` if `id` was already stale or released.
    pub fn release(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let slot = &mut self.slots[id.index() as usize];
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push_back(id.index());
        self.live -= 1;
        true
    }

    /// Whether `id` names a live entity of the current generation.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.slots
            .get(id.index() as usize)
            .is_some_and(|slot| slot.alive && slot.generation == id.generation())
    }

    /// The live handle currently occupying `index`, if any.
    pub fn handle_at(&self, index: u32) -> Option<EntityId> {
        let slot = self.slots.get(index as usize)?;
        slot.alive.then(|| EntityId::new(index, slot.generation))
    }

    /// Number of live entities.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Number of slots ever created (live or free).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Forget every entity, including generations. Used on a new game.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_handles_have_distinct_indices() {
        let mut alloc = EntityAllocator::new();
        let mut indices: Vec<u32> = (0..64).map(|_| alloc.allocate().index()).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 64);
        assert_eq!(alloc.live_count(), 64);
    }

    #[test]
    fn released_slot_comes_back_with_new_generation() {
        let mut alloc = EntityAllocator::new();
        let first = alloc.allocate();
        assert!(alloc.release(first));
        let second = alloc.allocate();
        assert_eq!(second.index(), first.index());
        assert_eq!(second.generation(), first.generation() + 1);
        assert!(!alloc.is_alive(first), "old handle must be stale");
        assert!(alloc.is_alive(second));
    }

    #[test]
    fn release_is_not_repeatable() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        assert!(alloc.release(e));
        assert!(!alloc.release(e));
        assert_eq!(alloc.live_count(), 0);
    }

    #[test]
    fn free_slots_are_reused_oldest_first() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        alloc.release(b);
        alloc.release(a);
        assert_eq!(alloc.allocate().index(), b.index());
        assert_eq!(alloc.allocate().index(), a.index());
    }

    #[test]
    fn handle_at_reports_only_live_slots() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        assert_eq!(alloc.handle_at(e.index()), Some(e));
        alloc.release(e);
        assert_eq!(alloc.handle_at(e.index()), None);
        assert_eq!(alloc.handle_at(99), None);
    }
}
