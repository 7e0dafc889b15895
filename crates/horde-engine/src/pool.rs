//! Projectile handle pool.
//!
//! Expired or spent projectiles are stripped of their components but keep
//! their [`EntityId`]. The pool hands those handles back out on the next
//! shot, so steady-state firing does not touch the allocator.

use horde_ecs::components::{Position, Projectile};
use horde_ecs::entity::EntityId;
use horde_ecs::world::World;
use horde_ecs::EcsError;
use tracing::warn;

/// Free list of stripped projectile handles.
#[derive(Debug, Default, Clone)]
pub struct ProjectilePool {
    free: Vec<EntityId>,
    spawned: u64,
    reused: u64,
}

impl ProjectilePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `count` stripped handles up front.
    pub fn prewarm(&mut self, world: &mut World, count: usize) {
        self.free.reserve(count);
        for _ in 0..count {
            let id = world.spawn();
            self.free.push(id);
        }
    }

    /// Fire a projectile, reusing a pooled handle when one is available.
    pub fn acquire(
        &mut self,
        world: &mut World,
        position: Position,
        projectile: Projectile,
    ) -> EntityId {
        while let Some(id) = self.free.pop() {
            // Handles can go stale if the world was cleared behind our back.
            if !world.is_alive(id) || world.has::<Projectile>(id) {
                warn!(entity = %id, "pooled projectile handle no longer reusable; dropped");
                continue;
            }
            let placed = world
                .insert(id, position)
                .and_then(|_| world.insert(id, projectile.clone()));
            if placed.is_ok() {
                self.reused += 1;
                return id;
            }
        }
        self.spawned += 1;
        world.spawn_projectile(position, projectile)
    }

    /// Strip `id` and keep its handle for reuse.
    pub fn recycle(&mut self, world: &mut World, id: EntityId) -> Result<(), EcsError> {
        world.strip(id)?;
        self.free.push(id);
        Ok(())
    }

    /// Take back handles that were already stripped by a
    /// [`CommandBuffer`](horde_ecs::command::CommandBuffer) pass.
    pub fn reclaim(&mut self, ids: &[EntityId]) {
        self.free.extend_from_slice(ids);
    }

    /// Handles waiting to be reused.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// `(freshly spawned, reused)` acquisition counts.
    pub fn acquisitions(&self) -> (u64, u64) {
        (self.spawned, self.reused)
    }

    /// Forget every pooled handle. Used on a new game, together with
    /// clearing the world.
    pub fn reset(&mut self) {
        self.free.clear();
        self.spawned = 0;
        self.reused = 0;
    }
}
