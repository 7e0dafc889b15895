//! The [`World`]: entity allocator plus one arena per component type.
//!
//! Components are reached through the [`Component`] trait, so callers write
//! `world.get::<Health>(id)` without knowing which arena backs it. Every
//! handle-based accessor checks liveness and generation first; a stale
//! handle reads as "no component" rather than aliasing a recycled slot.
//!
//! Iteration helpers walk arenas in slot order, which is the deterministic
//! order every system in the engine relies on.

use serde::{Deserialize, Serialize};

use crate::components::{Enemy, Health, Knockback, Position, Projectile, StatusEffects};
use crate::entity::{EntityAllocator, EntityId};
use crate::storage::ComponentArena;
use crate::EcsError;

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A type with a dedicated arena in the [`World`].
pub trait Component: Sized + 'static {
    /// Name used in errors and logs.
    const NAME: &'static str;

    fn arena(world: &World) -> &ComponentArena<Self>;
    fn arena_mut(world: &mut World) -> &mut ComponentArena<Self>;
}

macro_rules! component {
    ($ty:ty, $field:ident, $name:literal) => {
        impl Component for $ty {
            const NAME: &'static str = $name;

            #[inline]
            fn arena(world: &World) -> &ComponentArena<Self> {
                &world.$field
            }

            #[inline]
            fn arena_mut(world: &mut World) -> &mut ComponentArena<Self> {
                &mut world.$field
            }
        }
    };
}

component!(Position, positions, "position");
component!(Health, healths, "health");
component!(Knockback, knockbacks, "knockback");
component!(Enemy, enemies, "enemy");
component!(Projectile, projectiles, "projectile");
component!(StatusEffects, statuses, "status_effects");

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Owns every entity and component of a game session.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct World {
    entities: EntityAllocator,
    positions: ComponentArena<Position>,
    healths: ComponentArena<Health>,
    knockbacks: ComponentArena<Knockback>,
    enemies: ComponentArena<Enemy>,
    projectiles: ComponentArena<Projectile>,
    statuses: ComponentArena<StatusEffects>,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    // -- lifecycle ----------------------------------------------------------

    /// Allocate a handle with no components.
    pub fn spawn(&mut self) -> EntityId {
        self.entities.allocate()
    }

    /// Spawn a knockback-capable enemy at full health.
    pub fn spawn_enemy(&mut self, position: Position, max_health: f32, enemy: Enemy) -> EntityId {
        let id = self.spawn();
        let index = id.index();
        self.positions.insert(index, position);
        self.healths.insert(index, Health::new(max_health));
        self.knockbacks.insert(index, Knockback::default());
        self.enemies.insert(index, enemy);
        id
    }

    /// Spawn a projectile. Weapons normally go through a pool instead.
    pub fn spawn_projectile(&mut self, position: Position, projectile: Projectile) -> EntityId {
        let id = self.spawn();
        self.positions.insert(id.index(), position);
        self.projectiles.insert(id.index(), projectile);
        id
    }

    /// Remove every component and release the handle.
    pub fn despawn(&mut self, entity: EntityId) -> Result<(), EcsError> {
        self.strip(entity)?;
        self.entities.release(entity);
        Ok(())
    }

    /// Remove every component but keep the handle alive, so a pool can hand
    /// it out again without going through the allocator.
    pub fn strip(&mut self, entity: EntityId) -> Result<(), EcsError> {
        self.ensure_alive(entity)?;
        let index = entity.index();
        self.positions.remove(index);
        self.healths.remove(index);
        self.knockbacks.remove(index);
        self.enemies.remove(index);
        self.projectiles.remove(index);
        self.statuses.remove(index);
        Ok(())
    }

    /// Drop everything, including allocator generations.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.positions.clear();
        self.healths.clear();
        self.knockbacks.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.statuses.clear();
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live handles, including stripped (pooled) ones.
    pub fn entity_count(&self) -> usize {
        self.entities.live_count()
    }

    fn ensure_alive(&self, entity: EntityId) -> Result<(), EcsError> {
        if self.entities.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::StaleEntity { entity })
        }
    }

    // -- component access ---------------------------------------------------

    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        T::arena(self).get(entity.index())
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        T::arena_mut(self).get_mut(entity.index())
    }

    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Attach (or overwrite) a component, returning the old value.
    pub fn insert<T: Component>(
        &mut self,
        entity: EntityId,
        value: T,
    ) -> Result<Option<T>, EcsError> {
        self.ensure_alive(entity)?;
        Ok(T::arena_mut(self).insert(entity.index(), value))
    }

    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        T::arena_mut(self).remove(entity.index())
    }

    /// Fetch a component that the caller requires to be present.
    pub fn require<T: Component>(&self, entity: EntityId) -> Result<&T, EcsError> {
        self.ensure_alive(entity)?;
        T::arena(self)
            .get(entity.index())
            .ok_or(EcsError::MissingComponent {
                entity,
                component: T::NAME,
            })
    }

    // -- iteration ----------------------------------------------------------

    /// Live entities carrying `T`, in slot order.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        let entities = &self.entities;
        T::arena(self)
            .iter()
            .filter_map(move |(index, value)| entities.handle_at(index).map(|id| (id, value)))
    }

    /// Handles of live entities carrying `T`, collected so the caller may
    /// mutate the world while walking them.
    pub fn ids_with<T: Component>(&self) -> Vec<EntityId> {
        self.iter::<T>().map(|(id, _)| id).collect()
    }

    /// Number of live entities carrying `T`.
    pub fn count<T: Component>(&self) -> usize {
        T::arena(self).len()
    }

    /// Enemies that can still be hit: positioned, with health above zero.
    pub fn living_enemies(&self) -> impl Iterator<Item = (EntityId, &Position, &Enemy, &Health)> {
        self.iter::<Enemy>().filter_map(move |(id, enemy)| {
            let index = id.index();
            let pos = self.positions.get(index)?;
            let health = self.healths.get(index)?;
            (!health.is_depleted()).then_some((id, pos, enemy, health))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
