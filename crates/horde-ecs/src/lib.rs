//! Horde ECS -- slot-arena entity store for the Horde combat core.
//!
//! Entities are generational [`EntityId`](entity::EntityId) handles with no
//! intrinsic type. Each component type lives in its own
//! [`ComponentArena`](storage::ComponentArena), a `Vec<Option<T>>` indexed by
//! the handle's slot, so "does this entity have a status record?" is a single
//! `Option` check. Removals during a system pass are deferred through the
//! [`CommandBuffer`](command::CommandBuffer).
//!
//! # Quick Start
//!
//! ```
//! use horde_ecs::prelude::*;
//!
//! let mut world = World::new();
//! let enemy = world.spawn_enemy(Position::new(10.0, 4.0), 25.0, Enemy::new(12.0));
//!
//! world.get_mut::<Health>(enemy).unwrap().current -= 30.0;
//! assert!(world.get::<Health>(enemy).unwrap().is_depleted());
//! assert_eq!(world.get::<Health>(enemy).unwrap().display(), 0.0);
//! ```

#![deny(unsafe_code)]

pub mod command;
pub mod components;
pub mod entity;
pub mod storage;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by handle-based world operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The handle is stale (despawned, or its slot was reused).
    #[error("entity {entity:?} does not exist (stale or never allocated)")]
    StaleEntity { entity: entity::EntityId },

    /// The entity is alive but lacks a component the caller required.
    #[error("entity {entity:?} has no '{component}' component")]
    MissingComponent {
        entity: entity::EntityId,
        component: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::command::{ApplyReport, CausalReason, Command, CommandBuffer, CommandKind};
    pub use crate::components::{
        BurnEffect, Enemy, FreezeEffect, Health, Knockback, PoisonEffect, Position, Projectile,
        StatusEffects,
    };
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::storage::ComponentArena;
    pub use crate::world::{Component, World};
    pub use crate::EcsError;
}
