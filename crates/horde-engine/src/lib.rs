//! Horde Engine -- combat core for a survivors-style swarm game.
//!
//! This crate builds on [`horde_ecs`] to resolve what happens when hundreds
//! of projectiles meet thousands of enemies every frame: a uniform-grid
//! spatial hash rebuilt once per tick, a frame cache that is its only
//! writer, a collision resolver with crit, execution, shatter, armor,
//! knockback, procs, life steal and overkill splash, and a status processor
//! for burn, freeze, poison and chain immunity.
//!
//! Results come back as a [`CombatEvents`](events::CombatEvents) queue in
//! each [`TickReport`](tick::TickReport) instead of through callbacks.
//!
//! # Quick Start
//!
//! ```
//! use horde_engine::prelude::*;
//!
//! let mut sim = Simulation::new(CombatConfig::default()).unwrap();
//! let brute = sim.spawn_enemy(Position::new(0.0, 0.0), 30.0, Enemy::new(12.0));
//! sim.fire(Position::new(0.0, 0.0), Projectile::new(50.0, 1000.0, 0, 5.0));
//!
//! let stats = CombatStats { overkill_splash: 0.5, ..CombatStats::default() };
//! let report = sim.step(16.0, &stats);
//!
//! assert_eq!(report.resolve.hits, 1);
//! assert_eq!(report.events.deaths[0].enemy, brute);
//! ```

#![deny(unsafe_code)]

pub mod combat;
pub mod config;
pub mod events;
pub mod frame_cache;
pub mod pool;
pub mod snapshot;
pub mod spatial;
pub mod stats;
pub mod status;
pub mod tick;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use horde_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use horde_ecs::prelude::*;

    pub use crate::combat::{roll_crit, CombatResolver, CritRoll, ResolveSummary};
    pub use crate::config::{CombatConfig, ConfigError, Playfield, StatusConfig};
    pub use crate::events::{
        CombatEvents, DeathCause, DeathRecord, HealRequest, HitRecord, StatusKind, StatusTick,
    };
    pub use crate::frame_cache::{CacheState, FrameCache};
    pub use crate::pool::ProjectilePool;
    pub use crate::snapshot::StateSnapshot;
    pub use crate::spatial::{SpatialEntry, SpatialHash};
    pub use crate::stats::CombatStats;
    pub use crate::status::StatusProcessor;
    pub use crate::tick::{Simulation, TickDiagnostics, TickReport};
}
