//! BLAKE3 state hashing for determinism checks.
//!
//! The hash covers the serialized [`World`] and the tick counter. Two
//! sessions built from the same config, fed the same spawns, stats and `dt`
//! sequence, produce the same hash on every tick.
//!
//! ```
//! use horde_engine::prelude::*;
//!
//! let run = || {
//!     let mut sim = Simulation::new(CombatConfig::default()).unwrap();
//!     sim.spawn_enemy(Position::new(0.0, 0.0), 30.0, Enemy::new(10.0));
//!     sim.fire(Position::new(0.0, 0.0), Projectile::new(12.0, 500.0, 0, 5.0));
//!     sim.run_steps(10, 16.0, &CombatStats::default());
//!     sim.state_hash().unwrap()
//! };
//! assert_eq!(run(), run());
//! assert_eq!(run().len(), 64); // hex digest
//! ```
//!
//! # What is not hashed
//!
//! - **Caches and scratch buffers**: rebuilt every step from the world.
//! - **RNG state**: only observable through the world it has already shaped.
//! - **Diagnostics**: wall-clock timings differ between runs.

use horde_ecs::world::World;
use serde::{Deserialize, Serialize};

use crate::tick::Simulation;

/// The hashed portion of a session, serializable for offline comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub tick: u64,
    pub world: World,
    /// BLAKE3 hex digest of `tick` and `world`.
    pub hash: String,
}

/// Hex BLAKE3 digest of `world` at `tick`.
pub fn compute_hash(world: &World, tick: u64) -> Result<String, serde_json::Error> {
    #[derive(Serialize)]
    struct Hashable<'a> {
        tick: u64,
        world: &'a World,
    }

    let bytes = serde_json::to_vec(&Hashable { tick, world })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

impl Simulation {
    /// Hash of the current world and tick counter.
    pub fn state_hash(&self) -> Result<String, serde_json::Error> {
        compute_hash(self.world(), self.tick_count())
    }

    /// Clone the hashed state together with its digest.
    pub fn capture_snapshot(&self) -> Result<StateSnapshot, serde_json::Error> {
        Ok(StateSnapshot {
            tick: self.tick_count(),
            world: self.world().clone(),
            hash: self.state_hash()?,
        })
    }
}

impl StateSnapshot {
    /// Whether `hash` still matches the stored world and tick.
    pub fn verify(&self) -> bool {
        compute_hash(&self.world, self.tick).is_ok_and(|h| h == self.hash)
    }
}
