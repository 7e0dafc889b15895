//! Records the combat core hands back to the rest of the game.
//!
//! Instead of invoking a registered callback, the resolver and the status
//! processor push records into a [`CombatEvents`] queue. The simulation
//! loop drains it once per tick and every interested system (loot drops,
//! damage numbers, the player's health) reads the same list.

use horde_ecs::components::Position;
use horde_ecs::entity::EntityId;
use serde::{Deserialize, Serialize};

/// Periodic damage sources handled by the status processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Burn,
    Poison,
}

/// What dealt the killing damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// A projectile hit.
    Projectile(EntityId),
    /// Overkill damage splashed from another kill.
    OverkillSplash { source: EntityId },
    /// Periodic status damage.
    Status(StatusKind),
    /// A weapon used the direct damage hook.
    Direct,
}

/// An enemy died this tick. Emitted once per enemy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub enemy: EntityId,
    /// Last known position, for drops and death effects.
    pub position: Position,
    pub cause: DeathCause,
}

/// A single damage instance, for damage numbers and hit sparks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    pub enemy: EntityId,
    pub damage: f32,
    pub crit: bool,
    /// Crit whose variance roll landed at the top of the range. Only changes
    /// the damage number's colour.
    pub perfect_crit: bool,
    /// Direction of the hit in radians, for the spark sprite.
    pub angle: f32,
    pub splash: bool,
}

/// One periodic damage tick from a status effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusTick {
    pub enemy: EntityId,
    pub kind: StatusKind,
    pub damage: f32,
}

/// Healing owed to the player (life steal or an explicit heal hook).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealRequest {
    pub amount: f32,
}

// ---------------------------------------------------------------------------
// CombatEvents
// ---------------------------------------------------------------------------

/// Everything the combat core produced during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatEvents {
    pub deaths: Vec<DeathRecord>,
    pub hits: Vec<HitRecord>,
    pub status_ticks: Vec<StatusTick>,
    pub heals: Vec<HealRequest>,
    /// Projectiles handed back to the pool.
    pub recycled: Vec<EntityId>,
}

impl CombatEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.deaths.is_empty()
            && self.hits.is_empty()
            && self.status_ticks.is_empty()
            && self.heals.is_empty()
            && self.recycled.is_empty()
    }

    /// Sum of every heal request.
    pub fn total_healing(&self) -> f32 {
        self.heals.iter().map(|h| h.amount).sum()
    }

    /// Move everything out, leaving the queue empty.
    pub fn drain(&mut self) -> CombatEvents {
        CombatEvents {
            deaths: std::mem::take(&mut self.deaths),
            hits: std::mem::take(&mut self.hits),
            status_ticks: std::mem::take(&mut self.status_ticks),
            heals: std::mem::take(&mut self.heals),
            recycled: std::mem::take(&mut self.recycled),
        }
    }

    /// Append another batch, preserving order.
    pub fn extend(&mut self, other: CombatEvents) {
        self.deaths.extend(other.deaths);
        self.hits.extend(other.hits);
        self.status_ticks.extend(other.status_ticks);
        self.heals.extend(other.heals);
        self.recycled.extend(other.recycled);
    }

    pub fn clear(&mut self) {
        self.deaths.clear();
        self.hits.clear();
        self.status_ticks.clear();
        self.heals.clear();
        self.recycled.clear();
    }
}
