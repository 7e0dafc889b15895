//! Component types of the combat simulation.
//!
//! Entities are aggregates: an enemy is any handle carrying [`Enemy`],
//! [`Position`] and [`Health`]; a live projectile is any handle carrying
//! [`Projectile`] and [`Position`]. Optional extras such as [`Knockback`] and
//! [`StatusEffects`] are checked for presence once at each access site.
//!
//! All durations are milliseconds.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// World-space position. Written by movement, read by every spatial query.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared distance to `other`. No square root.
    #[inline]
    pub fn distance_squared(&self, other: &Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Current and maximum hit points.
///
/// `current` may go below zero for the remainder of a tick; that is the kill
/// signal. Anything shown to the player goes through [`Health::display`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    /// Full health.
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Current health clamped at zero.
    pub fn display(&self) -> f32 {
        self.current.max(0.0)
    }

    /// `current / max`, or 0 when `max` is not positive.
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

// ---------------------------------------------------------------------------
// Knockback
// ---------------------------------------------------------------------------

/// Transient push velocity. Combat only adds to it; decay belongs to the
/// movement system.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Knockback {
    pub vx: f32,
    pub vy: f32,
}

impl Knockback {
    /// Accumulate an impulse. Simultaneous hits compound.
    pub fn push(&mut self, vx: f32, vy: f32) {
        self.vx += vx;
        self.vy += vy;
    }
}

// ---------------------------------------------------------------------------
// Enemy
// ---------------------------------------------------------------------------

/// Marks a handle as a hostile combat target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Collision radius.
    pub radius: f32,
    /// Fraction of incoming hit damage mitigated, in `[0, 1]`.
    pub armor: f32,
}

impl Enemy {
    pub fn new(radius: f32) -> Self {
        Self { radius, armor: 0.0 }
    }

    pub fn with_armor(mut self, armor: f32) -> Self {
        self.armor = armor.clamp(0.0, 1.0);
        self
    }
}

// ---------------------------------------------------------------------------
// Projectile
// ---------------------------------------------------------------------------

/// A live projectile fired by some weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub damage: f32,
    /// Time left before the projectile is recycled.
    pub lifetime_ms: f32,
    /// How many more enemies it may pass through after the next hit.
    pub piercing: u32,
    /// Collision radius.
    pub radius: f32,
    /// Travel velocity in units per second.
    pub vx: f32,
    pub vy: f32,
    /// Enemies already damaged by this projectile. A piercing shot never
    /// hits the same enemy twice.
    pub hits: Vec<EntityId>,
}

impl Projectile {
    pub fn new(damage: f32, lifetime_ms: f32, piercing: u32, radius: f32) -> Self {
        Self {
            damage,
            lifetime_ms,
            piercing,
            radius,
            vx: 0.0,
            vy: 0.0,
            hits: Vec::new(),
        }
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    pub fn has_hit(&self, enemy: EntityId) -> bool {
        self.hits.contains(&enemy)
    }
}

// ---------------------------------------------------------------------------
// Status effects
// ---------------------------------------------------------------------------

/// Damage over time. Inactive when `damage_per_tick` is zero.
///
/// Tick `k` falls due at `k * interval` after the first application and
/// counts only if that is no later than `expires_at_ms`. Both sides of that
/// comparison are exact, so the number of ticks does not depend on how the
/// elapsed time was sliced into frames.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BurnEffect {
    pub damage_per_tick: f32,
    /// Time since the burn started.
    pub elapsed_ms: f32,
    /// Value of `elapsed_ms` at which the burn ends.
    pub expires_at_ms: f32,
    /// Damage ticks dealt so far.
    pub ticks: u32,
}

impl BurnEffect {
    pub fn is_active(&self) -> bool {
        self.damage_per_tick > 0.0 && self.elapsed_ms < self.expires_at_ms
    }

    pub fn remaining_ms(&self) -> f32 {
        (self.expires_at_ms - self.elapsed_ms).max(0.0)
    }
}

/// Movement slow. `slow_multiplier` of 0 is a full stop (stun); 1 is no slow.
/// Only an active freeze slows; an expired one keeps a zeroed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreezeEffect {
    pub slow_multiplier: f32,
    pub remaining_ms: f32,
}

impl Default for FreezeEffect {
    fn default() -> Self {
        Self {
            slow_multiplier: 1.0,
            remaining_ms: 0.0,
        }
    }
}

impl FreezeEffect {
    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0.0
    }
}

/// Stacking damage over time. Inactive when `stacks` is zero. Ticks are
/// scheduled like [`BurnEffect`] ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoisonEffect {
    pub stacks: u32,
    pub elapsed_ms: f32,
    pub expires_at_ms: f32,
    pub ticks: u32,
}

impl PoisonEffect {
    pub fn is_active(&self) -> bool {
        self.stacks > 0 && self.elapsed_ms < self.expires_at_ms
    }

    pub fn remaining_ms(&self) -> f32 {
        (self.expires_at_ms - self.elapsed_ms).max(0.0)
    }
}

/// Every timed effect an entity can carry. Expired effects stay in the
/// record with their magnitude zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusEffects {
    pub burn: BurnEffect,
    pub freeze: FreezeEffect,
    pub poison: PoisonEffect,
    /// While positive, chain effects may not jump to this entity.
    pub chain_immunity_ms: f32,
}

impl StatusEffects {
    /// Whether any timer still needs advancing.
    pub fn any_active(&self) -> bool {
        self.burn.is_active()
            || self.freeze.is_active()
            || self.poison.is_active()
            || self.chain_immunity_ms > 0.0
    }

    /// Movement speed factor to apply this tick.
    pub fn speed_multiplier(&self) -> f32 {
        if self.freeze.is_active() {
            self.freeze.slow_multiplier
        } else {
            1.0
        }
    }

    /// Slowed or stunned by an active freeze.
    pub fn is_slowed(&self) -> bool {
        self.speed_multiplier() < 1.0
    }
}
