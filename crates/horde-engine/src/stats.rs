//! The player's combat stats, as seen by the resolver for one tick.
//!
//! The player-state side of the game owns these numbers and hands a fresh
//! [`CombatStats`] to [`Simulation::step`](crate::tick::Simulation::step)
//! every tick. The combat core only reads it.

use serde::{Deserialize, Serialize};

/// Read-only snapshot of every stat the resolver consults.
///
/// Chances are probabilities in `[0, 1]`. Bonus percentages are fractions:
/// `execution_bonus = 0.5` means +50% damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStats {
    pub crit_chance: f32,
    /// Damage multiplier on a crit, before variance.
    pub crit_damage: f32,

    pub burn_chance: f32,
    pub burn_damage: f32,
    pub burn_duration_ms: f32,
    pub burn_damage_multiplier: f32,

    pub freeze_chance: f32,
    /// Speed multiplier while frozen; lower is stronger.
    pub freeze_slow: f32,
    pub freeze_duration_ms: f32,
    pub freeze_duration_multiplier: f32,

    pub poison_chance: f32,
    pub poison_stacks: u32,
    pub poison_duration_ms: f32,
    pub poison_max_stacks: u32,

    /// Bonus against targets below the execution threshold.
    pub execution_bonus: f32,
    /// Bonus against slowed targets.
    pub shatter_bonus: f32,
    /// Fraction of overkill damage splashed onto nearby enemies.
    pub overkill_splash: f32,
    /// Fraction of enemy armor ignored.
    pub armor_pen: f32,
    pub knockback_multiplier: f32,
    /// Fraction of hit damage returned to the player as healing.
    pub life_steal: f32,
}

impl Default for CombatStats {
    /// A character with no upgrades: no crits, procs or bonuses.
    fn default() -> Self {
        Self {
            crit_chance: 0.0,
            crit_damage: 2.0,
            burn_chance: 0.0,
            burn_damage: 3.0,
            burn_duration_ms: 2000.0,
            burn_damage_multiplier: 1.0,
            freeze_chance: 0.0,
            freeze_slow: 0.5,
            freeze_duration_ms: 1500.0,
            freeze_duration_multiplier: 1.0,
            poison_chance: 0.0,
            poison_stacks: 1,
            poison_duration_ms: 3000.0,
            poison_max_stacks: 5,
            execution_bonus: 0.0,
            shatter_bonus: 0.0,
            overkill_splash: 0.0,
            armor_pen: 0.0,
            knockback_multiplier: 1.0,
            life_steal: 0.0,
        }
    }
}
