//! Tunable constants for the combat core.
//!
//! Every field has a default matching the shipped game balance, so a JSON
//! config only needs to name what it overrides:
//!
//! ```
//! use horde_engine::config::CombatConfig;
//!
//! let cfg = CombatConfig::from_json_str(r#"{ "cell_size": 64.0, "seed": 7 }"#).unwrap();
//! assert_eq!(cfg.cell_size, 64.0);
//! assert_eq!(cfg.status.burn_interval_ms, 500.0);
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Why a configuration was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON could not be parsed into a config.
    #[error("failed to parse combat config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the simulation cannot run with.
    #[error("invalid combat config: {field} = {value} ({requirement})")]
    Invalid {
        field: &'static str,
        value: f64,
        requirement: &'static str,
    },
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            value: value as f64,
            requirement: "must be positive and finite",
        })
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            value: value as f64,
            requirement: "must lie in [0, 1]",
        })
    }
}

// ---------------------------------------------------------------------------
// Playfield
// ---------------------------------------------------------------------------

/// Axis-aligned region projectiles are allowed to occupy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            min_x: -2048.0,
            min_y: -2048.0,
            max_x: 2048.0,
            max_y: 2048.0,
        }
    }
}

impl Playfield {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

// ---------------------------------------------------------------------------
// StatusConfig
// ---------------------------------------------------------------------------

/// Cadence of periodic status damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Time between burn damage ticks.
    pub burn_interval_ms: f32,
    /// Time between poison damage ticks.
    pub poison_interval_ms: f32,
    /// Poison damage per stack per tick.
    pub poison_damage_per_stack: f32,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            burn_interval_ms: 500.0,
            poison_interval_ms: 400.0,
            poison_damage_per_stack: 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// CombatConfig
// ---------------------------------------------------------------------------

/// Constants used by the spatial hash, the resolver and the status processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Spatial hash cell edge. Matches the most common query radius.
    pub cell_size: f32,
    /// Largest enemy radius, used to size projectile broad-phase queries.
    pub max_enemy_radius: f32,
    /// Slack added to broad-phase query radii.
    pub query_buffer: f32,
    /// Knockback impulse per hit before the stat multiplier.
    pub knockback_force: f32,
    /// Radius of overkill splash around a killed enemy.
    pub overkill_splash_radius: f32,
    /// Health fraction below which the execution bonus applies.
    pub execution_threshold: f32,
    /// Lower bound of the crit damage variance roll (upper bound is 1.0).
    pub crit_variance_min: f32,
    /// Variance at or above which a crit is flagged "perfect".
    pub perfect_crit_threshold: f32,
    /// Projectiles leaving this region are recycled.
    pub playfield: Playfield,
    /// Largest elapsed time accepted by one simulation step.
    pub max_dt_ms: f32,
    /// RNG seed for crit and proc rolls.
    pub seed: u64,
    pub status: StatusConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            cell_size: 80.0,
            max_enemy_radius: 20.0,
            query_buffer: 4.0,
            knockback_force: 150.0,
            overkill_splash_radius: 80.0,
            execution_threshold: 0.25,
            crit_variance_min: 0.8,
            perfect_crit_threshold: 0.99,
            playfield: Playfield::default(),
            max_dt_ms: 100.0,
            seed: 0x5eed,
            status: StatusConfig::default(),
        }
    }
}

impl CombatConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every field the simulation divides by or bounds with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cell_size", self.cell_size)?;
        positive("max_dt_ms", self.max_dt_ms)?;
        positive("status.burn_interval_ms", self.status.burn_interval_ms)?;
        positive("status.poison_interval_ms", self.status.poison_interval_ms)?;
        unit_interval("execution_threshold", self.execution_threshold)?;
        unit_interval("crit_variance_min", self.crit_variance_min)?;
        unit_interval("perfect_crit_threshold", self.perfect_crit_threshold)?;
        let smallest_radius = self
            .max_enemy_radius
            .min(self.query_buffer)
            .min(self.overkill_splash_radius);
        if smallest_radius < 0.0 {
            return Err(ConfigError::Invalid {
                field: "radii",
                value: smallest_radius as f64,
                requirement: "radii must not be negative",
            });
        }
        let bounds = &self.playfield;
        if bounds.min_x >= bounds.max_x || bounds.min_y >= bounds.max_y {
            return Err(ConfigError::Invalid {
                field: "playfield",
                value: (bounds.max_x - bounds.min_x) as f64,
                requirement: "min must be below max on both axes",
            });
        }
        Ok(())
    }
}
