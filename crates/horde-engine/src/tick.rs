//! The per-frame combat step.
//!
//! [`Simulation`] owns the world and every per-session singleton (frame
//! cache, status processor, resolver, projectile pool, RNG) and runs them in
//! a fixed order on each [`step`](Simulation::step):
//!
//! 1. clamp the elapsed time to `max_dt_ms`,
//! 2. move projectiles by their velocity,
//! 3. rebuild the frame cache,
//! 4. resolve projectile collisions and apply their removals,
//! 5. advance status effects,
//! 6. despawn enemies killed by status damage.
//!
//! A proc applied in phase 4 deals its first tick one interval later, never
//! in the same step. With a fixed seed the whole step is deterministic: same
//! world + same stats + same `dt` sequence = same state hash.
//!
//! # Example
//!
//! ```
//! use horde_engine::prelude::*;
//!
//! let mut sim = Simulation::new(CombatConfig::default()).unwrap();
//! let enemy = sim.spawn_enemy(Position::new(0.0, 0.0), 10.0, Enemy::new(10.0));
//! sim.fire(Position::new(0.0, 0.0), Projectile::new(10.0, 1000.0, 0, 5.0));
//!
//! let report = sim.step(16.0, &CombatStats::default());
//! assert_eq!(report.events.deaths.len(), 1);
//! assert_eq!(report.events.deaths[0].enemy, enemy);
//! assert!(!sim.world().is_alive(enemy));
//! ```

use std::time::{Duration, Instant};

use horde_ecs::command::{CausalReason, CommandBuffer};
use horde_ecs::components::{Enemy, Position, Projectile};
use horde_ecs::entity::EntityId;
use horde_ecs::world::World;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::{debug, warn};

use crate::combat::{CombatResolver, ResolveSummary};
use crate::config::{CombatConfig, ConfigError};
use crate::events::{CombatEvents, DeathCause, HealRequest};
use crate::frame_cache::FrameCache;
use crate::pool::ProjectilePool;
use crate::stats::CombatStats;
use crate::status::StatusProcessor;

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing diagnostics for the last step.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time per phase, in execution order.
    pub phase_times: Vec<(&'static str, Duration)>,
    pub total_time: Duration,
}

// ---------------------------------------------------------------------------
// TickReport
// ---------------------------------------------------------------------------

/// What one step did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Tick number of this step, starting at 1.
    pub tick: u64,
    /// Elapsed time actually simulated, after clamping.
    pub dt_ms: f32,
    pub resolve: ResolveSummary,
    pub status_ticks: usize,
    /// Every event produced since the previous step, including those from
    /// direct hooks called in between.
    pub events: CombatEvents,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Owner of the combat core for one game session.
#[derive(Debug)]
pub struct Simulation {
    config: CombatConfig,
    world: World,
    cache: FrameCache,
    status: StatusProcessor,
    resolver: CombatResolver,
    pool: ProjectilePool,
    rng: Pcg32,
    removals: CommandBuffer,
    events: CombatEvents,
    moving: Vec<EntityId>,
    tick_counter: u64,
    last_diagnostics: TickDiagnostics,
}

impl Simulation {
    /// Validate `config` and build an empty session.
    pub fn new(config: CombatConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world: World::new(),
            cache: FrameCache::new(config.cell_size),
            status: StatusProcessor::new(config.status.clone()),
            resolver: CombatResolver::new(config.clone()),
            pool: ProjectilePool::new(),
            rng: Pcg32::seed_from_u64(config.seed),
            removals: CommandBuffer::new(),
            events: CombatEvents::new(),
            moving: Vec::new(),
            tick_counter: 0,
            last_diagnostics: TickDiagnostics::default(),
            config,
        })
    }

    /// Advance the combat core by `dt_ms` milliseconds.
    pub fn step(&mut self, dt_ms: f32, stats: &CombatStats) -> TickReport {
        let step_start = Instant::now();
        let mut phase_times = Vec::with_capacity(5);
        let dt_ms = self.clamp_dt(dt_ms);

        let start = Instant::now();
        self.advance_projectiles(dt_ms);
        phase_times.push(("advance_projectiles", start.elapsed()));

        let start = Instant::now();
        self.cache.update(&self.world);
        phase_times.push(("frame_cache", start.elapsed()));

        let start = Instant::now();
        let resolve = self.resolver.resolve(
            &mut self.world,
            &self.cache,
            stats,
            &self.status,
            &mut self.pool,
            &mut self.rng,
            dt_ms,
            &mut self.events,
        );
        phase_times.push(("combat", start.elapsed()));

        let start = Instant::now();
        let first_new_death = self.events.deaths.len();
        let status_ticks = self.status.update(&mut self.world, dt_ms, &mut self.events);
        phase_times.push(("status", start.elapsed()));

        let start = Instant::now();
        for death in &self.events.deaths[first_new_death..] {
            if let DeathCause::Status(kind) = death.cause {
                self.removals
                    .despawn(death.enemy, CausalReason::Timer(format!("{kind:?}")));
            }
        }
        let applied = self.removals.apply(&mut self.world);
        if !applied.despawned.is_empty() {
            self.cache.invalidate();
        }
        phase_times.push(("status_removals", start.elapsed()));

        self.tick_counter += 1;
        self.last_diagnostics = TickDiagnostics {
            phase_times,
            total_time: step_start.elapsed(),
        };

        let events = self.events.drain();
        debug!(
            tick = self.tick_counter,
            dt_ms,
            hits = resolve.hits,
            kills = events.deaths.len(),
            recycled = events.recycled.len(),
            status_ticks,
            "combat step"
        );
        TickReport {
            tick: self.tick_counter,
            dt_ms,
            resolve,
            status_ticks,
            events,
        }
    }

    /// Run `count` steps of the same length and collect every report.
    pub fn run_steps(&mut self, count: u64, dt_ms: f32, stats: &CombatStats) -> Vec<TickReport> {
        (0..count).map(|_| self.step(dt_ms, stats)).collect()
    }

    fn clamp_dt(&self, dt_ms: f32) -> f32 {
        if !dt_ms.is_finite() || dt_ms < 0.0 {
            warn!(dt_ms, "invalid elapsed time; step treated as zero length");
            return 0.0;
        }
        if dt_ms > self.config.max_dt_ms {
            debug!(dt_ms, max = self.config.max_dt_ms, "elapsed time clamped");
            return self.config.max_dt_ms;
        }
        dt_ms
    }

    fn advance_projectiles(&mut self, dt_ms: f32) {
        let seconds = dt_ms / 1000.0;
        self.moving.clear();
        self.moving.extend(
            self.world
                .iter::<Projectile>()
                .filter(|(_, p)| p.vx != 0.0 || p.vy != 0.0)
                .map(|(id, _)| id),
        );
        for &id in &self.moving {
            let Some((vx, vy)) = self.world.get::<Projectile>(id).map(|p| (p.vx, p.vy)) else {
                continue;
            };
            if let Some(pos) = self.world.get_mut::<Position>(id) {
                pos.x += vx * seconds;
                pos.y += vy * seconds;
            }
        }
    }

    /// Start a new game: empty world, cold caches, fresh RNG.
    pub fn reset(&mut self) {
        self.world.clear();
        self.cache.reset();
        self.status.reset();
        self.resolver.reset();
        self.pool.reset();
        self.removals.clear();
        self.events.clear();
        self.rng = Pcg32::seed_from_u64(self.config.seed);
        self.tick_counter = 0;
        self.last_diagnostics = TickDiagnostics::default();
    }

    // -- spawning -----------------------------------------------------------

    pub fn spawn_enemy(&mut self, position: Position, max_health: f32, enemy: Enemy) -> EntityId {
        self.world.spawn_enemy(position, max_health, enemy)
    }

    /// Launch a projectile through the pool.
    pub fn fire(&mut self, position: Position, projectile: Projectile) -> EntityId {
        self.pool.acquire(&mut self.world, position, projectile)
    }

    // -- hooks for weapons and gameplay ------------------------------------

    /// Damage an enemy right now, outside the projectile pass.
    ///
    /// A kill despawns the enemy immediately and invalidates the frame cache
    /// until the next step. Returns true on a kill.
    pub fn damage_enemy(
        &mut self,
        target: EntityId,
        amount: f32,
        knockback: Option<(f32, f32)>,
    ) -> bool {
        let killed = self
            .resolver
            .damage_enemy(&mut self.world, target, amount, knockback, &mut self.events);
        if killed {
            self.resolver
                .flush(&mut self.world, &mut self.pool, &mut self.events);
            self.cache.invalidate();
        }
        killed
    }

    /// Freeze an enemy in place for `duration_ms`.
    pub fn stun_enemy(&mut self, target: EntityId, duration_ms: f32) -> bool {
        self.status
            .apply_freeze(&mut self.world, target, 0.0, duration_ms, 1.0)
    }

    /// Queue healing for the player; delivered with the next report.
    pub fn heal_player(&mut self, amount: f32) {
        if amount > 0.0 {
            self.events.heals.push(HealRequest { amount });
        }
    }

    pub fn apply_burn(
        &mut self,
        target: EntityId,
        damage_per_tick: f32,
        duration_ms: f32,
        damage_multiplier: f32,
    ) -> bool {
        self.status.apply_burn(
            &mut self.world,
            target,
            damage_per_tick,
            duration_ms,
            damage_multiplier,
        )
    }

    pub fn apply_freeze(
        &mut self,
        target: EntityId,
        slow_multiplier: f32,
        duration_ms: f32,
        duration_multiplier: f32,
    ) -> bool {
        self.status.apply_freeze(
            &mut self.world,
            target,
            slow_multiplier,
            duration_ms,
            duration_multiplier,
        )
    }

    pub fn apply_poison(
        &mut self,
        target: EntityId,
        stacks: u32,
        duration_ms: f32,
        max_stacks: u32,
    ) -> bool {
        self.status
            .apply_poison(&mut self.world, target, stacks, duration_ms, max_stacks)
    }

    /// Pick chain-lightning targets around `origin` using this step's cache.
    pub fn chain_targets(
        &mut self,
        origin: EntityId,
        max_jumps: usize,
        radius: f32,
        immunity_ms: f32,
    ) -> Vec<EntityId> {
        self.resolver.chain_targets(
            &mut self.world,
            &self.cache,
            &self.status,
            origin,
            max_jumps,
            radius,
            immunity_ms,
        )
    }

    /// Take every event produced since the last step without stepping.
    pub fn drain_events(&mut self) -> CombatEvents {
        self.events.drain()
    }

    // -- accessors ----------------------------------------------------------

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for movement, spawning waves and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    /// Invalidate the frame cache after removing enemies outside the step.
    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
    }

    pub fn status(&self) -> &StatusProcessor {
        &self.status
    }

    pub fn pool(&self) -> &ProjectilePool {
        &self.pool
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
