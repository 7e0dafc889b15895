//! Projectile collision and damage resolution.
//!
//! [`CombatResolver::resolve`] runs once per tick after the frame cache has
//! been rebuilt. For every live projectile it:
//!
//! 1. counts down the lifetime and recycles expired or out-of-bounds shots,
//! 2. asks the spatial hash for candidates within
//!    `projectile radius + max enemy radius + buffer`,
//! 3. runs an exact circle-circle test on each candidate that is not already
//!    dead this tick and that this projectile has not hit before,
//! 4. applies damage and every side effect of the hit,
//! 5. spends one point of piercing per hit, consuming the projectile once
//!    the budget is gone.
//!
//! Nothing is removed while the world is being walked. Dead enemies and
//! spent projectiles are queued on a [`CommandBuffer`] and removed in one
//! pass at the end, which also deduplicates repeated kills.
//!
//! # Damage pipeline
//!
//! ```text
//! base -> crit (x crit_damage x variance) -> execution -> shatter -> armor
//! ```
//!
//! Overkill splash skips the whole pipeline: nearby enemies take
//! `excess x overkill_splash` flat, and a splash kill never splashes again.

use std::collections::HashSet;

use horde_ecs::command::{ApplyReport, CausalReason, CommandBuffer};
use horde_ecs::components::{Enemy, Health, Knockback, Position, Projectile, StatusEffects};
use horde_ecs::entity::EntityId;
use horde_ecs::world::World;
use rand::Rng;
use tracing::{trace, warn};

use crate::config::CombatConfig;
use crate::events::{CombatEvents, DeathCause, DeathRecord, HealRequest, HitRecord};
use crate::frame_cache::FrameCache;
use crate::pool::ProjectilePool;
use crate::spatial::{SpatialEntry, SpatialHash};
use crate::stats::CombatStats;
use crate::status::StatusProcessor;

/// Hit direction used when a projectile sits exactly on its target.
pub const DEFAULT_HIT_DIRECTION: (f32, f32) = (0.0, 1.0);

// ---------------------------------------------------------------------------
// Crit rolls
// ---------------------------------------------------------------------------

/// Outcome of one crit roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CritRoll {
    /// Damage multiplier; 1.0 when the roll missed.
    pub multiplier: f32,
    pub crit: bool,
    /// Variance landed at or above the perfect threshold.
    pub perfect: bool,
}

impl CritRoll {
    pub const NONE: CritRoll = CritRoll {
        multiplier: 1.0,
        crit: false,
        perfect: false,
    };
}

/// Roll for a crit against `stats.crit_chance`.
///
/// A crit multiplies by `crit_damage * variance`, with variance uniform in
/// `[crit_variance_min, 1.0)`. The RNG is not touched when the chance is 0.
pub fn roll_crit<R: Rng + ?Sized>(
    rng: &mut R,
    stats: &CombatStats,
    config: &CombatConfig,
) -> CritRoll {
    if stats.crit_chance <= 0.0 || rng.gen::<f32>() >= stats.crit_chance {
        return CritRoll::NONE;
    }
    let min = config.crit_variance_min;
    let variance = min + rng.gen::<f32>() * (1.0 - min);
    CritRoll {
        multiplier: stats.crit_damage * variance,
        crit: true,
        perfect: variance >= config.perfect_crit_threshold,
    }
}

/// Damage left after armor, with `armor_pen` ignoring part of it.
#[inline]
pub fn mitigate(damage: f32, armor: f32, armor_pen: f32) -> f32 {
    damage * (1.0 - armor.clamp(0.0, 1.0) * (1.0 - armor_pen.clamp(0.0, 1.0)))
}

/// Unit vector from `from` to `to`, or [`DEFAULT_HIT_DIRECTION`] when the
/// points coincide.
#[inline]
pub fn hit_direction(from: Position, to: Position) -> (f32, f32) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len > f32::EPSILON {
        (dx / len, dy / len)
    } else {
        DEFAULT_HIT_DIRECTION
    }
}

#[inline]
fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f32) -> bool {
    chance > 0.0 && rng.gen::<f32>() < chance
}

// ---------------------------------------------------------------------------
// ResolveSummary
// ---------------------------------------------------------------------------

/// Counters for one resolver pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub projectiles: usize,
    /// Direct projectile hits (splash excluded).
    pub hits: usize,
    pub kills: usize,
    pub recycled: usize,
}

// ---------------------------------------------------------------------------
// CombatResolver
// ---------------------------------------------------------------------------

/// Resolves projectile hits and owns the deferred removal queue.
#[derive(Debug)]
pub struct CombatResolver {
    config: CombatConfig,
    projectiles: Vec<EntityId>,
    candidates: Vec<SpatialEntry>,
    splash: Vec<SpatialEntry>,
    dead: HashSet<EntityId>,
    removals: CommandBuffer,
}

/// Everything one hit needs to know about its source.
struct Strike {
    source: EntityId,
    origin: Position,
    damage: f32,
}

impl CombatResolver {
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            projectiles: Vec::new(),
            candidates: Vec::new(),
            splash: Vec::new(),
            dead: HashSet::new(),
            removals: CommandBuffer::new(),
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Removals queued but not yet applied.
    pub fn pending_removals(&self) -> usize {
        self.removals.len()
    }

    /// Whether `enemy` was killed since the last flush.
    pub fn is_dead(&self, enemy: EntityId) -> bool {
        self.dead.contains(&enemy)
    }

    /// Drop every queued removal. Used on a new game.
    pub fn reset(&mut self) {
        self.projectiles.clear();
        self.candidates.clear();
        self.splash.clear();
        self.dead.clear();
        self.removals.clear();
    }

    /// Run one collision pass and apply its removals.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        cache: &FrameCache,
        stats: &CombatStats,
        status: &StatusProcessor,
        pool: &mut ProjectilePool,
        rng: &mut R,
        dt_ms: f32,
        events: &mut CombatEvents,
    ) -> ResolveSummary {
        let mut summary = ResolveSummary::default();
        let hash = cache.spatial();

        self.projectiles.clear();
        self.projectiles
            .extend(world.iter::<Projectile>().map(|(id, _)| id));
        summary.projectiles = self.projectiles.len();

        let reach_slack = self.config.max_enemy_radius + self.config.query_buffer;
        let mut candidates = std::mem::take(&mut self.candidates);

        for i in 0..self.projectiles.len() {
            let pid = self.projectiles[i];
            let Some(origin) = world.get::<Position>(pid).copied() else {
                let reason = CausalReason::SystemInternal("projectile_without_position".to_owned());
                self.removals.recycle(pid, reason);
                continue;
            };
            let Some(proj) = world.get_mut::<Projectile>(pid) else {
                continue;
            };

            proj.lifetime_ms -= dt_ms;
            if proj.lifetime_ms <= 0.0 {
                self.removals
                    .recycle(pid, CausalReason::Timer("projectile_lifetime".to_owned()));
                continue;
            }
            if !self.config.playfield.contains(origin.x, origin.y) {
                self.removals
                    .recycle(pid, CausalReason::GameRule("left_playfield".to_owned()));
                continue;
            }
            let Some(hash) = hash else {
                continue;
            };

            let radius = proj.radius;
            let strike = Strike {
                source: pid,
                origin,
                damage: proj.damage,
            };
            let mut piercing = proj.piercing;
            let mut memory = std::mem::take(&mut proj.hits);
            let mut consumed_by = None;

            hash.query_potential_into(origin.x, origin.y, radius + reach_slack, &mut candidates);
            for cand in &candidates {
                if self.dead.contains(&cand.id) || memory.contains(&cand.id) {
                    continue;
                }
                let Some(enemy) = world.get::<Enemy>(cand.id).copied() else {
                    continue;
                };
                let reach = radius + enemy.radius;
                if cand.distance_squared(origin.x, origin.y) > reach * reach {
                    continue;
                }

                memory.push(cand.id);
                summary.hits += 1;
                self.strike(world, hash, stats, status, rng, &strike, cand.id, &enemy, events);

                if piercing == 0 {
                    consumed_by = Some(cand.id);
                    break;
                }
                piercing -= 1;
            }

            if let Some(proj) = world.get_mut::<Projectile>(pid) {
                proj.piercing = piercing;
                proj.hits = memory;
            }
            if let Some(target) = consumed_by {
                self.removals
                    .recycle(pid, CausalReason::CollisionResponse(pid, target));
            }
        }

        self.candidates = candidates;
        // Includes splash kills.
        summary.kills = self.dead.len();
        let report = self.flush(world, pool, events);
        summary.recycled = report.recycled.len();
        summary
    }

    /// Apply one projectile hit to `target` and every side effect of it.
    #[allow(clippy::too_many_arguments)]
    fn strike<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        hash: &SpatialHash,
        stats: &CombatStats,
        status: &StatusProcessor,
        rng: &mut R,
        strike: &Strike,
        target: EntityId,
        enemy: &Enemy,
        events: &mut CombatEvents,
    ) {
        let Some(target_pos) = world.get::<Position>(target).copied() else {
            return;
        };
        let slowed = world
            .get::<StatusEffects>(target)
            .is_some_and(StatusEffects::is_slowed);

        let crit = roll_crit(rng, stats, &self.config);
        let mut damage = strike.damage * crit.multiplier;

        let Some(health) = world.get_mut::<Health>(target) else {
            return;
        };
        let pre_damage = health.current;
        if stats.execution_bonus > 0.0 && health.fraction() < self.config.execution_threshold {
            damage *= 1.0 + stats.execution_bonus;
        }
        if stats.shatter_bonus > 0.0 && slowed {
            damage *= 1.0 + stats.shatter_bonus;
        }
        damage = mitigate(damage, enemy.armor, stats.armor_pen);
        health.current -= damage;
        let killed = health.is_depleted();

        let (dx, dy) = hit_direction(strike.origin, target_pos);
        if let Some(kb) = world.get_mut::<Knockback>(target) {
            let force = self.config.knockback_force * stats.knockback_multiplier;
            kb.push(dx * force, dy * force);
        }
        events.hits.push(HitRecord {
            enemy: target,
            damage,
            crit: crit.crit,
            perfect_crit: crit.perfect,
            angle: dy.atan2(dx),
            splash: false,
        });
        trace!(
            projectile = %strike.source,
            enemy = %target,
            damage,
            crit = crit.crit,
            "projectile hit"
        );

        if roll(rng, stats.burn_chance) {
            status.apply_burn(
                world,
                target,
                stats.burn_damage,
                stats.burn_duration_ms,
                stats.burn_damage_multiplier,
            );
        }
        if roll(rng, stats.freeze_chance) {
            status.apply_freeze(
                world,
                target,
                stats.freeze_slow,
                stats.freeze_duration_ms,
                stats.freeze_duration_multiplier,
            );
        }
        if roll(rng, stats.poison_chance) {
            status.apply_poison(
                world,
                target,
                stats.poison_stacks,
                stats.poison_duration_ms,
                stats.poison_max_stacks,
            );
        }
        if stats.life_steal > 0.0 {
            events.heals.push(HealRequest {
                amount: damage * stats.life_steal,
            });
        }

        if !killed {
            return;
        }
        let cause = DeathCause::Projectile(strike.source);
        if !self.mark_dead(target, target_pos, cause, events) {
            return;
        }
        let excess = damage - pre_damage;
        if stats.overkill_splash > 0.0 && excess > 0.0 {
            self.splash(world, hash, target, target_pos, excess * stats.overkill_splash, events);
        }
    }

    /// Deal flat `amount` to every other living enemy around a kill.
    /// Splash kills are recorded but do not splash further.
    fn splash(
        &mut self,
        world: &mut World,
        hash: &SpatialHash,
        source: EntityId,
        center: Position,
        amount: f32,
        events: &mut CombatEvents,
    ) {
        let mut around = std::mem::take(&mut self.splash);
        hash.query_into(center.x, center.y, self.config.overkill_splash_radius, &mut around);
        for entry in &around {
            if entry.id == source || self.dead.contains(&entry.id) {
                continue;
            }
            let Some(health) = world.get_mut::<Health>(entry.id) else {
                continue;
            };
            health.current -= amount;
            let killed = health.is_depleted();
            let position = Position::new(entry.x, entry.y);
            let (dx, dy) = hit_direction(center, position);
            events.hits.push(HitRecord {
                enemy: entry.id,
                damage: amount,
                crit: false,
                perfect_crit: false,
                angle: dy.atan2(dx),
                splash: true,
            });
            if killed {
                let position = world.get::<Position>(entry.id).copied().unwrap_or(position);
                self.mark_dead(entry.id, position, DeathCause::OverkillSplash { source }, events);
            }
        }
        self.splash = around;
    }

    /// Record a death once and queue the despawn. Returns false if the
    /// enemy was already dead this pass.
    fn mark_dead(
        &mut self,
        enemy: EntityId,
        position: Position,
        cause: DeathCause,
        events: &mut CombatEvents,
    ) -> bool {
        if !self.dead.insert(enemy) {
            return false;
        }
        events.deaths.push(DeathRecord {
            enemy,
            position,
            cause,
        });
        let reason = match cause {
            DeathCause::Projectile(source) => CausalReason::CollisionResponse(source, enemy),
            DeathCause::OverkillSplash { source } => CausalReason::CollisionResponse(source, enemy),
            DeathCause::Status(kind) => CausalReason::Timer(format!("{kind:?}")),
            DeathCause::Direct => CausalReason::GameRule("direct_damage".to_owned()),
        };
        self.removals.despawn(enemy, reason);
        true
    }

    /// Apply every queued removal. Recycled projectile handles go back to
    /// `pool` and are listed in `events.recycled`.
    pub fn flush(
        &mut self,
        world: &mut World,
        pool: &mut ProjectilePool,
        events: &mut CombatEvents,
    ) -> ApplyReport {
        let report = self.removals.apply(world);
        pool.reclaim(&report.recycled);
        events.recycled.extend_from_slice(&report.recycled);
        self.dead.clear();
        report
    }

    // -- direct hooks -------------------------------------------------------

    /// Damage an enemy outside the projectile pass (auras, beams, chain
    /// lightning). `knockback` is an impulse added as-is.
    ///
    /// No crit or armor is applied. A kill is recorded in `events` and its
    /// despawn is queued until the next [`flush`](Self::flush). Returns true
    /// on a kill.
    pub fn damage_enemy(
        &mut self,
        world: &mut World,
        target: EntityId,
        amount: f32,
        knockback: Option<(f32, f32)>,
        events: &mut CombatEvents,
    ) -> bool {
        if self.dead.contains(&target) {
            return false;
        }
        let Some(health) = world.get_mut::<Health>(target) else {
            warn!(entity = %target, "direct damage on an entity without health; ignored");
            return false;
        };
        if health.is_depleted() {
            return false;
        }
        health.current -= amount;
        let killed = health.is_depleted();

        if let (Some((vx, vy)), Some(kb)) = (knockback, world.get_mut::<Knockback>(target)) {
            kb.push(vx, vy);
        }
        let position = world.get::<Position>(target).copied().unwrap_or_default();
        events.hits.push(HitRecord {
            enemy: target,
            damage: amount,
            crit: false,
            perfect_crit: false,
            angle: knockback.map_or(0.0, |(vx, vy)| vy.atan2(vx)),
            splash: false,
        });
        killed && self.mark_dead(target, position, DeathCause::Direct, events)
    }

    /// Up to `max_jumps` chain targets starting next to `origin`.
    ///
    /// Each jump goes to the nearest enemy within `radius` of the previous
    /// link that is not chain-immune and not already in the chain. Every
    /// selected enemy is given `immunity_ms` of chain immunity.
    #[allow(clippy::too_many_arguments)]
    pub fn chain_targets(
        &self,
        world: &mut World,
        cache: &FrameCache,
        status: &StatusProcessor,
        origin: EntityId,
        max_jumps: usize,
        radius: f32,
        immunity_ms: f32,
    ) -> Vec<EntityId> {
        let mut chain = Vec::with_capacity(max_jumps);
        let Some(mut at) = world.get::<Position>(origin).copied() else {
            return chain;
        };
        let Some(hash) = cache.spatial() else {
            return chain;
        };
        let mut current = origin;

        while chain.len() < max_jumps {
            let next = hash
                .find_nearest_n(at.x, at.y, radius, usize::MAX, Some(current))
                .into_iter()
                .find(|e| {
                    e.id != origin
                        && !chain.contains(&e.id)
                        && !self.dead.contains(&e.id)
                        && status.can_chain_to(world, e.id)
                });
            let Some(next) = next else {
                break;
            };
            status.set_chain_immunity(world, next.id, immunity_ms);
            chain.push(next.id);
            current = next.id;
            at = Position::new(next.x, next.y);
        }
        chain
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatusConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Arena {
        world: World,
        cache: FrameCache,
        status: StatusProcessor,
        pool: ProjectilePool,
        resolver: CombatResolver,
        rng: Pcg32,
        events: CombatEvents,
    }

    impl Arena {
        fn new() -> Self {
            let config = CombatConfig::default();
            Self {
                world: World::new(),
                cache: FrameCache::new(config.cell_size),
                status: StatusProcessor::new(StatusConfig::default()),
                pool: ProjectilePool::new(),
                resolver: CombatResolver::new(config),
                rng: Pcg32::seed_from_u64(7),
                events: CombatEvents::new(),
            }
        }

        fn enemy(&mut self, x: f32, y: f32, hp: f32) -> EntityId {
            self.world.spawn_enemy(Position::new(x, y), hp, Enemy::new(10.0))
        }

        fn shot(&mut self, x: f32, y: f32, damage: f32, piercing: u32) -> EntityId {
            self.pool.acquire(
                &mut self.world,
                Position::new(x, y),
                Projectile::new(damage, 1000.0, piercing, 5.0),
            )
        }

        fn resolve(&mut self, stats: &CombatStats) -> ResolveSummary {
            self.cache.update(&self.world);
            self.resolver.resolve(
                &mut self.world,
                &self.cache,
                stats,
                &self.status,
                &mut self.pool,
                &mut self.rng,
                16.0,
                &mut self.events,
            )
        }
    }

    #[test]
    fn crit_roll_never_fires_at_zero_chance() {
        let mut rng = Pcg32::seed_from_u64(1);
        let stats = CombatStats::default();
        let config = CombatConfig::default();
        for _ in 0..1000 {
            assert_eq!(roll_crit(&mut rng, &stats, &config), CritRoll::NONE);
        }
    }

    #[test]
    fn armor_is_reduced_by_penetration() {
        assert_eq!(mitigate(100.0, 0.0, 0.0), 100.0);
        assert_eq!(mitigate(100.0, 0.5, 0.0), 50.0);
        assert_eq!(mitigate(100.0, 0.5, 1.0), 100.0);
        assert!((mitigate(100.0, 0.5, 0.5) - 75.0).abs() < 1e-4);
    }

    #[test]
    fn coincident_points_hit_downward() {
        let p = Position::new(3.0, 3.0);
        assert_eq!(hit_direction(p, p), DEFAULT_HIT_DIRECTION);
        let (dx, dy) = hit_direction(Position::new(0.0, 0.0), Position::new(3.0, 4.0));
        assert!((dx - 0.6).abs() < 1e-6 && (dy - 0.8).abs() < 1e-6);
    }

    #[test]
    fn expired_projectile_is_recycled_without_hitting() {
        let mut arena = Arena::new();
        let enemy = arena.enemy(0.0, 0.0, 10.0);
        let shot = arena.world.spawn_projectile(
            Position::new(0.0, 0.0),
            Projectile::new(10.0, 10.0, 0, 5.0),
        );
        let summary = arena.resolve(&CombatStats::default());

        assert_eq!(summary.hits, 0);
        assert_eq!(arena.events.recycled, vec![shot]);
        assert_eq!(arena.world.get::<Health>(enemy).map(|h| h.current), Some(10.0));
        assert_eq!(arena.pool.available(), 1);
    }

    #[test]
    fn projectile_outside_playfield_is_recycled() {
        let mut arena = Arena::new();
        let shot = arena.shot(1.0e6, 0.0, 10.0, 0);
        arena.resolve(&CombatStats::default());
        assert_eq!(arena.events.recycled, vec![shot]);
        assert!(!arena.world.has::<Projectile>(shot));
        assert!(arena.world.is_alive(shot));
    }

    #[test]
    fn armored_enemy_takes_reduced_damage() {
        let mut arena = Arena::new();
        let enemy = arena
            .world
            .spawn_enemy(Position::new(0.0, 0.0), 100.0, Enemy::new(10.0).with_armor(0.5));
        arena.shot(0.0, 0.0, 20.0, 0);
        arena.resolve(&CombatStats::default());
        assert_eq!(arena.world.get::<Health>(enemy).map(|h| h.current), Some(90.0));
    }

    #[test]
    fn pierced_enemy_is_not_hit_again_next_tick() {
        let mut arena = Arena::new();
        let enemy = arena.enemy(0.0, 0.0, 100.0);
        arena.shot(0.0, 0.0, 10.0, 3);
        arena.resolve(&CombatStats::default());
        arena.resolve(&CombatStats::default());
        assert_eq!(arena.world.get::<Health>(enemy).map(|h| h.current), Some(90.0));
    }

    #[test]
    fn life_steal_heals_a_fraction_of_damage() {
        let mut arena = Arena::new();
        arena.enemy(0.0, 0.0, 100.0);
        arena.shot(0.0, 0.0, 40.0, 0);
        let stats = CombatStats {
            life_steal: 0.25,
            ..CombatStats::default()
        };
        arena.resolve(&stats);
        assert_eq!(arena.events.total_healing(), 10.0);
    }

    #[test]
    fn guaranteed_procs_reach_the_status_record() {
        let mut arena = Arena::new();
        let enemy = arena.enemy(0.0, 0.0, 100.0);
        arena.shot(0.0, 0.0, 1.0, 0);
        let stats = CombatStats {
            burn_chance: 1.0,
            freeze_chance: 1.0,
            poison_chance: 1.0,
            poison_stacks: 2,
            ..CombatStats::default()
        };
        arena.resolve(&stats);
        let fx = arena.world.get::<StatusEffects>(enemy).copied().unwrap();
        assert!(fx.burn.is_active());
        assert_eq!(fx.freeze.slow_multiplier, 0.5);
        assert_eq!(fx.poison.stacks, 2);
    }

    #[test]
    fn execution_and_shatter_multiply() {
        let mut arena = Arena::new();
        let enemy = arena.enemy(0.0, 0.0, 100.0);
        arena.world.get_mut::<Health>(enemy).unwrap().current = 20.0;
        arena
            .status
            .apply_freeze(&mut arena.world, enemy, 0.5, 1000.0, 1.0);
        arena.shot(0.0, 0.0, 4.0, 0);
        let stats = CombatStats {
            execution_bonus: 0.5,
            shatter_bonus: 1.0,
            ..CombatStats::default()
        };
        arena.resolve(&stats);
        // 4 x 1.5 x 2.0
        assert_eq!(arena.events.hits[0].damage, 12.0);
        assert_eq!(arena.world.get::<Health>(enemy).map(|h| h.current), Some(8.0));
    }

    #[test]
    fn direct_damage_kill_is_deferred_until_flush() {
        let mut arena = Arena::new();
        let enemy = arena.enemy(5.0, 5.0, 10.0);
        assert!(arena
            .resolver
            .damage_enemy(&mut arena.world, enemy, 15.0, Some((3.0, 0.0)), &mut arena.events));
        assert!(arena.world.is_alive(enemy));
        assert_eq!(arena.world.get::<Knockback>(enemy).map(|k| k.vx), Some(3.0));
        // A second kill in the same pass is not reported again.
        assert!(!arena
            .resolver
            .damage_enemy(&mut arena.world, enemy, 15.0, None, &mut arena.events));

        let report = arena
            .resolver
            .flush(&mut arena.world, &mut arena.pool, &mut arena.events);
        assert_eq!(report.despawned, vec![enemy]);
        assert_eq!(arena.events.deaths.len(), 1);
        assert_eq!(arena.events.deaths[0].cause, DeathCause::Direct);
        assert_eq!(arena.events.deaths[0].position, Position::new(5.0, 5.0));
    }

    #[test]
    fn chain_walks_nearest_and_respects_immunity() {
        let mut arena = Arena::new();
        let origin = arena.enemy(0.0, 0.0, 10.0);
        let a = arena.enemy(30.0, 0.0, 10.0);
        let b = arena.enemy(60.0, 0.0, 10.0);
        let c = arena.enemy(90.0, 0.0, 10.0);
        arena
            .status
            .set_chain_immunity(&mut arena.world, b, 500.0);
        arena.cache.update(&arena.world);

        let chain = arena.resolver.chain_targets(
            &mut arena.world,
            &arena.cache,
            &arena.status,
            origin,
            3,
            40.0,
            250.0,
        );
        // b is immune and c is out of reach from a.
        assert_eq!(chain, vec![a]);
        assert!(!arena.status.can_chain_to(&arena.world, a));
        assert!(arena.status.can_chain_to(&arena.world, c));
    }
}
