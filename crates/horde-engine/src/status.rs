//! Timed status effects: burn, freeze, poison and chain immunity.
//!
//! Effects live in each entity's [`StatusEffects`] record. The `apply_*`
//! functions merge a new application into that record. [`StatusProcessor::update`]
//! advances every active timer by the tick's elapsed time and deals periodic
//! damage.
//!
//! Merge rules:
//!
//! - **Burn**: the strongest damage per tick wins; duration always resets.
//! - **Freeze**: the strongest (lowest) multiplier wins; duration always
//!   resets to the latest application.
//! - **Poison**: stacks add up to a cap; duration always resets.
//!
//! Periodic damage runs on its own cadence (burn every 500 ms, poison every
//! 400 ms by default) independent of frame rate. Tick `k` is due `k`
//! intervals after the first application, so the first damage lands one
//! interval after the proc. Expired effects keep their record with the
//! magnitude zeroed.

use horde_ecs::components::{BurnEffect, Health, PoisonEffect, Position, StatusEffects};
use horde_ecs::entity::EntityId;
use horde_ecs::world::World;
use tracing::{debug, warn};

use crate::config::StatusConfig;
use crate::events::{CombatEvents, DeathCause, DeathRecord, StatusKind, StatusTick};

// ---------------------------------------------------------------------------
// StatusProcessor
// ---------------------------------------------------------------------------

/// Applies and advances status effects.
#[derive(Debug, Clone)]
pub struct StatusProcessor {
    config: StatusConfig,
    active: Vec<EntityId>,
    dying: Vec<(EntityId, StatusKind)>,
}

impl StatusProcessor {
    pub fn new(config: StatusConfig) -> Self {
        Self {
            config,
            active: Vec::new(),
            dying: Vec::new(),
        }
    }

    pub fn config(&self) -> &StatusConfig {
        &self.config
    }

    /// The target's status record, created on first use. `None` (with a
    /// warning) when the target is gone or cannot take damage.
    fn record_mut<'w>(
        world: &'w mut World,
        target: EntityId,
        effect: &'static str,
    ) -> Option<&'w mut StatusEffects> {
        if !world.has::<Health>(target) {
            warn!(entity = %target, effect, "status applied to an entity without health; ignored");
            return None;
        }
        if !world.has::<StatusEffects>(target) {
            world.insert(target, StatusEffects::default()).ok()?;
        }
        world.get_mut::<StatusEffects>(target)
    }

    /// Start or refresh a burn dealing `damage_per_tick * damage_multiplier`.
    pub fn apply_burn(
        &self,
        world: &mut World,
        target: EntityId,
        damage_per_tick: f32,
        duration_ms: f32,
        damage_multiplier: f32,
    ) -> bool {
        let Some(fx) = Self::record_mut(world, target, "burn") else {
            return false;
        };
        let damage = damage_per_tick * damage_multiplier;
        if fx.burn.is_active() {
            fx.burn.expires_at_ms = fx.burn.elapsed_ms + duration_ms;
            if damage > fx.burn.damage_per_tick {
                fx.burn.damage_per_tick = damage;
            }
        } else {
            fx.burn = BurnEffect {
                damage_per_tick: damage,
                expires_at_ms: duration_ms,
                ..BurnEffect::default()
            };
        }
        true
    }

    /// Slow to `slow_multiplier` for `duration_ms * duration_multiplier`.
    /// A multiplier of 0 is a stun.
    pub fn apply_freeze(
        &self,
        world: &mut World,
        target: EntityId,
        slow_multiplier: f32,
        duration_ms: f32,
        duration_multiplier: f32,
    ) -> bool {
        let Some(fx) = Self::record_mut(world, target, "freeze") else {
            return false;
        };
        let slow = slow_multiplier.clamp(0.0, 1.0);
        fx.freeze.slow_multiplier = if fx.freeze.is_active() {
            fx.freeze.slow_multiplier.min(slow)
        } else {
            slow
        };
        fx.freeze.remaining_ms = duration_ms * duration_multiplier;
        true
    }

    /// Add `stacks` of poison, capped at `max_stacks`.
    pub fn apply_poison(
        &self,
        world: &mut World,
        target: EntityId,
        stacks: u32,
        duration_ms: f32,
        max_stacks: u32,
    ) -> bool {
        let Some(fx) = Self::record_mut(world, target, "poison") else {
            return false;
        };
        if !fx.poison.is_active() {
            fx.poison = PoisonEffect::default();
        }
        fx.poison.stacks = fx.poison.stacks.saturating_add(stacks).min(max_stacks);
        fx.poison.expires_at_ms = fx.poison.elapsed_ms + duration_ms;
        true
    }

    /// Block chain effects from jumping to `target` for `duration_ms`.
    pub fn set_chain_immunity(
        &self,
        world: &mut World,
        target: EntityId,
        duration_ms: f32,
    ) -> bool {
        let Some(fx) = Self::record_mut(world, target, "chain_immunity") else {
            return false;
        };
        fx.chain_immunity_ms = duration_ms;
        true
    }

    /// Whether a chain effect may jump to `target` now.
    pub fn can_chain_to(&self, world: &World, target: EntityId) -> bool {
        world
            .get::<StatusEffects>(target)
            .map_or(true, |fx| fx.chain_immunity_ms <= 0.0)
    }

    /// Drop every queued death. Used on a new game.
    pub fn reset(&mut self) {
        self.active.clear();
        self.dying.clear();
    }

    /// Advance every active effect by `dt_ms`.
    ///
    /// Damage ticks are reported in `events.status_ticks`. Entities brought
    /// to zero health are reported in `events.deaths` after the whole scan;
    /// removing them is the caller's job. Returns the number of damage ticks
    /// dealt.
    pub fn update(&mut self, world: &mut World, dt_ms: f32, events: &mut CombatEvents) -> usize {
        self.active.clear();
        self.active.extend(
            world
                .iter::<StatusEffects>()
                .filter(|(_, fx)| fx.any_active())
                .map(|(id, _)| id),
        );

        let burn_interval = self.config.burn_interval_ms;
        let poison_interval = self.config.poison_interval_ms;
        let per_stack = self.config.poison_damage_per_stack;
        let mut tick_count = 0;

        for &id in &self.active {
            let Some(hp_before) = world.get::<Health>(id).map(|h| h.current) else {
                continue;
            };
            if hp_before <= 0.0 {
                // Already dead and awaiting removal.
                continue;
            }
            let Some(fx) = world.get_mut::<StatusEffects>(id) else {
                continue;
            };

            fx.chain_immunity_ms = (fx.chain_immunity_ms - dt_ms).max(0.0);

            let mut burn_damage = 0.0;
            let mut burn_ticks = 0;
            if fx.burn.is_active() {
                let burn = &mut fx.burn;
                burn_ticks = advance_ticks(
                    &mut burn.elapsed_ms,
                    burn.expires_at_ms,
                    &mut burn.ticks,
                    burn_interval,
                    dt_ms,
                );
                burn_damage = burn.damage_per_tick * burn_ticks as f32;
                if burn.elapsed_ms >= burn.expires_at_ms {
                    *burn = BurnEffect::default();
                }
            }

            if fx.freeze.is_active() {
                fx.freeze.remaining_ms -= dt_ms;
                if fx.freeze.remaining_ms <= 0.0 {
                    fx.freeze.remaining_ms = 0.0;
                    fx.freeze.slow_multiplier = 0.0;
                }
            }

            let mut poison_damage = 0.0;
            let mut poison_ticks = 0;
            if fx.poison.is_active() {
                let poison = &mut fx.poison;
                poison_ticks = advance_ticks(
                    &mut poison.elapsed_ms,
                    poison.expires_at_ms,
                    &mut poison.ticks,
                    poison_interval,
                    dt_ms,
                );
                poison_damage = per_stack * poison.stacks as f32 * poison_ticks as f32;
                if poison.elapsed_ms >= poison.expires_at_ms {
                    *poison = PoisonEffect::default();
                }
            }

            if burn_ticks == 0 && poison_ticks == 0 {
                continue;
            }
            tick_count += (burn_ticks + poison_ticks) as usize;

            if burn_ticks > 0 {
                events.status_ticks.push(StatusTick {
                    enemy: id,
                    kind: StatusKind::Burn,
                    damage: burn_damage,
                });
            }
            if poison_ticks > 0 {
                events.status_ticks.push(StatusTick {
                    enemy: id,
                    kind: StatusKind::Poison,
                    damage: poison_damage,
                });
            }

            let Some(health) = world.get_mut::<Health>(id) else {
                continue;
            };
            health.current -= burn_damage + poison_damage;
            if health.current <= 0.0 {
                let kind = if poison_ticks > 0 {
                    StatusKind::Poison
                } else {
                    StatusKind::Burn
                };
                self.dying.push((id, kind));
            }
        }

        if !self.dying.is_empty() {
            debug!(deaths = self.dying.len(), "status effects killed enemies");
        }
        for (id, kind) in self.dying.drain(..) {
            let position = world.get::<Position>(id).copied().unwrap_or_default();
            events.deaths.push(DeathRecord {
                enemy: id,
                position,
                cause: DeathCause::Status(kind),
            });
        }

        tick_count
    }
}

/// Move a periodic effect's clock forward by `dt_ms` and return how many
/// ticks fell due. Tick `k` is due at `k * interval_ms` and never after
/// `expires_at_ms`.
fn advance_ticks(
    elapsed_ms: &mut f32,
    expires_at_ms: f32,
    ticks: &mut u32,
    interval_ms: f32,
    dt_ms: f32,
) -> u32 {
    *elapsed_ms += dt_ms;
    let due_by = elapsed_ms.min(expires_at_ms);
    let mut fired = 0;
    while (*ticks + 1) as f32 * interval_ms <= due_by {
        *ticks += 1;
        fired += 1;
    }
    fired
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use horde_ecs::components::Enemy;

    fn setup(hp: f32) -> (World, EntityId, StatusProcessor) {
        let mut world = World::new();
        let e = world.spawn_enemy(Position::new(3.0, 4.0), hp, Enemy::new(10.0));
        (world, e, StatusProcessor::new(StatusConfig::default()))
    }

    fn fx(world: &World, e: EntityId) -> StatusEffects {
        *world.get::<StatusEffects>(e).unwrap()
    }

    fn run(
        proc_: &mut StatusProcessor,
        world: &mut World,
        total_ms: f32,
        step_ms: f32,
    ) -> CombatEvents {
        let mut events = CombatEvents::new();
        let mut t = 0.0;
        while t < total_ms {
            proc_.update(world, step_ms, &mut events);
            t += step_ms;
        }
        events
    }

    #[test]
    fn weaker_burn_only_refreshes_duration() {
        let (mut world, e, p) = setup(100.0);
        p.apply_burn(&mut world, e, 8.0, 2000.0, 1.0);
        p.apply_burn(&mut world, e, 3.0, 900.0, 1.0);
        let burn = fx(&world, e).burn;
        assert_eq!(burn.damage_per_tick, 8.0);
        assert_eq!(burn.remaining_ms(), 900.0);
    }

    #[test]
    fn stronger_burn_raises_damage_and_refreshes() {
        let (mut world, e, p) = setup(100.0);
        p.apply_burn(&mut world, e, 3.0, 2000.0, 1.0);
        p.apply_burn(&mut world, e, 4.0, 1200.0, 1.5);
        let burn = fx(&world, e).burn;
        assert_eq!(burn.damage_per_tick, 6.0);
        assert_eq!(burn.remaining_ms(), 1200.0);
    }

    #[test]
    fn refresh_does_not_reset_tick_schedule() {
        let (mut world, e, mut p) = setup(100.0);
        p.apply_burn(&mut world, e, 5.0, 2000.0, 1.0);
        run(&mut p, &mut world, 300.0, 100.0);
        p.apply_burn(&mut world, e, 5.0, 2000.0, 1.0);
        let burn = fx(&world, e).burn;
        assert_eq!(burn.elapsed_ms, 300.0);
        assert_eq!(burn.remaining_ms(), 2000.0);

        // Next tick is still due at 500 ms, then every 500 ms until 2300.
        let events = run(&mut p, &mut world, 2100.0, 100.0);
        assert_eq!(events.status_ticks.len(), 4);
        assert_eq!(world.get::<Health>(e).unwrap().current, 80.0);
    }

    #[test]
    fn freeze_keeps_strongest_and_latest_duration() {
        let (mut world, e, p) = setup(100.0);
        p.apply_freeze(&mut world, e, 0.8, 1000.0, 1.0);
        p.apply_freeze(&mut world, e, 0.3, 3000.0, 1.0);
        p.apply_freeze(&mut world, e, 0.6, 500.0, 1.0);
        let freeze = fx(&world, e).freeze;
        assert_eq!(freeze.slow_multiplier, 0.3);
        assert_eq!(freeze.remaining_ms, 500.0);
    }

    #[test]
    fn freeze_duration_is_scaled() {
        let (mut world, e, p) = setup(100.0);
        p.apply_freeze(&mut world, e, 0.5, 1000.0, 1.5);
        assert_eq!(fx(&world, e).freeze.remaining_ms, 1500.0);
    }

    #[test]
    fn expired_freeze_zeroes_multiplier_without_slowing() {
        let (mut world, e, mut p) = setup(100.0);
        p.apply_freeze(&mut world, e, 0.3, 100.0, 1.0);
        assert!(fx(&world, e).is_slowed());
        run(&mut p, &mut world, 150.0, 50.0);
        let after = fx(&world, e);
        assert!(!after.freeze.is_active());
        assert_eq!(after.freeze.slow_multiplier, 0.0);
        assert_eq!(after.speed_multiplier(), 1.0);
        assert!(!after.is_slowed());

        // A weaker slow after expiry is not held back by the old stun.
        p.apply_freeze(&mut world, e, 0.9, 200.0, 1.0);
        assert_eq!(fx(&world, e).freeze.slow_multiplier, 0.9);
    }

    #[test]
    fn poison_stacks_are_capped() {
        let (mut world, e, p) = setup(100.0);
        p.apply_poison(&mut world, e, 3, 3000.0, 5);
        p.apply_poison(&mut world, e, 4, 3000.0, 5);
        assert_eq!(fx(&world, e).poison.stacks, 5);
    }

    #[test]
    fn poison_ticks_on_its_own_cadence() {
        let (mut world, e, mut p) = setup(100.0);
        p.apply_poison(&mut world, e, 2, 1000.0, 5);
        let events = run(&mut p, &mut world, 1000.0, 100.0);
        // Ticks at 400 and 800 ms, 2 stacks x 2 damage each.
        assert_eq!(events.status_ticks.len(), 2);
        assert_eq!(world.get::<Health>(e).unwrap().current, 92.0);
        assert_eq!(fx(&world, e).poison.stacks, 0);
    }

    #[test]
    fn burn_tick_count_is_independent_of_frame_rate() {
        for dt in [1000.0 / 30.0, 1000.0 / 60.0, 1000.0 / 144.0, 7.0, 33.3, 100.0] {
            let (mut world, e, mut p) = setup(1000.0);
            p.apply_burn(&mut world, e, 5.0, 2000.0, 1.0);
            let events = run(&mut p, &mut world, 2100.0, dt);
            assert_eq!(events.status_ticks.len(), 4, "dt = {dt}");
            assert_eq!(world.get::<Health>(e).unwrap().current, 980.0, "dt = {dt}");
            assert!(!fx(&world, e).burn.is_active());
        }
    }

    #[test]
    fn poison_tick_count_is_independent_of_frame_rate() {
        for dt in [1000.0 / 30.0, 1000.0 / 60.0, 1000.0 / 144.0, 7.0] {
            let (mut world, e, mut p) = setup(1000.0);
            p.apply_poison(&mut world, e, 1, 1200.0, 5);
            let events = run(&mut p, &mut world, 1300.0, dt);
            // Due at 400, 800 and 1200 ms; the last coincides with expiry.
            assert_eq!(events.status_ticks.len(), 3, "dt = {dt}");
        }
    }

    #[test]
    fn large_step_fires_every_due_tick() {
        let (mut world, e, mut p) = setup(100.0);
        p.apply_burn(&mut world, e, 5.0, 2000.0, 1.0);
        let mut events = CombatEvents::new();
        assert_eq!(p.update(&mut world, 5000.0, &mut events), 4);
        assert_eq!(world.get::<Health>(e).unwrap().current, 80.0);
    }

    #[test]
    fn chain_immunity_counts_down() {
        let (mut world, e, mut p) = setup(100.0);
        assert!(p.can_chain_to(&world, e));
        p.set_chain_immunity(&mut world, e, 250.0);
        assert!(!p.can_chain_to(&world, e));
        run(&mut p, &mut world, 200.0, 100.0);
        assert!(!p.can_chain_to(&world, e));
        run(&mut p, &mut world, 100.0, 100.0);
        assert!(p.can_chain_to(&world, e));
    }

    #[test]
    fn status_death_is_reported_after_scan() {
        let (mut world, a, mut p) = setup(4.0);
        let b = world.spawn_enemy(Position::new(9.0, 9.0), 100.0, Enemy::new(10.0));
        p.apply_burn(&mut world, a, 5.0, 2000.0, 1.0);
        p.apply_poison(&mut world, b, 1, 2000.0, 5);

        let events = run(&mut p, &mut world, 500.0, 100.0);
        assert_eq!(events.deaths.len(), 1);
        let death = events.deaths[0];
        assert_eq!(death.enemy, a);
        assert_eq!(death.position, Position::new(3.0, 4.0));
        assert_eq!(death.cause, DeathCause::Status(StatusKind::Burn));

        // Dead entities are skipped until removed, never reported twice.
        let later = run(&mut p, &mut world, 1000.0, 100.0);
        assert!(later.deaths.is_empty());
    }

    #[test]
    fn applying_to_missing_entity_is_ignored() {
        let (mut world, e, p) = setup(10.0);
        world.despawn(e).unwrap();
        assert!(!p.apply_burn(&mut world, e, 5.0, 1000.0, 1.0));
        assert!(!p.apply_poison(&mut world, e, 1, 1000.0, 3));
    }
}
