//! Headless swarm harness.
//!
//! Spawns a ring of enemies that walk toward a turret at the origin, fires
//! at the nearest one every few ticks and prints a summary with the final
//! state hash.
//!
//! Usage: `cargo run --bin horde_harness -- [--config cfg.json] [--ticks N] [--enemies N]`
//!
//! Set `RUST_LOG=horde_engine=debug` for per-step logs.

use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use horde_engine::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::info;

const DT_MS: f32 = 1000.0 / 60.0;
const FIRE_EVERY: u64 = 6;
const ENEMY_SPEED: f32 = 40.0;
const SHOT_SPEED: f32 = 600.0;
const USAGE: &str = "usage: horde_harness [--config path] [--ticks N] [--enemies N]";

struct Args {
    config: Option<String>,
    ticks: u64,
    enemies: usize,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        ticks: 1800,
        enemies: 500,
    };
    let mut it = env::args().skip(1);
    while let Some(flag) = it.next() {
        let value = it
            .next()
            .with_context(|| format!("missing value for {flag}"))?;
        match flag.as_str() {
            "--config" => args.config = Some(value),
            "--ticks" => args.ticks = value.parse().context("--ticks expects an integer")?,
            "--enemies" => args.enemies = value.parse().context("--enemies expects an integer")?,
            other => bail!("unknown flag {other}; {USAGE}"),
        }
    }
    Ok(args)
}

fn load_config(path: Option<&str>) -> Result<CombatConfig> {
    let Some(path) = path else {
        return Ok(CombatConfig::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    CombatConfig::from_json_str(&json).with_context(|| format!("loading {path}"))
}

fn spawn_ring(sim: &mut Simulation, rng: &mut Pcg32, count: usize) {
    for _ in 0..count {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let dist = rng.gen_range(300.0..900.0);
        let hp = rng.gen_range(10.0..60.0);
        let armor = if rng.gen_bool(0.1) { 0.3 } else { 0.0 };
        sim.spawn_enemy(
            Position::new(angle.cos() * dist, angle.sin() * dist),
            hp,
            Enemy::new(12.0).with_armor(armor),
        );
    }
}

/// Walk every enemy toward the origin and bleed off knockback.
fn move_enemies(world: &mut World, dt_ms: f32) {
    let seconds = dt_ms / 1000.0;
    for id in world.ids_with::<Enemy>() {
        let speed = world
            .get::<StatusEffects>(id)
            .map_or(1.0, StatusEffects::speed_multiplier)
            * ENEMY_SPEED;
        let kb = world.get::<Knockback>(id).copied().unwrap_or_default();
        let Some(pos) = world.get_mut::<Position>(id) else {
            continue;
        };
        let len = (pos.x * pos.x + pos.y * pos.y).sqrt().max(1.0);
        pos.x += (-pos.x / len * speed + kb.vx) * seconds;
        pos.y += (-pos.y / len * speed + kb.vy) * seconds;
        if let Some(kb) = world.get_mut::<Knockback>(id) {
            kb.vx *= 0.85;
            kb.vy *= 0.85;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = parse_args()?;
    let config = load_config(args.config.as_deref())?;
    let mut rng = Pcg32::seed_from_u64(config.seed ^ 0x5741_524d);
    let mut sim = Simulation::new(config).context("building simulation")?;
    spawn_ring(&mut sim, &mut rng, args.enemies);

    let stats = CombatStats {
        crit_chance: 0.2,
        burn_chance: 0.1,
        freeze_chance: 0.05,
        poison_chance: 0.1,
        execution_bonus: 0.5,
        shatter_bonus: 0.25,
        overkill_splash: 0.5,
        life_steal: 0.02,
        ..CombatStats::default()
    };

    let mut kills = 0usize;
    let mut hits = 0usize;
    let mut healing = 0.0f32;
    for tick in 0..args.ticks {
        move_enemies(sim.world_mut(), DT_MS);
        // The cache is refused after status kills until the next step.
        if tick % FIRE_EVERY == 0 && sim.cache().is_valid() {
            if let Some(target) = sim.cache().nearest_enemy(0.0, 0.0, 1500.0, None) {
                let len = (target.x * target.x + target.y * target.y).sqrt().max(1.0);
                sim.fire(
                    Position::new(0.0, 0.0),
                    Projectile::new(25.0, 2500.0, 2, 6.0)
                        .with_velocity(target.x / len * SHOT_SPEED, target.y / len * SHOT_SPEED),
                );
            }
        }
        let report = sim.step(DT_MS, &stats);
        kills += report.events.deaths.len();
        hits += report.events.hits.len();
        healing += report.events.total_healing();
    }

    let hash = sim.state_hash().context("hashing final state")?;
    info!(ticks = args.ticks, kills, hits, "harness finished");
    let (spawned, reused) = sim.pool().acquisitions();
    println!("[horde] ticks:      {}", args.ticks);
    println!("[horde] kills:      {kills} / {}", args.enemies);
    println!("[horde] hits:       {hits}");
    println!("[horde] healing:    {healing:.1}");
    println!("[horde] projectiles spawned {spawned}, reused {reused}");
    println!("[horde] state hash: {hash}");
    Ok(())
}
