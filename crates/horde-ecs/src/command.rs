//! Deferred removals with causality metadata.
//!
//! Systems never remove entities while walking them. They queue a
//! [`Command`] here instead, and the owning loop applies the whole buffer in
//! one pass once the walk is over. Each target is acted on at most once per
//! pass, however many times it was queued: two projectiles landing the
//! killing blow on the same enemy still produce a single despawn.
//!
//! # Example
//!
//! ```
//! use horde_ecs::prelude::*;
//!
//! let mut world = World::new();
//! let enemy = world.spawn_enemy(Position::new(0.0, 0.0), 10.0, Enemy::new(8.0));
//!
//! let mut cmds = CommandBuffer::new();
//! cmds.despawn(enemy, CausalReason::GameRule("killed".to_owned()));
//! cmds.despawn(enemy, CausalReason::GameRule("killed".to_owned()));
//!
//! let report = cmds.apply(&mut world);
//! assert_eq!(report.despawned, vec![enemy]);
//! assert_eq!(report.duplicates, 1);
//! assert!(!world.is_alive(enemy));
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::EntityId;
use crate::world::World;

// ---------------------------------------------------------------------------
// CausalReason
// ---------------------------------------------------------------------------

/// Why a removal was queued. Kept for logs and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CausalReason {
    /// A projectile hit the target.
    CollisionResponse(EntityId, EntityId),
    /// A gameplay rule, e.g. `"overkill_splash"`.
    GameRule(String),
    /// A countdown ran out, e.g. `"projectile_lifetime"`.
    Timer(String),
    /// Last resort; prefer a specific reason.
    SystemInternal(String),
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// What to do with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    /// Strip components and release the handle.
    Despawn,
    /// Strip components but keep the handle for a pool to reuse.
    Recycle,
}

/// One queued removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub target: EntityId,
    pub kind: CommandKind,
    pub reason: CausalReason,
}

// ---------------------------------------------------------------------------
// ApplyReport
// ---------------------------------------------------------------------------

/// Outcome of one [`CommandBuffer::apply`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Handles released, in queue order.
    pub despawned: Vec<EntityId>,
    /// Handles stripped and kept alive, in queue order.
    pub recycled: Vec<EntityId>,
    /// Commands skipped because their target was already handled this pass.
    pub duplicates: usize,
    /// Commands skipped because their target was already gone.
    pub stale: usize,
}

// ---------------------------------------------------------------------------
// CommandBuffer
// ---------------------------------------------------------------------------

/// FIFO queue of deferred removals.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    seen: HashSet<EntityId>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `target` for despawn.
    pub fn despawn(&mut self, target: EntityId, reason: CausalReason) {
        self.commands.push(Command {
            target,
            kind: CommandKind::Despawn,
            reason,
        });
    }

    /// Queue `target` to be stripped and handed back to its pool.
    pub fn recycle(&mut self, target: EntityId, reason: CausalReason) {
        self.commands.push(Command {
            target,
            kind: CommandKind::Recycle,
            reason,
        });
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Queued commands, oldest first.
    pub fn pending(&self) -> &[Command] {
        &self.commands
    }

    /// Whether `target` already has a command queued.
    pub fn contains(&self, target: EntityId) -> bool {
        self.commands.iter().any(|c| c.target == target)
    }

    /// Drop every queued command without applying it.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.seen.clear();
    }

    /// Apply and drain the queue in FIFO order.
    ///
    /// The first command for a target wins; later ones are counted as
    /// duplicates. Commands against stale handles are skipped with a warning.
    pub fn apply(&mut self, world: &mut World) -> ApplyReport {
        let mut report = ApplyReport::default();
        self.seen.clear();

        for cmd in self.commands.drain(..) {
            if !self.seen.insert(cmd.target) {
                report.duplicates += 1;
                continue;
            }
            let result = match cmd.kind {
                CommandKind::Despawn => world.despawn(cmd.target),
                CommandKind::Recycle => world.strip(cmd.target),
            };
            match result {
                Ok(()) => match cmd.kind {
                    CommandKind::Despawn => report.despawned.push(cmd.target),
                    CommandKind::Recycle => report.recycled.push(cmd.target),
                },
                Err(e) => {
                    report.stale += 1;
                    warn!(
                        target_entity = %cmd.target,
                        kind = ?cmd.kind,
                        reason = ?cmd.reason,
                        error = %e,
                        "deferred removal skipped"
                    );
                }
            }
        }

        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
