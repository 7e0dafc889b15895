//! Per-tick enemy snapshot and sole writer of the spatial hash.
//!
//! [`FrameCache::update`] walks the world's living enemies once per tick,
//! rebuilds the [`SpatialHash`] from scratch and keeps flat copies of the ids
//! and positions. Every other system reads those instead of scanning the
//! world again.
//!
//! # States
//!
//! - **Stale**: nothing has been cached yet (fresh cache or after a reset).
//! - **Valid**: `update` ran this tick.
//! - **Invalidated**: someone removed enemies after `update` and called
//!   [`invalidate`](FrameCache::invalidate).
//!
//! Reads in any state other than Valid log a warning and return an empty
//! result. They never hand out data the cache knows is out of date; the
//! caller has to run `update` again.

use horde_ecs::entity::EntityId;
use horde_ecs::world::World;
use tracing::{trace, warn};

use crate::spatial::{SpatialEntry, SpatialHash};

/// Lifecycle of the cached data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Stale,
    Valid,
    Invalidated,
}

// ---------------------------------------------------------------------------
// FrameCache
// ---------------------------------------------------------------------------

/// The one-per-tick enemy query and everything derived from it.
#[derive(Debug, Clone)]
pub struct FrameCache {
    hash: SpatialHash,
    ids: Vec<EntityId>,
    entries: Vec<SpatialEntry>,
    state: CacheState,
    updates: u64,
}

impl FrameCache {
    /// Create a Stale cache whose hash uses `cell_size`.
    pub fn new(cell_size: f32) -> Self {
        Self {
            hash: SpatialHash::new(cell_size),
            ids: Vec::new(),
            entries: Vec::new(),
            state: CacheState::Stale,
            updates: 0,
        }
    }

    /// Rebuild from the world's living enemies. Call exactly once per tick,
    /// before any read. Returns the number of enemies cached.
    pub fn update(&mut self, world: &World) -> usize {
        self.hash.clear();
        self.ids.clear();
        self.entries.clear();

        for (id, pos, _enemy, _health) in world.living_enemies() {
            self.hash.insert(id, pos.x, pos.y);
            self.ids.push(id);
            self.entries.push(SpatialEntry {
                id,
                x: pos.x,
                y: pos.y,
            });
        }

        self.state = CacheState::Valid;
        self.updates += 1;
        trace!(enemies = self.ids.len(), update = self.updates, "frame cache rebuilt");
        self.ids.len()
    }

    /// Mark the cached data as out of date without refreshing it.
    pub fn invalidate(&mut self) {
        if self.state == CacheState::Valid {
            self.state = CacheState::Invalidated;
        }
    }

    /// Back to Stale with everything dropped. Used on a new game.
    pub fn reset(&mut self) {
        self.hash.clear();
        self.ids.clear();
        self.entries.clear();
        self.state = CacheState::Stale;
        self.updates = 0;
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        self.state == CacheState::Valid
    }

    /// How many times `update` has run since creation or reset.
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    fn readable(&self, operation: &'static str) -> bool {
        match self.state {
            CacheState::Valid => true,
            CacheState::Stale => {
                warn!(operation, "frame cache read before update; returning empty result");
                false
            }
            CacheState::Invalidated => {
                warn!(operation, "frame cache read after invalidation; returning empty result");
                false
            }
        }
    }

    // -- cached views -------------------------------------------------------

    /// Ids of every enemy cached this tick, in slot order.
    pub fn enemy_ids(&self) -> &[EntityId] {
        if self.readable("enemy_ids") {
            &self.ids
        } else {
            &[]
        }
    }

    /// `{id, x, y}` snapshots of every enemy cached this tick.
    pub fn enemy_positions(&self) -> &[SpatialEntry] {
        if self.readable("enemy_positions") {
            &self.entries
        } else {
            &[]
        }
    }

    pub fn enemy_count(&self) -> usize {
        if self.readable("enemy_count") {
            self.ids.len()
        } else {
            0
        }
    }

    /// Read access to this tick's hash, or `None` outside the Valid state.
    pub fn spatial(&self) -> Option<&SpatialHash> {
        self.readable("spatial").then_some(&self.hash)
    }

    // -- spatial delegations ------------------------------------------------

    pub fn nearest_enemy(
        &self,
        x: f32,
        y: f32,
        max_radius: f32,
        exclude: Option<EntityId>,
    ) -> Option<SpatialEntry> {
        if !self.readable("nearest_enemy") {
            return None;
        }
        self.hash.find_nearest(x, y, max_radius, exclude)
    }

    pub fn nearest_enemies(
        &self,
        x: f32,
        y: f32,
        max_radius: f32,
        n: usize,
        exclude: Option<EntityId>,
    ) -> Vec<SpatialEntry> {
        if !self.readable("nearest_enemies") {
            return Vec::new();
        }
        self.hash.find_nearest_n(x, y, max_radius, n, exclude)
    }

    pub fn enemies_in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        if !self.readable("enemies_in_radius") {
            return Vec::new();
        }
        self.hash.query(x, y, radius)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
