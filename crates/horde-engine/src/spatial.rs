//! Uniform-grid spatial hash for proximity queries.
//!
//! Points are bucketed by `(floor(x / cell), floor(y / cell))`. A query scans
//! every cell overlapping the bounding square of the query circle, so cost is
//! proportional to the number of points in those cells rather than to the
//! whole population.
//!
//! The hash has no update or delete: it is cleared and refilled once per tick
//! by the [`FrameCache`](crate::frame_cache::FrameCache), and every entry
//! lives exactly one tick.
//!
//! # Example
//!
//! ```
//! use horde_engine::spatial::SpatialHash;
//! use horde_ecs::entity::EntityId;
//!
//! let mut hash = SpatialHash::new(80.0);
//! hash.insert(EntityId::new(0, 0), 10.0, 10.0);
//! hash.insert(EntityId::new(1, 0), 500.0, 500.0);
//!
//! let near = hash.query(0.0, 0.0, 20.0);
//! assert_eq!(near.len(), 1);
//! assert_eq!(near[0].id, EntityId::new(0, 0));
//! ```

use std::collections::HashMap;

use horde_ecs::entity::EntityId;

/// One point stored in the hash for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialEntry {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
}

impl SpatialEntry {
    #[inline]
    pub fn distance_squared(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }
}

type CellKey = (i32, i32);

// ---------------------------------------------------------------------------
// SpatialHash
// ---------------------------------------------------------------------------

/// Grid of buckets keyed by integer cell coordinates.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<SpatialEntry>>,
    len: usize,
}

impl SpatialHash {
    /// Create an empty hash.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not positive and finite.
    pub fn new(cell_size: f32) -> Self {
        assert!(
            cell_size > 0.0 && cell_size.is_finite(),
            "cell_size must be positive and finite, got {cell_size}"
        );
        Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of points inserted since the last [`clear`](Self::clear).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn cell_coord(&self, v: f32) -> i32 {
        (v / self.cell_size).floor() as i32
    }

    /// Empty every bucket.
    ///
    /// Buckets that held points this tick keep their allocation for the next
    /// fill; buckets that stayed empty are dropped so the map tracks where
    /// entities actually are.
    pub fn clear(&mut self) {
        if self.cells.is_empty() {
            return;
        }
        self.cells.retain(|_, bucket| !bucket.is_empty());
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Place a point in its cell.
    pub fn insert(&mut self, id: EntityId, x: f32, y: f32) {
        let key = (self.cell_coord(x), self.cell_coord(y));
        self.cells.entry(key).or_default().push(SpatialEntry { id, x, y });
        self.len += 1;
    }

    /// Visit every entry in the cells overlapping the circle's bounding
    /// square. Cells are walked in ascending `(cx, cy)` order, so results
    /// are deterministic for a given fill.
    ///
    /// When the square spans more cells than are occupied, the occupied
    /// buckets are filtered and sorted instead, so a huge or infinite radius
    /// costs the same as a full scan.
    fn for_each_candidate(
        &self,
        x: f32,
        y: f32,
        radius: f32,
        mut visit: impl FnMut(&SpatialEntry),
    ) {
        if self.len == 0 || radius.is_nan() || radius < 0.0 {
            return;
        }
        let min_cx = self.cell_coord(x - radius);
        let max_cx = self.cell_coord(x + radius);
        let min_cy = self.cell_coord(y - radius);
        let max_cy = self.cell_coord(y + radius);

        let span = (i64::from(max_cx) - i64::from(min_cx) + 1)
            .saturating_mul(i64::from(max_cy) - i64::from(min_cy) + 1);
        if span > self.cells.len() as i64 {
            let mut keys: Vec<CellKey> = self
                .cells
                .iter()
                .filter(|&(&(cx, cy), bucket)| {
                    !bucket.is_empty()
                        && (min_cx..=max_cx).contains(&cx)
                        && (min_cy..=max_cy).contains(&cy)
                })
                .map(|(&key, _)| key)
                .collect();
            keys.sort_unstable();
            for key in keys {
                if let Some(bucket) = self.cells.get(&key) {
                    bucket.iter().for_each(&mut visit);
                }
            }
            return;
        }

        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    bucket.iter().for_each(&mut visit);
                }
            }
        }
    }

    /// All points whose distance to `(x, y)` is at most `radius`.
    pub fn query(&self, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        let mut out = Vec::new();
        self.query_into(x, y, radius, &mut out);
        out
    }

    /// [`query`](Self::query) into a caller-owned buffer, which is cleared
    /// first.
    pub fn query_into(&self, x: f32, y: f32, radius: f32, out: &mut Vec<SpatialEntry>) {
        out.clear();
        let r2 = radius * radius;
        self.for_each_candidate(x, y, radius, |e| {
            if e.distance_squared(x, y) <= r2 {
                out.push(*e);
            }
        });
    }

    /// Every point in the scanned cells, without the exact distance filter.
    /// A superset of [`query`](Self::query) for callers that compute the
    /// distance themselves anyway.
    pub fn query_potential(&self, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        let mut out = Vec::new();
        self.query_potential_into(x, y, radius, &mut out);
        out
    }

    /// [`query_potential`](Self::query_potential) into a caller-owned buffer.
    pub fn query_potential_into(
        &self,
        x: f32,
        y: f32,
        radius: f32,
        out: &mut Vec<SpatialEntry>,
    ) {
        out.clear();
        self.for_each_candidate(x, y, radius, |e| out.push(*e));
    }

    /// The closest point within `max_radius`, skipping `exclude`.
    ///
    /// On an exact distance tie the first point encountered wins.
    pub fn find_nearest(
        &self,
        x: f32,
        y: f32,
        max_radius: f32,
        exclude: Option<EntityId>,
    ) -> Option<SpatialEntry> {
        let mut best: Option<(f32, SpatialEntry)> = None;
        let r2 = max_radius * max_radius;
        self.for_each_candidate(x, y, max_radius, |e| {
            if Some(e.id) == exclude {
                return;
            }
            let d2 = e.distance_squared(x, y);
            if d2 > r2 {
                return;
            }
            if best.map_or(true, |(best_d2, _)| d2 < best_d2) {
                best = Some((d2, *e));
            }
        });
        best.map(|(_, e)| e)
    }

    /// Up to `n` closest points within `max_radius`, nearest first.
    pub fn find_nearest_n(
        &self,
        x: f32,
        y: f32,
        max_radius: f32,
        n: usize,
        exclude: Option<EntityId>,
    ) -> Vec<SpatialEntry> {
        if n == 0 {
            return Vec::new();
        }
        let r2 = max_radius * max_radius;
        let mut found: Vec<(f32, SpatialEntry)> = Vec::new();
        self.for_each_candidate(x, y, max_radius, |e| {
            if Some(e.id) == exclude {
                return;
            }
            let d2 = e.distance_squared(x, y);
            if d2 <= r2 {
                found.push((d2, *e));
            }
        });
        // Stable sort keeps encounter order among equal distances.
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.truncate(n);
        found.into_iter().map(|(_, e)| e).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> EntityId {
        EntityId::new(i, 0)
    }

    fn ids(entries: &[SpatialEntry]) -> Vec<u32> {
        let mut v: Vec<u32> = entries.iter().map(|e| e.id.index()).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn empty_hash_answers_nothing() {
        let hash = SpatialHash::new(80.0);
        assert!(hash.query(0.0, 0.0, 1000.0).is_empty());
        assert!(hash.query_potential(0.0, 0.0, 1000.0).is_empty());
        assert!(hash.find_nearest(0.0, 0.0, 1000.0, None).is_none());
        assert!(hash.find_nearest_n(0.0, 0.0, 1000.0, 3, None).is_empty());
    }

    #[test]
    fn query_filters_by_exact_distance() {
        let mut hash = SpatialHash::new(80.0);
        hash.insert(id(0), 0.0, 0.0);
        hash.insert(id(1), 30.0, 40.0); // distance 50
        hash.insert(id(2), 51.0, 0.0);

        assert_eq!(ids(&hash.query(0.0, 0.0, 50.0)), vec![0, 1]);
        // All three share cell (0, 0), so the unfiltered scan sees all.
        assert_eq!(ids(&hash.query_potential(0.0, 0.0, 50.0)), vec![0, 1, 2]);
    }

    #[test]
    fn negative_coordinates_floor_into_their_own_cells() {
        let mut hash = SpatialHash::new(10.0);
        hash.insert(id(0), -0.5, -0.5);
        hash.insert(id(1), 0.5, 0.5);
        assert_eq!(ids(&hash.query(0.0, 0.0, 1.0)), vec![0, 1]);
        assert_eq!(ids(&hash.query(-5.0, -5.0, 1.0)), Vec::<u32>::new());
    }

    #[test]
    fn radius_larger_than_cell_scans_more_cells() {
        let mut hash = SpatialHash::new(10.0);
        hash.insert(id(0), 95.0, 0.0);
        assert_eq!(ids(&hash.query(0.0, 0.0, 100.0)), vec![0]);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut hash = SpatialHash::new(80.0);
        hash.clear();
        hash.insert(id(0), 1.0, 1.0);
        hash.clear();
        hash.clear();
        assert!(hash.is_empty());
        assert!(hash.query(1.0, 1.0, 5.0).is_empty());
    }

    #[test]
    fn find_nearest_respects_exclude_and_radius() {
        let mut hash = SpatialHash::new(80.0);
        hash.insert(id(0), 1.0, 0.0);
        hash.insert(id(1), 5.0, 0.0);
        hash.insert(id(2), 200.0, 0.0);

        assert_eq!(hash.find_nearest(0.0, 0.0, 100.0, None).map(|e| e.id), Some(id(0)));
        assert_eq!(
            hash.find_nearest(0.0, 0.0, 100.0, Some(id(0))).map(|e| e.id),
            Some(id(1))
        );
        assert!(hash.find_nearest(150.0, 150.0, 10.0, None).is_none());
    }

    #[test]
    fn find_nearest_n_sorts_ascending_and_truncates() {
        let mut hash = SpatialHash::new(16.0);
        hash.insert(id(0), 30.0, 0.0);
        hash.insert(id(1), 10.0, 0.0);
        hash.insert(id(2), 20.0, 0.0);
        hash.insert(id(3), 40.0, 0.0);

        let got: Vec<u32> = hash
            .find_nearest_n(0.0, 0.0, 35.0, 3, None)
            .iter()
            .map(|e| e.id.index())
            .collect();
        assert_eq!(got, vec![1, 2, 0]);
        assert!(hash.find_nearest_n(0.0, 0.0, 35.0, 0, None).is_empty());
    }

    #[test]
    fn infinite_radius_scans_occupied_cells_only() {
        let mut hash = SpatialHash::new(80.0);
        hash.insert(id(0), 5.0, 5.0);
        hash.insert(id(1), -9_000.0, 12_000.0);

        let near = hash.find_nearest(0.0, 0.0, f32::INFINITY, None);
        assert_eq!(near.map(|e| e.id), Some(id(0)));
        assert_eq!(ids(&hash.query(0.0, 0.0, f32::INFINITY)), vec![0, 1]);
        assert_eq!(ids(&hash.query_potential(0.0, 0.0, f32::INFINITY)), vec![0, 1]);
        assert_eq!(hash.find_nearest_n(0.0, 0.0, f32::INFINITY, 5, None).len(), 2);
    }

    #[test]
    fn huge_radius_visits_cells_in_grid_walk_order() {
        let mut hash = SpatialHash::new(10.0);
        let mut next = 0;
        for cx in -10..=10 {
            for cy in (-10..=10).rev() {
                hash.insert(id(next), cx as f32 * 10.0 + 5.0, cy as f32 * 10.0 + 5.0);
                next += 1;
            }
        }
        let order = |radius: f32| -> Vec<u32> {
            hash.query_potential(0.0, 0.0, radius)
                .iter()
                .map(|e| e.id.index())
                .collect()
        };
        // A 4x4 span walks the grid; 200k spans far more cells than are
        // occupied and takes the bucket scan. Both agree on order.
        let walked = order(15.0);
        assert_eq!(walked.len(), 16);
        let scanned: Vec<u32> = order(200_000.0)
            .into_iter()
            .filter(|i| walked.contains(i))
            .collect();
        assert_eq!(walked, scanned);
        assert_eq!(hash.query(0.0, 0.0, 200_000.0).len(), 441);
        assert!(hash.find_nearest(1.0e6, 1.0e6, 5.0e6, None).is_some());
    }

    #[test]
    #[should_panic(expected = "cell_size must be positive")]
    fn zero_cell_size_panics() {
        let _ = SpatialHash::new(0.0);
    }
}
