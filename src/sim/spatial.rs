//! Spatial hash grid for neighbor queries.
//!
//! Rebuilt from scratch every frame. Entries carry a snapshot of the fields
//! neighbor-sensitive systems read (position, velocity, size), so every token
//! in a step observes the same frame-start state regardless of mutation
//! order.

use hashbrown::HashMap;

use crate::sim::token::Token;
use crate::util::vec2::Vec2;

type CellKey = (i32, i32);

/// Frame-start snapshot of one live token.
#[derive(Debug, Clone, Copy)]
pub struct GridEntry {
    pub slot: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
}

/// Offsets covering a cell and its 8 neighbors.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    inv_cell_size: f32,
    cells: HashMap<CellKey, Vec<GridEntry>>,
}

/// Occupancy report for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialGridStats {
    pub occupied_cells: usize,
    pub total_entries: usize,
    pub max_entries_per_cell: usize,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        SpatialGrid {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn position_to_cell(&self, position: Vec2) -> CellKey {
        (
            (position.x * self.inv_cell_size).floor() as i32,
            (position.y * self.inv_cell_size).floor() as i32,
        )
    }

    /// Drop all entries but keep cell allocations for reuse.
    pub fn clear(&mut self) {
        for entries in self.cells.values_mut() {
            entries.clear();
        }
    }

    /// Clear and reinsert every live token. O(n).
    pub fn rebuild(&mut self, slots: &[Option<Token>]) {
        self.clear();
        for (slot, token) in slots.iter().enumerate() {
            let Some(token) = token else { continue };
            if !token.alive {
                continue;
            }
            let cell = self.position_to_cell(token.position);
            self.cells.entry(cell).or_default().push(GridEntry {
                slot,
                position: token.position,
                velocity: token.velocity,
                size: token.current_size,
            });
        }
    }

    /// All entries within `radius` of `point`, as a cell-level superset:
    /// callers re-filter by exact distance. Scans `ceil(r / cell) + 1` rings
    /// so bodies straddling cell borders are never missed.
    pub fn query_radius(&self, point: Vec2, radius: f32) -> impl Iterator<Item = &GridEntry> {
        let center = self.position_to_cell(point);
        let rings = (radius * self.inv_cell_size).ceil() as i32 + 1;
        (-rings..=rings).flat_map(move |dy| {
            (-rings..=rings).flat_map(move |dx| {
                self.cells
                    .get(&(center.0 + dx, center.1 + dy))
                    .into_iter()
                    .flatten()
            })
        })
    }

    /// Entries in the 3x3 cell window around `point`, excluding `slot`
    /// itself. This is the collision candidate set.
    pub fn query_neighbors(&self, slot: usize, point: Vec2) -> impl Iterator<Item = &GridEntry> {
        let center = self.position_to_cell(point);
        NEIGHBOR_OFFSETS
            .iter()
            .flat_map(move |&(dx, dy)| {
                self.cells
                    .get(&(center.0 + dx, center.1 + dy))
                    .into_iter()
                    .flatten()
            })
            .filter(move |entry| entry.slot != slot)
    }

    pub fn stats(&self) -> SpatialGridStats {
        let mut stats = SpatialGridStats::default();
        for entries in self.cells.values() {
            if entries.is_empty() {
                continue;
            }
            stats.occupied_cells += 1;
            stats.total_entries += entries.len();
            stats.max_entries_per_cell = stats.max_entries_per_cell.max(entries.len());
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Facing;

    fn token_at(x: f32, y: f32) -> Option<Token> {
        Some(Token::new(Vec2::new(x, y), Vec2::new(64.0, 64.0), Facing::Top))
    }

    #[test]
    fn test_empty_grid_returns_nothing() {
        let grid = SpatialGrid::new(50.0);
        assert_eq!(grid.query_radius(Vec2::new(10.0, 10.0), 100.0).count(), 0);
        assert_eq!(grid.query_neighbors(0, Vec2::ZERO).count(), 0);
    }

    #[test]
    fn test_cell_size_floor() {
        let grid = SpatialGrid::new(0.0);
        assert_eq!(grid.cell_size(), 1.0);
    }

    #[test]
    fn test_negative_coordinates_floor_correctly() {
        let grid = SpatialGrid::new(50.0);
        assert_eq!(grid.position_to_cell(Vec2::new(-1.0, -1.0)), (-1, -1));
        assert_eq!(grid.position_to_cell(Vec2::new(-50.0, 49.9)), (-1, 0));
    }

    #[test]
    fn test_close_tokens_are_neighbors_far_ones_are_not() {
        let slots = vec![token_at(10.0, 10.0), token_at(12.0, 12.0), token_at(1000.0, 1000.0)];
        let mut grid = SpatialGrid::new(50.0);
        grid.rebuild(&slots);

        let neighbors: Vec<usize> = grid
            .query_neighbors(0, Vec2::new(10.0, 10.0))
            .map(|e| e.slot)
            .collect();
        assert_eq!(neighbors, vec![1]);
    }

    #[test]
    fn test_query_excludes_self() {
        let slots = vec![token_at(10.0, 10.0)];
        let mut grid = SpatialGrid::new(50.0);
        grid.rebuild(&slots);
        assert_eq!(grid.query_neighbors(0, Vec2::new(10.0, 10.0)).count(), 0);
    }

    #[test]
    fn test_dead_and_empty_slots_are_skipped() {
        let mut dead = token_at(20.0, 20.0);
        if let Some(t) = dead.as_mut() {
            t.alive = false;
        }
        let slots = vec![token_at(10.0, 10.0), None, dead];
        let mut grid = SpatialGrid::new(50.0);
        grid.rebuild(&slots);
        assert_eq!(grid.stats().total_entries, 1);
    }

    #[test]
    fn test_radius_query_spans_cell_borders() {
        // 49 and 51 sit in different cells but within radius 10 of each other.
        let slots = vec![token_at(49.0, 0.0), token_at(51.0, 0.0)];
        let mut grid = SpatialGrid::new(50.0);
        grid.rebuild(&slots);
        let hits = grid.query_radius(Vec2::new(49.0, 0.0), 10.0).count();
        assert_eq!(hits, 2);
    }

    #[test]
    fn test_rebuild_replaces_previous_frame() {
        let mut grid = SpatialGrid::new(50.0);
        grid.rebuild(&[token_at(10.0, 10.0), token_at(20.0, 20.0)]);
        assert_eq!(grid.stats().total_entries, 2);
        grid.rebuild(&[token_at(500.0, 500.0)]);
        let stats = grid.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(grid.query_radius(Vec2::new(10.0, 10.0), 30.0).count(), 0);
    }

    #[test]
    fn test_entries_snapshot_token_fields() {
        let mut slots = vec![token_at(10.0, 10.0)];
        if let Some(t) = slots[0].as_mut() {
            t.velocity = Vec2::new(3.0, -2.0);
            t.current_size = Vec2::new(40.0, 40.0);
        }
        let mut grid = SpatialGrid::new(50.0);
        grid.rebuild(&slots);
        let entry = grid.query_radius(Vec2::new(10.0, 10.0), 1.0).next().unwrap();
        assert_eq!(entry.velocity, Vec2::new(3.0, -2.0));
        assert_eq!(entry.size, Vec2::new(40.0, 40.0));
    }
}
