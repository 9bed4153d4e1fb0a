//! Sparse block grid keyed by integer cell coordinates
//!
//! Replaces linear scans over a block list: neighbourhood and radius queries
//! only touch the cells they cover.

use std::collections::HashMap;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::state::Block;
use crate::consts::BLOCK_SIZE;

/// Cell containing a world-space point
#[inline]
pub fn cell_of(pos: Vec2) -> IVec2 {
    IVec2::new(
        (pos.x / BLOCK_SIZE).floor() as i32,
        (pos.y / BLOCK_SIZE).floor() as i32,
    )
}

/// World-space centre of a cell
#[inline]
pub fn cell_center(cell: IVec2) -> Vec2 {
    Vec2::new(
        (cell.x as f32 + 0.5) * BLOCK_SIZE,
        (cell.y as f32 + 0.5) * BLOCK_SIZE,
    )
}

#[derive(Debug, Clone, Default)]
pub struct BlockGrid {
    cells: HashMap<IVec2, Block>,
    /// Deepest generated row (None before the first row)
    deepest_row: Option<i32>,
}

impl BlockGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, cell: IVec2) -> Option<&Block> {
        self.cells.get(&cell)
    }

    pub fn get_mut(&mut self, cell: IVec2) -> Option<&mut Block> {
        self.cells.get_mut(&cell)
    }

    /// Insert a block at its own cell, replacing any occupant
    pub fn insert(&mut self, block: Block) -> Option<Block> {
        self.cells.insert(block.cell(), block)
    }

    pub fn remove(&mut self, cell: IVec2) -> Option<Block> {
        self.cells.remove(&cell)
    }

    /// Insert a freshly generated row and advance the frontier
    pub fn insert_row(&mut self, row_index: i32, row: Vec<Block>) {
        for block in row {
            self.insert(block);
        }
        self.deepest_row = Some(self.deepest_row.map_or(row_index, |d| d.max(row_index)));
    }

    pub fn deepest_row(&self) -> Option<i32> {
        self.deepest_row
    }

    /// Remove every block in rows above `row_index`
    pub fn prune_above(&mut self, row_index: i32) -> usize {
        let before = self.cells.len();
        self.cells.retain(|cell, _| cell.y >= row_index);
        before - self.cells.len()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.deepest_row = None;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.cells.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.cells.values_mut()
    }

    /// Blocks in a single row, sorted by column
    pub fn row(&self, row_index: i32) -> Vec<&Block> {
        let mut row: Vec<_> = self.cells.values().filter(|b| b.cell().y == row_index).collect();
        row.sort_by_key(|b| b.cell().x);
        row
    }

    /// Occupied cells in the 3x3 neighbourhood around `center`
    pub fn neighborhood(&self, center: IVec2) -> Vec<IVec2> {
        let mut cells = Vec::with_capacity(9);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let cell = center + IVec2::new(dx, dy);
                if self.cells.contains_key(&cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Occupied cells whose centre lies within `radius` of `center`
    pub fn cells_within(&self, center: Vec2, radius: f32) -> Vec<IVec2> {
        let min = cell_of(center - Vec2::splat(radius));
        let max = cell_of(center + Vec2::splat(radius));
        let mut cells = Vec::new();
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let cell = IVec2::new(x, y);
                if self.cells.contains_key(&cell) && cell_center(cell).distance(center) <= radius {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Cells of destroyed blocks (hp <= 0, not indestructible)
    pub fn destroyed_cells(&self) -> Vec<IVec2> {
        self.cells
            .iter()
            .filter(|(_, b)| b.is_destroyed())
            .map(|(cell, _)| *cell)
            .collect()
    }
}

// Serialized as a flat list of blocks (JSON maps need string keys).
impl Serialize for BlockGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.cells.values())
    }
}

impl<'de> Deserialize<'de> for BlockGrid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let blocks = Vec::<Block>::deserialize(deserializer)?;
        let mut grid = BlockGrid::new();
        for block in blocks {
            let row = block.cell().y;
            grid.deepest_row = Some(grid.deepest_row.map_or(row, |d| d.max(row)));
            grid.insert(block);
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::BlockType;

    fn stone(x: i32, y: i32) -> Block {
        Block::new(IVec2::new(x, y), BlockType::Stone, 1.0)
    }

    #[test]
    fn test_one_block_per_cell() {
        let mut grid = BlockGrid::new();
        grid.insert(stone(2, 3));
        let replaced = grid.insert(Block::new(IVec2::new(2, 3), BlockType::LootCrate, 1.0));
        assert!(replaced.is_some());
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.get(IVec2::new(2, 3)).map(|b| b.block_type), Some(BlockType::LootCrate));
    }

    #[test]
    fn test_neighborhood_only_returns_occupied() {
        let mut grid = BlockGrid::new();
        grid.insert(stone(5, 5));
        grid.insert(stone(6, 6));
        grid.insert(stone(8, 8));
        let mut cells = grid.neighborhood(IVec2::new(5, 5));
        cells.sort_by_key(|c| (c.x, c.y));
        assert_eq!(cells, vec![IVec2::new(5, 5), IVec2::new(6, 6)]);
    }

    #[test]
    fn test_prune_and_frontier() {
        let mut grid = BlockGrid::new();
        for y in 0..4 {
            grid.insert_row(y, vec![stone(1, y), stone(2, y)]);
        }
        assert_eq!(grid.deepest_row(), Some(3));
        assert_eq!(grid.prune_above(2), 4);
        assert_eq!(grid.len(), 4);
        assert!(grid.get(IVec2::new(1, 1)).is_none());
        assert_eq!(grid.row(3).len(), 2);
    }

    #[test]
    fn test_cells_within_radius() {
        let mut grid = BlockGrid::new();
        for x in 0..10 {
            grid.insert(stone(x, 0));
        }
        let center = cell_center(IVec2::new(5, 0));
        let cells = grid.cells_within(center, BLOCK_SIZE * 1.5);
        assert_eq!(cells.len(), 3);
    }
}
