//! Canonical gem grid: the single source of truth for gem positions.
//!
//! Every write rewrites the stored gem's `row`/`col` in the same call, so a
//! gem's coordinates always equal the slot that holds it.

use crate::types::{Gem, GemId, Pos, TypeGrid};

/// Row-major grid of optional gems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GemGrid {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<Option<Gem>>,
}

impl GemGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    #[inline(always)]
    fn idx(&self, pos: Pos) -> usize {
        pos.row * self.cols + pos.col
    }

    #[inline(always)]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn get(&self, pos: Pos) -> Option<&Gem> {
        if self.in_bounds(pos) {
            self.cells[self.idx(pos)].as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut Gem> {
        if self.in_bounds(pos) {
            let i = self.idx(pos);
            self.cells[i].as_mut()
        } else {
            None
        }
    }

    /// Place `gem` (or clear the slot). The gem's coordinates are rewritten to `pos`.
    pub fn set(&mut self, pos: Pos, gem: Option<Gem>) {
        if !self.in_bounds(pos) {
            return;
        }
        let i = self.idx(pos);
        self.cells[i] = gem.map(|mut g| {
            g.row = pos.row;
            g.col = pos.col;
            g
        });
    }

    /// Remove and return the gem at `pos`.
    pub fn take(&mut self, pos: Pos) -> Option<Gem> {
        if !self.in_bounds(pos) {
            return None;
        }
        let i = self.idx(pos);
        self.cells[i].take()
    }

    /// Exchange the contents of two slots, updating both gems' coordinates.
    pub fn swap_contents(&mut self, a: Pos, b: Pos) {
        if !self.in_bounds(a) || !self.in_bounds(b) || a == b {
            return;
        }
        let ga = self.take(a);
        let gb = self.take(b);
        self.set(a, gb);
        self.set(b, ga);
    }

    /// Gems at Manhattan distance 1 from `gem`, clipped to the grid.
    pub fn neighbors_of(&self, gem: &Gem) -> Vec<Gem> {
        const DIRS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];
        let mut out = Vec::with_capacity(4);
        for (dr, dc) in DIRS {
            let (Some(row), Some(col)) = (gem.row.checked_add_signed(dr), gem.col.checked_add_signed(dc)) else {
                continue;
            };
            if let Some(n) = self.get(Pos::new(row, col)) {
                out.push(*n);
            }
        }
        out
    }

    /// Current position of the gem with identity `id`.
    pub fn position_of(&self, id: GemId) -> Option<Pos> {
        self.gems().find(|g| g.id == id).map(|g| g.pos())
    }

    pub fn find(&self, id: GemId) -> Option<&Gem> {
        self.gems().find(|g| g.id == id)
    }

    /// All gems in row-major order.
    pub fn gems(&self) -> impl Iterator<Item = &Gem> {
        self.cells.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.gems().count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Value copy of the type matrix, or `None` while the grid has holes.
    pub fn snapshot_types(&self) -> Option<TypeGrid> {
        let mut types = TypeGrid::new(self.rows, self.cols);
        for (i, cell) in self.cells.iter().enumerate() {
            types.cells[i] = cell.as_ref()?.gem_type;
        }
        Some(types)
    }

    /// Every stored gem sits at its own coordinates and the storage is rectangular.
    pub fn is_consistent(&self) -> bool {
        self.cells.len() == self.rows * self.cols
            && self.cells.iter().enumerate().all(|(i, cell)| match cell {
                Some(g) => g.row == i / self.cols && g.col == i % self.cols,
                None => true,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(rows: usize, cols: usize) -> GemGrid {
        let mut grid = GemGrid::new(rows, cols);
        let mut id = 0;
        for r in 0..rows {
            for c in 0..cols {
                grid.set(Pos::new(r, c), Some(Gem::new(GemId(id), Pos::new(r, c), (id % 3) as u8)));
                id += 1;
            }
        }
        grid
    }

    #[test]
    fn test_set_rewrites_coordinates() {
        let mut grid = GemGrid::new(3, 3);
        let gem = Gem::new(GemId(7), Pos::new(0, 0), 1);
        grid.set(Pos::new(2, 1), Some(gem));
        let stored = grid.get(Pos::new(2, 1)).unwrap();
        assert_eq!((stored.row, stored.col), (2, 1));
        assert!(grid.is_consistent());
    }

    #[test]
    fn test_swap_contents_updates_both() {
        let mut grid = filled(3, 3);
        let a = *grid.get(Pos::new(0, 0)).unwrap();
        let b = *grid.get(Pos::new(0, 1)).unwrap();
        grid.swap_contents(a.pos(), b.pos());
        assert_eq!(grid.get(Pos::new(0, 1)).unwrap().id, a.id);
        assert_eq!(grid.get(Pos::new(0, 0)).unwrap().id, b.id);
        assert_eq!(grid.position_of(a.id), Some(Pos::new(0, 1)));
        assert!(grid.is_consistent());
    }

    #[test]
    fn test_swap_out_of_bounds_is_noop() {
        let mut grid = filled(3, 3);
        let before = grid.clone();
        grid.swap_contents(Pos::new(0, 0), Pos::new(5, 5));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_neighbors_corner_and_center() {
        let grid = filled(3, 3);
        assert_eq!(grid.neighbors_of(grid.get(Pos::new(0, 0)).unwrap()).len(), 2);
        assert_eq!(grid.neighbors_of(grid.get(Pos::new(1, 1)).unwrap()).len(), 4);
        assert_eq!(grid.neighbors_of(grid.get(Pos::new(2, 1)).unwrap()).len(), 3);
    }

    #[test]
    fn test_snapshot_requires_full_grid() {
        let mut grid = filled(3, 3);
        let types = grid.snapshot_types().unwrap();
        assert_eq!(types.get(0, 1), 1);
        assert_eq!(types.get(2, 2), 2);
        grid.take(Pos::new(1, 1));
        assert!(grid.snapshot_types().is_none());
        assert_eq!(grid.len(), 8);
        assert!(!grid.is_full());
    }
}
