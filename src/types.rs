//! Core data types for the match-3 engine.
//!
//! Type matrices use flat `Vec` storage with row-major layout:
//! `cells[row * cols + col]` maps to the JS equivalent `grid[row][col]`.

use serde::{Deserialize, Serialize};

/// Index into the board palette (`gem_keys`).
pub type GemType = u8;

/// Stable gem identity. Survives moves, promotions and retyping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GemId(pub u32);

/// Special behavior tag. Decides what a gem does when it is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GemKind {
    #[default]
    Normal,
    /// Clears its whole row.
    StripeH,
    /// Clears its whole column.
    StripeV,
    /// Clears the 3×3 block around it.
    AreaBomb,
    /// Clears every gem of one type when swapped with a normal gem.
    ColorBomb,
}

impl GemKind {
    #[inline(always)]
    pub fn is_special(self) -> bool {
        self != GemKind::Normal
    }
}

/// Grid coordinate. `row` 0 is the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    #[inline(always)]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    #[inline(always)]
    pub fn manhattan(self, other: Pos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    #[inline(always)]
    pub fn is_adjacent(self, other: Pos) -> bool {
        self.manhattan(other) == 1
    }
}

/// A typed token occupying one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gem {
    pub id: GemId,
    pub row: usize,
    pub col: usize,
    #[serde(rename = "type")]
    pub gem_type: GemType,
    pub kind: GemKind,
}

impl Gem {
    pub fn new(id: GemId, pos: Pos, gem_type: GemType) -> Self {
        Self {
            id,
            row: pos.row,
            col: pos.col,
            gem_type,
            kind: GemKind::Normal,
        }
    }

    #[inline(always)]
    pub fn pos(&self) -> Pos {
        Pos::new(self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    Row,
    Col,
}

/// A run of ≥3 equal-type gems in one row or column, in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub gems: Vec<Gem>,
    pub orientation: Orientation,
}

impl MatchGroup {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.gems.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.gems.is_empty()
    }

    pub fn gem_type(&self) -> Option<GemType> {
        self.gems.first().map(|g| g.gem_type)
    }

    pub fn contains(&self, id: GemId) -> bool {
        self.gems.iter().any(|g| g.id == id)
    }
}

/// Pure value copy of the type matrix, detached from gem identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeGrid {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<GemType>,
}

impl TypeGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    /// Build from nested rows. The first row sets the width: shorter rows are
    /// padded with type 0, longer ones truncated.
    pub fn from_rows(rows: &[Vec<GemType>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        let cells = rows
            .iter()
            .flat_map(|r| r.iter().copied().chain(std::iter::repeat(0)).take(cols))
            .collect();
        Self {
            rows: rows.len(),
            cols,
            cells,
        }
    }

    /// Storage length agrees with the dimensions.
    pub fn is_rectangular(&self) -> bool {
        self.cells.len() == self.rows * self.cols
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> GemType {
        self.cells[row * self.cols + col]
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, val: GemType) {
        self.cells[row * self.cols + col] = val;
    }

    #[inline(always)]
    pub fn at(&self, pos: Pos) -> GemType {
        self.get(pos.row, pos.col)
    }

    #[inline(always)]
    pub fn swap(&mut self, a: Pos, b: Pos) {
        self.cells.swap(a.row * self.cols + a.col, b.row * self.cols + b.col);
    }

    #[inline(always)]
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Count of each type, indexed by type.
    pub fn histogram(&self) -> Vec<usize> {
        let max = self.cells.iter().copied().max().map_or(0, |m| m as usize + 1);
        let mut counts = vec![0; max];
        for &t in &self.cells {
            counts[t as usize] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_adjacency() {
        let p = Pos::new(2, 2);
        assert!(p.is_adjacent(Pos::new(1, 2)));
        assert!(p.is_adjacent(Pos::new(2, 3)));
        assert!(!p.is_adjacent(Pos::new(3, 3)));
        assert!(!p.is_adjacent(p));
        assert_eq!(p.manhattan(Pos::new(0, 0)), 4);
    }

    #[test]
    fn test_type_grid_get_set_swap() {
        let mut g = TypeGrid::new(3, 4);
        g.set(1, 3, 2);
        assert_eq!(g.get(1, 3), 2);
        g.swap(Pos::new(1, 3), Pos::new(0, 0));
        assert_eq!(g.get(0, 0), 2);
        assert_eq!(g.get(1, 3), 0);
    }

    #[test]
    fn test_from_rows_squares_ragged_input() {
        let types = TypeGrid::from_rows(&[vec![1, 2, 3], vec![4], vec![5, 6, 7, 8]]);
        assert!(types.is_rectangular());
        assert_eq!((types.rows, types.cols), (3, 3));
        assert_eq!(types.cells, vec![1, 2, 3, 4, 0, 0, 5, 6, 7]);
    }

    #[test]
    fn test_type_grid_from_rows_is_row_major() {
        let g = TypeGrid::from_rows(&[vec![0, 1, 2], vec![3, 0, 1]]);
        assert_eq!((g.rows, g.cols), (2, 3));
        assert_eq!(g.get(1, 0), 3);
        assert_eq!(g.cells, vec![0, 1, 2, 3, 0, 1]);
    }

    #[test]
    fn test_histogram() {
        let g = TypeGrid::from_rows(&[vec![0, 1, 1], vec![3, 1, 0]]);
        assert_eq!(g.histogram(), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_gem_kind_serializes_camel_case() {
        let json = serde_json::to_string(&GemKind::StripeH).unwrap();
        assert_eq!(json, "\"stripeH\"");
        assert!(GemKind::ColorBomb.is_special());
        assert!(!GemKind::Normal.is_special());
    }
}
