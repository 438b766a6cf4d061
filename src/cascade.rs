//! Gravity and refill between cascade passes.
//!
//! Planning and applying are split so the board can hand the plan to the
//! renderer first and only move gems once every drop has been animated.

use crate::grid::GemGrid;
use crate::rng::GemRng;
use crate::types::{Gem, GemId, Pos};

/// A surviving gem sliding down its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub gem: GemId,
    pub from: Pos,
    pub to: Pos,
}

/// A freshly generated gem entering from above the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    /// Already carries its final coordinates.
    pub gem: Gem,
    /// Row the drop animation starts from; negative means above row 0.
    pub spawn_row: isize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GravityPlan {
    pub falls: Vec<Fall>,
    pub spawns: Vec<Spawn>,
}

impl GravityPlan {
    pub fn is_empty(&self) -> bool {
        self.falls.is_empty() && self.spawns.is_empty()
    }
}

/// Compact every column downward and refill the vacated top cells.
///
/// Columns are scanned bottom→top; each survivor goes to the lowest free slot,
/// preserving order. New gems are random-type `Normal` gems numbered from
/// `next_id`.
pub fn plan_gravity(grid: &GemGrid, palette_len: usize, rng: &mut GemRng, next_id: &mut u32) -> GravityPlan {
    let mut plan = GravityPlan::default();

    for c in 0..grid.cols {
        let mut write_row = grid.rows;
        for r in (0..grid.rows).rev() {
            if let Some(g) = grid.get(Pos::new(r, c)) {
                write_row -= 1;
                if r != write_row {
                    plan.falls.push(Fall {
                        gem: g.id,
                        from: Pos::new(r, c),
                        to: Pos::new(write_row, c),
                    });
                }
            }
        }

        // Rows 0..write_row are empty now.
        let empty = write_row;
        for r in 0..empty {
            let gem = Gem::new(GemId(*next_id), Pos::new(r, c), rng.gem_type(palette_len));
            *next_id += 1;
            plan.spawns.push(Spawn {
                gem,
                spawn_row: r as isize - empty as isize,
            });
        }
    }

    plan
}

/// Apply a plan produced by [`plan_gravity`] against the same grid state.
pub fn apply_gravity(grid: &mut GemGrid, plan: &GravityPlan) {
    for fall in &plan.falls {
        let gem = grid.take(fall.from);
        debug_assert_eq!(gem.map(|g| g.id), Some(fall.gem), "gravity plan out of date");
        grid.set(fall.to, gem);
    }
    for spawn in &plan.spawns {
        grid.set(spawn.gem.pos(), Some(spawn.gem));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeGrid;

    fn grid_from(rows: &[Vec<u8>]) -> GemGrid {
        let types = TypeGrid::from_rows(rows);
        let mut grid = GemGrid::new(types.rows, types.cols);
        for r in 0..types.rows {
            for c in 0..types.cols {
                let pos = Pos::new(r, c);
                grid.set(pos, Some(Gem::new(GemId((r * types.cols + c) as u32), pos, types.get(r, c))));
            }
        }
        grid
    }

    #[test]
    fn test_gravity_preserves_column_order() {
        let mut grid = grid_from(&[vec![0, 1, 2], vec![1, 2, 0], vec![2, 0, 1], vec![0, 1, 2]]);
        let top = grid.get(Pos::new(0, 1)).unwrap().id;
        let mid = grid.get(Pos::new(2, 1)).unwrap().id;
        grid.take(Pos::new(1, 1));
        grid.take(Pos::new(3, 1));

        let mut rng = GemRng::from_seed(3);
        let mut next_id = 100;
        let plan = plan_gravity(&grid, 3, &mut rng, &mut next_id);
        assert_eq!(plan.falls.len(), 2);
        assert_eq!(plan.spawns.len(), 2);
        assert_eq!(next_id, 102);

        apply_gravity(&mut grid, &plan);
        assert!(grid.is_full());
        assert!(grid.is_consistent());
        assert_eq!(grid.get(Pos::new(3, 1)).unwrap().id, mid);
        assert_eq!(grid.get(Pos::new(2, 1)).unwrap().id, top);
        assert!(grid.get(Pos::new(0, 1)).unwrap().id.0 >= 100);
    }

    #[test]
    fn test_spawn_rows_start_above_board() {
        let mut grid = grid_from(&[vec![0, 1, 2], vec![1, 2, 0], vec![2, 0, 1]]);
        for r in 0..3 {
            grid.take(Pos::new(r, 0));
        }
        let mut rng = GemRng::from_seed(3);
        let mut next_id = 50;
        let plan = plan_gravity(&grid, 3, &mut rng, &mut next_id);
        assert!(plan.falls.is_empty());
        let rows: Vec<isize> = plan.spawns.iter().map(|s| s.spawn_row).collect();
        assert_eq!(rows, vec![-3, -2, -1]);
        assert!(plan.spawns.iter().all(|s| s.gem.kind == crate::types::GemKind::Normal));
    }

    #[test]
    fn test_full_grid_plans_nothing() {
        let grid = grid_from(&[vec![0, 1, 2], vec![1, 2, 0], vec![2, 0, 1]]);
        let mut rng = GemRng::from_seed(3);
        let mut next_id = 0;
        assert!(plan_gravity(&grid, 3, &mut rng, &mut next_id).is_empty());
    }
}
