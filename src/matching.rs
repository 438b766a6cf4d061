//! Run detection and the "would this swap create a match" test.
//!
//! `find_matches` works on live gems; everything else is a pure function over
//! a [`TypeGrid`] so generation, reshuffle and hints share one definition of a
//! legal move.

use crate::grid::GemGrid;
use crate::types::{Gem, MatchGroup, Orientation, Pos, TypeGrid};

/// Minimum run length that counts as a match.
pub const MIN_RUN: usize = 3;

// ─── Live grid ──────────────────────────────────────────────────────────────

/// Scan every row left→right, then every column top→bottom.
///
/// A run breaks on a type change or an empty cell. Groups are emitted in scan
/// order; a gem at a row/column crossing appears in both groups.
pub fn find_matches(grid: &GemGrid) -> Vec<MatchGroup> {
    let mut groups = Vec::new();

    for r in 0..grid.rows {
        let line = (0..grid.cols).map(|c| grid.get(Pos::new(r, c)));
        collect_runs(line, Orientation::Row, &mut groups);
    }
    for c in 0..grid.cols {
        let line = (0..grid.rows).map(|r| grid.get(Pos::new(r, c)));
        collect_runs(line, Orientation::Col, &mut groups);
    }

    groups
}

fn collect_runs<'a>(
    line: impl Iterator<Item = Option<&'a Gem>>,
    orientation: Orientation,
    out: &mut Vec<MatchGroup>,
) {
    let mut run: Vec<Gem> = Vec::new();
    for cell in line {
        match cell {
            Some(g) if run.last().is_some_and(|p| p.gem_type == g.gem_type) => run.push(*g),
            _ => {
                if run.len() >= MIN_RUN {
                    out.push(MatchGroup { gems: std::mem::take(&mut run), orientation });
                }
                run.clear();
                if let Some(g) = cell {
                    run.push(*g);
                }
            }
        }
    }
    if run.len() >= MIN_RUN {
        out.push(MatchGroup { gems: run, orientation });
    }
}

// ─── Type matrix queries ────────────────────────────────────────────────────

/// True if `pos` is part of a run of ≥3 in its row or column.
pub fn has_match_at(types: &TypeGrid, pos: Pos) -> bool {
    let t = types.at(pos);
    let (r, c) = (pos.row, pos.col);

    let mut count = 1;
    count += (0..c).rev().take_while(|&cc| types.get(r, cc) == t).count();
    count += (c + 1..types.cols).take_while(|&cc| types.get(r, cc) == t).count();
    if count >= MIN_RUN {
        return true;
    }

    let mut count = 1;
    count += (0..r).rev().take_while(|&rr| types.get(rr, c) == t).count();
    count += (r + 1..types.rows).take_while(|&rr| types.get(rr, c) == t).count();
    count >= MIN_RUN
}

/// Swap two cells in the scratch matrix, test both, restore.
pub fn would_swap_create_match(types: &mut TypeGrid, a: Pos, b: Pos) -> bool {
    types.swap(a, b);
    let ok = has_match_at(types, a) || has_match_at(types, b);
    types.swap(a, b);
    ok
}

/// First legal move in row-major order, testing the right then the down
/// neighbor of each cell. Equal-type pairs are skipped.
pub fn first_possible_move(types: &TypeGrid) -> Option<(Pos, Pos)> {
    const DIRS: [(usize, usize); 2] = [(0, 1), (1, 0)];
    let mut scratch = types.clone();

    for r in 0..types.rows {
        for c in 0..types.cols {
            for (dr, dc) in DIRS {
                let (r2, c2) = (r + dr, c + dc);
                if !types.in_bounds(r2, c2) {
                    continue;
                }
                if types.get(r, c) == types.get(r2, c2) {
                    continue;
                }
                let (a, b) = (Pos::new(r, c), Pos::new(r2, c2));
                if would_swap_create_match(&mut scratch, a, b) {
                    return Some((a, b));
                }
            }
        }
    }
    None
}

/// At least one adjacent swap produces a run.
#[inline]
pub fn has_any_possible_move(types: &TypeGrid) -> bool {
    first_possible_move(types).is_some()
}

/// The matrix already contains a run of ≥3 somewhere.
pub fn has_any_matches(types: &TypeGrid) -> bool {
    let row_run = (0..types.rows).any(|r| longest_run((0..types.cols).map(|c| types.get(r, c))) >= MIN_RUN);
    row_run || (0..types.cols).any(|c| longest_run((0..types.rows).map(|r| types.get(r, c))) >= MIN_RUN)
}

fn longest_run(line: impl Iterator<Item = u8>) -> usize {
    let mut best = 0;
    let mut run = 0;
    let mut prev = None;
    for t in line {
        run = if prev == Some(t) { run + 1 } else { 1 };
        prev = Some(t);
        best = best.max(run);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GemId;

    fn grid_from(rows: &[Vec<u8>]) -> GemGrid {
        let types = TypeGrid::from_rows(rows);
        let mut grid = GemGrid::new(types.rows, types.cols);
        for r in 0..types.rows {
            for c in 0..types.cols {
                let pos = Pos::new(r, c);
                let id = GemId((r * types.cols + c) as u32);
                grid.set(pos, Some(Gem::new(id, pos, types.get(r, c))));
            }
        }
        grid
    }

    #[test]
    fn test_find_matches_row_and_column() {
        let grid = grid_from(&[
            vec![0, 0, 0, 1],
            vec![2, 1, 3, 1],
            vec![2, 3, 2, 1],
            vec![2, 0, 3, 0],
        ]);
        let groups = find_matches(&grid);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].orientation, Orientation::Row);
        assert_eq!(groups[0].gems.iter().map(|g| g.col).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(groups[1].orientation, Orientation::Col);
        assert_eq!(groups[1].gems[0].pos(), Pos::new(1, 0));
        assert_eq!(groups[2].gems.iter().map(|g| g.row).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_find_matches_run_at_line_end_and_long_run() {
        let grid = grid_from(&[
            vec![1, 2, 2, 2, 2],
            vec![0, 1, 0, 1, 0],
            vec![1, 0, 1, 0, 1],
        ]);
        let groups = find_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 4);
        assert_eq!(groups[0].gem_type(), Some(2));
    }

    #[test]
    fn test_empty_cell_breaks_run() {
        let mut grid = grid_from(&[
            vec![1, 1, 0, 1, 1],
            vec![0, 2, 1, 2, 0],
            vec![2, 0, 2, 0, 2],
        ]);
        // Row 0 reads 1 1 _ 1 1 once the middle gem is gone.
        grid.take(Pos::new(0, 2));
        assert!(find_matches(&grid).is_empty());
    }

    #[test]
    fn test_has_match_at() {
        let types = TypeGrid::from_rows(&[vec![0, 1, 1, 1], vec![0, 2, 3, 2], vec![0, 3, 2, 3]]);
        assert!(has_match_at(&types, Pos::new(0, 2)));
        assert!(has_match_at(&types, Pos::new(2, 0)));
        assert!(!has_match_at(&types, Pos::new(1, 2)));
    }

    #[test]
    fn test_would_swap_create_match_restores_scratch() {
        let mut types = TypeGrid::from_rows(&[vec![0, 1, 0], vec![1, 0, 2], vec![2, 1, 2]]);
        let before = types.clone();
        // Swapping (0,1)<->(1,1) puts three 0s across row 0.
        assert!(would_swap_create_match(&mut types, Pos::new(0, 1), Pos::new(1, 1)));
        assert_eq!(types, before);
        assert!(!would_swap_create_match(&mut types, Pos::new(2, 0), Pos::new(2, 1)));
        assert_eq!(types, before);
    }

    #[test]
    fn test_first_possible_move_row_major() {
        let types = TypeGrid::from_rows(&[vec![0, 1, 0], vec![1, 0, 2], vec![2, 1, 2]]);
        assert_eq!(first_possible_move(&types), Some((Pos::new(0, 1), Pos::new(1, 1))));
    }

    #[test]
    fn test_deadlocked_board_has_no_move() {
        // Checkerboard of four types in 2×2 blocks never lines up three.
        let types = TypeGrid::from_rows(&[
            vec![0, 1, 2, 3],
            vec![2, 3, 0, 1],
            vec![0, 1, 2, 3],
            vec![2, 3, 0, 1],
        ]);
        assert!(!has_any_matches(&types));
        assert!(!has_any_possible_move(&types));
    }

    #[test]
    fn test_has_any_matches() {
        let types = TypeGrid::from_rows(&[vec![0, 1, 2], vec![0, 2, 1], vec![0, 1, 2]]);
        assert!(has_any_matches(&types));
        let types = TypeGrid::from_rows(&[vec![0, 1, 2], vec![1, 2, 0], vec![2, 0, 1]]);
        assert!(!has_any_matches(&types));
    }
}
