//! Initial layout generation: a random type matrix with no runs and at least
//! one legal move.
//!
//! The key function is `generate_start_types()` which runs the whole retry
//! loop and always returns a board, falling back to the last candidate when
//! no playable one turns up.

use crate::rng::GemRng;
use crate::types::{GemType, TypeGrid};

/// Full-board candidates tried before giving up on playability.
pub const MAX_BOARD_ATTEMPTS: u32 = 50;

/// Random draws per cell before the last draw is accepted as is.
pub const MAX_TYPE_DRAWS: u32 = 100;

/// True if placing `t` at `(r, c)` completes a run of 3 with the two already
/// placed predecessors to the left or above.
pub fn causes_immediate_match(types: &TypeGrid, r: usize, c: usize, t: GemType) -> bool {
    if c >= 2 && types.get(r, c - 1) == t && types.get(r, c - 2) == t {
        return true;
    }
    r >= 2 && types.get(r - 1, c) == t && types.get(r - 2, c) == t
}

/// Fill one candidate matrix row-major, rejecting draws that complete a run.
pub fn fill_candidate(rows: usize, cols: usize, palette_len: usize, rng: &mut GemRng) -> TypeGrid {
    let mut types = TypeGrid::new(rows, cols);

    for r in 0..rows {
        for c in 0..cols {
            let mut t = rng.gem_type(palette_len);
            let mut draws = 1;
            while draws < MAX_TYPE_DRAWS && causes_immediate_match(&types, r, c, t) {
                t = rng.gem_type(palette_len);
                draws += 1;
            }
            types.set(r, c, t);
        }
    }

    types
}

/// Result of a layout generation run.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub types: TypeGrid,
    /// How many candidates were filled before one was accepted.
    pub attempts: u32,
    /// False when every candidate failed the playability check and the last
    /// one was returned anyway.
    pub success: bool,
}

/// Generate start types by repeatedly filling candidates and checking them.
///
/// The `is_playable_fn` parameter injects the legal-move test (the board
/// passes `matching::has_any_possible_move`), keeping generation decoupled
/// from detection.
pub fn generate_start_types<F>(
    rows: usize,
    cols: usize,
    palette_len: usize,
    max_attempts: u32,
    rng: &mut GemRng,
    is_playable_fn: F,
) -> LayoutResult
where
    F: Fn(&TypeGrid) -> bool,
{
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        let types = fill_candidate(rows, cols, palette_len, rng);

        if is_playable_fn(&types) {
            return LayoutResult {
                types,
                attempts,
                success: true,
            };
        }

        if attempts >= max_attempts.max(1) {
            log::warn!("no playable {rows}x{cols} layout after {attempts} attempts, keeping last candidate");
            return LayoutResult {
                types,
                attempts,
                success: false,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{has_any_matches, has_any_possible_move};

    #[test]
    fn test_causes_immediate_match() {
        let mut types = TypeGrid::new(3, 3);
        types.set(0, 0, 2);
        types.set(0, 1, 2);
        assert!(causes_immediate_match(&types, 0, 2, 2));
        assert!(!causes_immediate_match(&types, 0, 2, 1));

        types.set(1, 2, 1);
        types.set(0, 2, 1);
        assert!(causes_immediate_match(&types, 2, 2, 1));
    }

    #[test]
    fn test_candidates_have_no_runs() {
        let mut rng = GemRng::from_seed(42);
        for _ in 0..200 {
            let types = fill_candidate(8, 8, 4, &mut rng);
            assert!(!has_any_matches(&types));
        }
    }

    #[test]
    fn test_generated_boards_are_playable() {
        let mut rng = GemRng::from_seed(9);
        for size in 3..=9 {
            let result = generate_start_types(size, size, 4, MAX_BOARD_ATTEMPTS, &mut rng, has_any_possible_move);
            assert!(!has_any_matches(&result.types));
            if result.success {
                assert!(has_any_possible_move(&result.types));
            }
        }
    }

    #[test]
    fn test_generate_always_playable_predicate() {
        let mut rng = GemRng::from_seed(1);
        let result = generate_start_types(6, 6, 4, 50, &mut rng, |_| true);
        assert!(result.success);
        assert_eq!(result.attempts, 1);
        assert_eq!((result.types.rows, result.types.cols), (6, 6));
    }

    #[test]
    fn test_generate_never_playable_falls_back() {
        let mut rng = GemRng::from_seed(1);
        let result = generate_start_types(5, 5, 3, 10, &mut rng, |_| false);
        assert!(!result.success);
        assert_eq!(result.attempts, 10);
        assert_eq!(result.types.cells.len(), 25);
    }

    #[test]
    fn test_types_stay_in_palette() {
        let mut rng = GemRng::from_seed(5);
        let types = fill_candidate(7, 5, 3, &mut rng);
        assert!(types.cells.iter().all(|&t| t < 3));
    }
}
