//! Deadlock recovery: permute the current type multiset into a playable board.

use crate::layout::{generate_start_types, MAX_BOARD_ATTEMPTS};
use crate::matching::{has_any_matches, has_any_possible_move};
use crate::rng::GemRng;
use crate::types::TypeGrid;

/// Permutations tried before falling back to fresh generation.
pub const MAX_RESHUFFLE_ATTEMPTS: u32 = 80;

#[derive(Debug, Clone)]
pub struct ReshuffleResult {
    pub types: TypeGrid,
    pub attempts: u32,
    /// True when `types` is a permutation of the input multiset. False when
    /// the layout generator had to draw a new board.
    pub permuted: bool,
}

/// Shuffle the pool of current types until the layout has no runs and at
/// least one legal move. After `MAX_RESHUFFLE_ATTEMPTS` failures a new
/// layout is generated instead, which may change the type counts.
pub fn reshuffle_types(current: &TypeGrid, palette_len: usize, rng: &mut GemRng) -> ReshuffleResult {
    let mut pool = current.cells.clone();

    for attempt in 1..=MAX_RESHUFFLE_ATTEMPTS {
        rng.shuffle(&mut pool);
        let candidate = TypeGrid {
            rows: current.rows,
            cols: current.cols,
            cells: pool.clone(),
        };
        if !has_any_matches(&candidate) && has_any_possible_move(&candidate) {
            log::info!("reshuffled {}x{} board after {attempt} permutation(s)", current.rows, current.cols);
            return ReshuffleResult {
                types: candidate,
                attempts: attempt,
                permuted: true,
            };
        }
    }

    log::info!("no playable permutation in {MAX_RESHUFFLE_ATTEMPTS} attempts, regenerating layout");
    let layout = generate_start_types(
        current.rows,
        current.cols,
        palette_len,
        MAX_BOARD_ATTEMPTS,
        rng,
        has_any_possible_move,
    );
    ReshuffleResult {
        types: layout.types,
        attempts: MAX_RESHUFFLE_ATTEMPTS,
        permuted: false,
    }
}
