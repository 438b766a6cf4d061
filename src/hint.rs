//! Hint discovery over a read-only type snapshot.

use crate::matching::first_possible_move;
use crate::types::{Pos, TypeGrid};

/// First adjacent pair (row-major, right then down) whose swap makes a run.
#[inline]
pub fn find_hint_pair(types: &TypeGrid) -> Option<(Pos, Pos)> {
    first_possible_move(types)
}
