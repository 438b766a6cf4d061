//! Tap selection state machine and input rejection reasons.

use thiserror::Error;

use crate::types::{Gem, GemId};

/// Why a tap or swap request was refused. The grid is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("board is busy resolving a move")]
    Busy,
    #[error("board input is locked")]
    Locked,
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },
    #[error("cell ({row}, {col}) holds no gem")]
    EmptyCell { row: usize, col: usize },
    #[error("cells ({0}, {1}) and ({2}, {3}) are not adjacent")]
    NotAdjacent(usize, usize, usize, usize),
}

/// What a tap did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// First tap: `gem` is now highlighted.
    Selected(GemId),
    /// Tapped the selected gem again.
    Deselected(GemId),
    /// Tapped a non-neighbor: the highlight moves.
    Reselected { previous: GemId, current: GemId },
    /// Tapped a neighbor of the selection. Selection is cleared.
    SwapRequested(GemId, GemId),
}

/// At most one selected gem per board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<Gem>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<GemId> {
        self.selected.map(|g| g.id)
    }

    pub fn clear(&mut self) -> Option<GemId> {
        self.selected.take().map(|g| g.id)
    }

    /// Advance the state machine with a tap on `gem` (taken from the live grid).
    pub fn tap(&mut self, gem: Gem) -> TapOutcome {
        match self.selected {
            Some(sel) if sel.id == gem.id => {
                self.selected = None;
                TapOutcome::Deselected(gem.id)
            }
            None => {
                self.selected = Some(gem);
                TapOutcome::Selected(gem.id)
            }
            Some(sel) if sel.pos().is_adjacent(gem.pos()) => {
                self.selected = None;
                TapOutcome::SwapRequested(sel.id, gem.id)
            }
            Some(sel) => {
                self.selected = Some(gem);
                TapOutcome::Reselected {
                    previous: sel.id,
                    current: gem.id,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pos;

    fn gem(id: u32, row: usize, col: usize) -> Gem {
        Gem::new(GemId(id), Pos::new(row, col), 0)
    }

    #[test]
    fn test_select_then_deselect() {
        let mut sel = Selection::new();
        assert_eq!(sel.tap(gem(1, 0, 0)), TapOutcome::Selected(GemId(1)));
        assert_eq!(sel.tap(gem(1, 0, 0)), TapOutcome::Deselected(GemId(1)));
        assert_eq!(sel.selected(), None);
    }

    #[test]
    fn test_neighbor_requests_swap() {
        let mut sel = Selection::new();
        sel.tap(gem(1, 2, 2));
        assert_eq!(sel.tap(gem(2, 2, 3)), TapOutcome::SwapRequested(GemId(1), GemId(2)));
        assert_eq!(sel.selected(), None);
    }

    #[test]
    fn test_non_neighbor_moves_selection() {
        let mut sel = Selection::new();
        sel.tap(gem(1, 0, 0));
        assert_eq!(
            sel.tap(gem(5, 1, 1)),
            TapOutcome::Reselected {
                previous: GemId(1),
                current: GemId(5)
            }
        );
        assert_eq!(sel.selected(), Some(GemId(5)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(InputError::Busy.to_string(), "board is busy resolving a move");
        assert_eq!(
            InputError::NotAdjacent(0, 0, 2, 2).to_string(),
            "cells (0, 0) and (2, 2) are not adjacent"
        );
    }
}
