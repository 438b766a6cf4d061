//! Outward traffic: notifications for the host and visual commands for the
//! rendering collaborator.

use serde::Serialize;

use crate::types::{Gem, GemId, GemKind, GemType, Pos};

/// Best-effort sound cue. Hosts silently skip cues they have no asset for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SoundCue {
    Click,
    Swap,
    Match,
    /// A clear of four or more gems.
    Special,
}

/// Notification emitted by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum BoardEvent {
    /// A swap produced a match or a color-bomb activation.
    ValidMove,
    GemsCleared { count: usize, depth: u32 },
    /// The board is idle again.
    CascadeComplete,
    /// Any active hint is gone; stop pulsing it.
    HintCleared,
    Reshuffled { permuted: bool },
    Sound { cue: SoundCue },
}

/// How a cleared gem leaves the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClearStyle {
    /// Shrink and fade after a match.
    Match,
    /// Collapse after a color-bomb activation.
    Activation,
}

/// One animation the renderer must run and then report back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum VisualOp {
    Move { gem: GemId, to: Pos },
    Clear { gem: GemId, style: ClearStyle },
    #[serde(rename_all = "camelCase")]
    DropIn { gem: Gem, spawn_row: isize },
    Promote { gem: GemId, kind: GemKind },
    #[serde(rename_all = "camelCase")]
    Retype { gem: GemId, gem_type: GemType },
}

/// A visual op tagged with the ticket the host passes to `complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisualCommand {
    pub ticket: u32,
    #[serde(flatten)]
    pub op: VisualOp,
}
