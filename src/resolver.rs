//! Clear resolution: destruction sets, promotions and detonation expansion.
//!
//! Nothing here mutates the grid. The board applies a [`ClearPlan`] once the
//! clear visuals have reported in.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::grid::GemGrid;
use crate::shapes::{plan_promotions, Promotion, SwapPair};
use crate::types::{Gem, GemId, GemKind, GemType, MatchGroup, Pos};

/// Insertion-ordered set of gems marked for destruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestructionSet {
    gems: Vec<Gem>,
    ids: HashSet<GemId>,
}

impl DestructionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the gem was already present.
    pub fn insert(&mut self, gem: Gem) -> bool {
        if self.ids.insert(gem.id) {
            self.gems.push(gem);
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, id: GemId) {
        if self.ids.remove(&id) {
            self.gems.retain(|g| g.id != id);
        }
    }

    #[inline]
    pub fn contains(&self, id: GemId) -> bool {
        self.ids.contains(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.gems.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gems.is_empty()
    }

    pub fn gems(&self) -> &[Gem] {
        &self.gems
    }

    pub fn into_gems(self) -> Vec<Gem> {
        self.gems
    }
}

/// Everything one clear pass does to the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearPlan {
    /// Carriers re-skinned in place. A carrier can still appear in
    /// `destroyed` if another detonation in the same pass reached it.
    pub promotions: Vec<Promotion>,
    pub destroyed: Vec<Gem>,
}

impl ClearPlan {
    #[inline]
    pub fn cleared_count(&self) -> usize {
        self.destroyed.len()
    }
}

/// Build the clear plan for one set of match groups.
///
/// Destruction set = union of all members minus every carrier, then expanded
/// by detonations. Promoted kinds are visible to the expansion.
pub fn resolve_groups(grid: &GemGrid, groups: &[MatchGroup], last_swap: SwapPair) -> ClearPlan {
    let mut set = DestructionSet::new();
    for g in groups.iter().flat_map(|grp| grp.gems.iter()) {
        set.insert(*g);
    }

    let mut promotions: Vec<Promotion> = Vec::new();
    let mut overlay: HashMap<GemId, GemKind> = HashMap::new();
    for p in plan_promotions(groups, last_swap) {
        overlay.insert(p.carrier.id, p.kind);
        set.remove(p.carrier.id);
        // Same carrier promoted twice: keep one entry with the later kind.
        match promotions.iter_mut().find(|q| q.carrier.id == p.carrier.id) {
            Some(existing) => *existing = p,
            None => promotions.push(p),
        }
    }

    expand_detonations(grid, &mut set, &overlay);

    ClearPlan {
        promotions,
        destroyed: set.into_gems(),
    }
}

// ─── Detonation expansion ───────────────────────────────────────────────────

/// Breadth-first growth of `set` driven by special kinds.
///
/// Seeds are every gem already in the set; gems added along the way are
/// expanded too. `overlay` supplies kinds that are decided but not yet
/// written to the grid.
pub fn expand_detonations(grid: &GemGrid, set: &mut DestructionSet, overlay: &HashMap<GemId, GemKind>) {
    let mut queue: VecDeque<Gem> = set.gems().iter().copied().collect();

    while let Some(g) = queue.pop_front() {
        let kind = overlay.get(&g.id).copied().unwrap_or(g.kind);
        for pos in detonation_area(grid, g.pos(), kind) {
            if let Some(t) = grid.get(pos) {
                if set.insert(*t) {
                    queue.push_back(*t);
                }
            }
        }
    }
}

/// Cells hit when a gem of `kind` at `at` is cleared.
pub fn detonation_area(grid: &GemGrid, at: Pos, kind: GemKind) -> Vec<Pos> {
    match kind {
        GemKind::StripeH => (0..grid.cols).map(|c| Pos::new(at.row, c)).collect(),
        GemKind::StripeV => (0..grid.rows).map(|r| Pos::new(r, at.col)).collect(),
        GemKind::AreaBomb => {
            let rows = at.row.saturating_sub(1)..=(at.row + 1).min(grid.rows - 1);
            rows.flat_map(|r| {
                let cols = at.col.saturating_sub(1)..=(at.col + 1).min(grid.cols - 1);
                cols.map(move |c| Pos::new(r, c))
            })
            .collect()
        }
        GemKind::Normal | GemKind::ColorBomb => Vec::new(),
    }
}

// ─── Color-bomb activation ──────────────────────────────────────────────────

/// Direct activation triggered by swapping a color bomb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Color bomb with a normal gem: every gem of that gem's type.
    ClearType(GemType),
    /// Two color bombs: the whole board.
    ClearBoard,
}

/// Only a color bomb paired with a normal gem or another color bomb activates.
/// A color bomb paired with a stripe or area bomb falls through to ordinary
/// match detection.
pub fn color_bomb_activation(a: &Gem, b: &Gem) -> Option<Activation> {
    match (a.kind, b.kind) {
        (GemKind::ColorBomb, GemKind::ColorBomb) => Some(Activation::ClearBoard),
        (GemKind::ColorBomb, GemKind::Normal) => Some(Activation::ClearType(b.gem_type)),
        (GemKind::Normal, GemKind::ColorBomb) => Some(Activation::ClearType(a.gem_type)),
        _ => None,
    }
}

/// Destruction plan for an activation: targets plus both swapped gems, expanded.
pub fn resolve_activation(grid: &GemGrid, a: &Gem, b: &Gem, activation: Activation) -> ClearPlan {
    let mut set = DestructionSet::new();
    for g in grid.gems() {
        let hit = match activation {
            Activation::ClearType(t) => g.gem_type == t,
            Activation::ClearBoard => true,
        };
        if hit {
            set.insert(*g);
        }
    }
    set.insert(*a);
    set.insert(*b);

    expand_detonations(grid, &mut set, &HashMap::new());

    ClearPlan {
        promotions: Vec::new(),
        destroyed: set.into_gems(),
    }
}
