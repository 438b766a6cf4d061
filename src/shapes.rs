//! Special shape classification: which match groups promote a gem, to what
//! kind, and which gem carries the promotion.

use std::collections::HashSet;

use crate::types::{Gem, GemId, GemKind, GemType, MatchGroup, Orientation, Pos};

/// Shape that produced a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Run of four or more.
    Stripe,
    /// Two 3-runs meeting at an endpoint of both.
    Corner,
    /// Two 3-runs meeting in the middle of at least one.
    TShape,
    /// Straight run of exactly five.
    LineFive,
}

impl Shape {
    pub fn promoted_kind(self, orientation: Orientation) -> GemKind {
        match (self, orientation) {
            (Shape::Stripe, Orientation::Row) => GemKind::StripeH,
            (Shape::Stripe, Orientation::Col) => GemKind::StripeV,
            (Shape::Corner | Shape::TShape, _) => GemKind::AreaBomb,
            (Shape::LineFive, _) => GemKind::ColorBomb,
        }
    }
}

/// A detected 5-gem crossing of a row 3-run and a column 3-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    /// `[row arm.., pivot, column arm..]`, so the midpoint is the pivot.
    pub members: Vec<Gem>,
    pub pivot: Gem,
}

/// One gem that survives the pass re-skinned to `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub carrier: Gem,
    pub kind: GemKind,
    pub shape: Shape,
}

/// The two most recently swapped gems, in swap order.
pub type SwapPair = Option<(GemId, GemId)>;

/// Prefer a swapped gem that belongs to `members`, else the structural midpoint.
pub fn pick_carrier(members: &[Gem], last_swap: SwapPair) -> Gem {
    if let Some((a, b)) = last_swap {
        for id in [a, b] {
            if let Some(g) = members.iter().find(|g| g.id == id) {
                return *g;
            }
        }
    }
    members[members.len() / 2]
}

// ─── Crossing detectors ─────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
enum CrossingKind {
    Corner,
    TShape,
}

fn detect_crossings(groups: &[MatchGroup], want: CrossingKind) -> Vec<Crossing> {
    let rows = groups.iter().filter(|g| g.orientation == Orientation::Row && g.len() == 3);
    let cols: Vec<&MatchGroup> = groups
        .iter()
        .filter(|g| g.orientation == Orientation::Col && g.len() == 3)
        .collect();

    let mut out = Vec::new();
    let mut seen: HashSet<(Pos, GemType)> = HashSet::new();

    for rg in rows {
        let Some(gem_type) = rg.gem_type() else { continue };
        let mut r_sorted = rg.gems.clone();
        r_sorted.sort_by_key(|g| g.col);

        for cg in cols.iter().filter(|cg| cg.gem_type() == Some(gem_type)) {
            let mut c_sorted = cg.gems.clone();
            c_sorted.sort_by_key(|g| g.row);

            let Some(inter) = r_sorted.iter().find(|g| cg.contains(g.id)).copied() else {
                continue;
            };

            let matches_kind = match want {
                CrossingKind::Corner => is_endpoint(&r_sorted, inter) && is_endpoint(&c_sorted, inter),
                CrossingKind::TShape => r_sorted[1].id == inter.id || c_sorted[1].id == inter.id,
            };
            if !matches_kind {
                continue;
            }

            let members: Vec<Gem> = r_sorted
                .iter()
                .filter(|g| g.id != inter.id)
                .chain(std::iter::once(&inter))
                .chain(c_sorted.iter().filter(|g| g.id != inter.id))
                .copied()
                .collect();
            if members.len() == 5 && seen.insert((inter.pos(), gem_type)) {
                out.push(Crossing { members, pivot: inter });
            }
        }
    }
    out
}

fn is_endpoint(sorted: &[Gem], gem: Gem) -> bool {
    sorted.first().is_some_and(|g| g.id == gem.id) || sorted.last().is_some_and(|g| g.id == gem.id)
}

/// L-shapes: the shared gem is an endpoint of both 3-runs.
pub fn detect_corner_five(groups: &[MatchGroup]) -> Vec<Crossing> {
    detect_crossings(groups, CrossingKind::Corner)
}

/// T-shapes (and plus-shapes): the shared gem is the middle of at least one 3-run.
pub fn detect_t_shape_five(groups: &[MatchGroup]) -> Vec<Crossing> {
    detect_crossings(groups, CrossingKind::TShape)
}

/// Groups of exactly five in a line.
pub fn detect_line_five(groups: &[MatchGroup]) -> Vec<&MatchGroup> {
    groups.iter().filter(|g| g.len() == 5).collect()
}

// ─── Promotion planning ─────────────────────────────────────────────────────

/// Plan every promotion for one pass, in application order: stripes, corners,
/// T-shapes, then line-fives. A carrier chosen twice ends up with the later kind.
pub fn plan_promotions(groups: &[MatchGroup], last_swap: SwapPair) -> Vec<Promotion> {
    let mut out = Vec::new();

    for grp in groups.iter().filter(|g| g.len() >= 4) {
        out.push(Promotion {
            carrier: pick_carrier(&grp.gems, last_swap),
            kind: Shape::Stripe.promoted_kind(grp.orientation),
            shape: Shape::Stripe,
        });
    }

    for (shape, crossings) in [
        (Shape::Corner, detect_corner_five(groups)),
        (Shape::TShape, detect_t_shape_five(groups)),
    ] {
        for item in crossings {
            out.push(Promotion {
                carrier: pick_carrier(&item.members, last_swap),
                kind: GemKind::AreaBomb,
                shape,
            });
        }
    }

    for grp in detect_line_five(groups) {
        out.push(Promotion {
            carrier: pick_carrier(&grp.gems, last_swap),
            kind: GemKind::ColorBomb,
            shape: Shape::LineFive,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gem(id: u32, row: usize, col: usize, t: GemType) -> Gem {
        Gem::new(GemId(id), Pos::new(row, col), t)
    }

    fn row_group(row: usize, cols: std::ops::Range<usize>, t: GemType, base: u32) -> MatchGroup {
        MatchGroup {
            gems: cols.map(|c| gem(base + (row * 10 + c) as u32, row, c, t)).collect(),
            orientation: Orientation::Row,
        }
    }

    fn col_group(col: usize, rows: std::ops::Range<usize>, t: GemType, base: u32) -> MatchGroup {
        MatchGroup {
            gems: rows.map(|r| gem(base + (r * 10 + col) as u32, r, col, t)).collect(),
            orientation: Orientation::Col,
        }
    }

    #[test]
    fn test_pick_carrier_prefers_swapped() {
        let grp = row_group(0, 0..4, 1, 0);
        let swapped = grp.gems[3].id;
        assert_eq!(pick_carrier(&grp.gems, Some((GemId(99), swapped))).id, swapped);
        assert_eq!(pick_carrier(&grp.gems, Some((GemId(98), GemId(99)))).id, grp.gems[2].id);
        assert_eq!(pick_carrier(&grp.gems, None).id, grp.gems[2].id);
    }

    #[test]
    fn test_four_run_promotes_stripe_by_orientation() {
        let promos = plan_promotions(&[row_group(2, 1..5, 0, 0)], None);
        assert_eq!(promos.len(), 1);
        assert_eq!(promos[0].kind, GemKind::StripeH);

        let promos = plan_promotions(&[col_group(3, 0..4, 0, 0)], None);
        assert_eq!(promos[0].kind, GemKind::StripeV);
        assert_eq!(promos[0].carrier.pos(), Pos::new(2, 3));
    }

    #[test]
    fn test_corner_five_at_shared_endpoint() {
        // Row (0,0..3) and column (0..3,0) share the top-left gem.
        let rg = row_group(0, 0..3, 2, 0);
        let cg = col_group(0, 0..3, 2, 0);
        let groups = [rg, cg];
        let corners = detect_corner_five(&groups);
        assert_eq!(corners.len(), 1);
        assert_eq!(corners[0].pivot.pos(), Pos::new(0, 0));
        assert!(detect_t_shape_five(&groups).is_empty());

        let promos = plan_promotions(&groups, None);
        assert_eq!(promos.len(), 1);
        assert_eq!(promos[0].kind, GemKind::AreaBomb);
        assert_eq!(promos[0].shape, Shape::Corner);
        assert_eq!(promos[0].carrier.pos(), Pos::new(0, 0));
    }

    #[test]
    fn test_t_shape_five() {
        // Row (2,0..3) with column (0..3,1) crossing at the row middle / column end.
        let groups = [row_group(2, 0..3, 1, 0), col_group(1, 0..3, 1, 0)];
        assert!(detect_corner_five(&groups).is_empty());
        let ts = detect_t_shape_five(&groups);
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].pivot.pos(), Pos::new(2, 1));
        assert_eq!(ts[0].members.len(), 5);

        let promos = plan_promotions(&groups, None);
        assert_eq!(promos[0].shape, Shape::TShape);
        assert_eq!(promos[0].carrier.pos(), Pos::new(2, 1));
    }

    #[test]
    fn test_crossing_requires_equal_types() {
        let groups = [row_group(0, 0..3, 1, 0), col_group(0, 0..3, 2, 0)];
        assert!(detect_corner_five(&groups).is_empty());
        assert!(plan_promotions(&groups, None).is_empty());
    }

    #[test]
    fn test_line_five_becomes_color_bomb() {
        let grp = row_group(1, 0..5, 3, 0);
        let middle = grp.gems[2];
        let promos = plan_promotions(&[grp], None);
        // Stripe first, then the same carrier is re-promoted to a color bomb.
        assert_eq!(promos.len(), 2);
        assert_eq!(promos[0].carrier.id, middle.id);
        assert_eq!(promos[1].carrier.id, middle.id);
        assert_eq!(promos[1].kind, GemKind::ColorBomb);
    }

    #[test]
    fn test_three_run_promotes_nothing() {
        assert!(plan_promotions(&[row_group(0, 0..3, 0, 0)], None).is_empty());
    }
}
