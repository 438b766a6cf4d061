//! The board: grid, session state and the cascade state machine.
//!
//! Every phase hands its animations to the renderer as [`VisualCommand`]s and
//! waits until each ticket has been reported through [`Board::complete`]. Only
//! then is the phase's grid mutation applied and the next phase started:
//!
//! ```text
//! Idle → Swapping → Resolving → Settling ─┬→ Resolving (next pass)
//!          │                              └→ Reshuffling? → Idle
//!          └→ (no match) revert → Idle
//! ```

use std::collections::HashSet;

use serde::Serialize;

use crate::cascade::{apply_gravity, plan_gravity, GravityPlan};
use crate::config::{BoardConfig, Settings, MAX_DIMENSION, MIN_DIMENSION};
use crate::events::{BoardEvent, ClearStyle, SoundCue, VisualCommand, VisualOp};
use crate::grid::GemGrid;
use crate::hint::find_hint_pair;
use crate::input::{InputError, Selection, TapOutcome};
use crate::layout::{generate_start_types, MAX_BOARD_ATTEMPTS};
use crate::matching::{find_matches, has_any_possible_move};
use crate::reshuffle::reshuffle_types;
use crate::resolver::{color_bomb_activation, resolve_activation, resolve_groups, ClearPlan};
use crate::rng::GemRng;
use crate::shapes::SwapPair;
use crate::types::{Gem, GemId, MatchGroup, Pos, TypeGrid};

/// Clears at or above this size use the `Special` sound cue.
const SPECIAL_CLEAR_SIZE: usize = 4;

/// Externally observable cascade state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CascadeState {
    Idle,
    Swapping,
    Resolving,
    Settling,
    Reshuffling,
}

/// Internal phase, carrying whatever the phase applies once its visuals finish.
#[derive(Debug, Clone, Default)]
enum Phase {
    #[default]
    Idle,
    Swapping { a: GemId, b: GemId },
    Reverting { a: GemId, b: GemId },
    Clearing(ClearPlan),
    Settling(GravityPlan),
    Reshuffling(TypeGrid),
}

/// Per-board mutable session fields.
#[derive(Debug, Clone, Default)]
struct Session {
    busy: bool,
    locked: bool,
    selection: Selection,
    last_swap: SwapPair,
    hint: Option<(GemId, GemId)>,
    cascade_depth: u32,
}

pub struct Board {
    settings: Settings,
    grid: GemGrid,
    rng: GemRng,
    next_id: u32,
    next_ticket: u32,
    session: Session,
    phase: Phase,
    /// Tickets the current phase is still waiting on.
    fan_in: HashSet<u32>,
    commands: Vec<VisualCommand>,
    events: Vec<BoardEvent>,
}

impl Board {
    /// Board with coerced settings and an empty grid. Call [`Board::create`] to fill it.
    pub fn new(config: &BoardConfig) -> Self {
        Self::with_settings(config.resolve())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let rng = GemRng::from_optional_seed(settings.seed);
        Self {
            grid: GemGrid::new(settings.rows, settings.cols),
            settings,
            rng,
            next_id: 0,
            next_ticket: 0,
            session: Session::default(),
            phase: Phase::Idle,
            fan_in: HashSet::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Board filled from a known type matrix. Dimensions come from `types`.
    ///
    /// A matrix that is not rectangular or falls outside the dimension bounds
    /// is replaced by a generated layout of `settings` size.
    pub fn with_types(types: &TypeGrid, mut settings: Settings) -> Self {
        let usable = types.is_rectangular()
            && (MIN_DIMENSION..=MAX_DIMENSION).contains(&types.rows)
            && (MIN_DIMENSION..=MAX_DIMENSION).contains(&types.cols);
        if !usable {
            log::warn!(
                "unusable {}x{} type matrix, generating a {}x{} layout",
                types.rows,
                types.cols,
                settings.rows,
                settings.cols
            );
            let mut board = Self::with_settings(settings);
            board.create();
            return board;
        }
        settings.rows = types.rows;
        settings.cols = types.cols;
        let mut board = Self::with_settings(settings);
        board.populate(types);
        board
    }

    /// Generate a fresh playable layout and reset the session.
    pub fn create(&mut self) {
        let (rows, cols, palette) = (self.settings.rows, self.settings.cols, self.settings.palette_len());
        let layout = generate_start_types(rows, cols, palette, MAX_BOARD_ATTEMPTS, &mut self.rng, has_any_possible_move);
        log::debug!("created {rows}x{cols} board in {} attempt(s)", layout.attempts);
        self.populate(&layout.types);
    }

    fn populate(&mut self, types: &TypeGrid) {
        self.grid = GemGrid::new(types.rows, types.cols);
        for r in 0..types.rows {
            for c in 0..types.cols {
                let gem = self.spawn_gem(Pos::new(r, c), types.get(r, c));
                self.grid.set(gem.pos(), Some(gem));
            }
        }
        self.session = Session::default();
        self.phase = Phase::Idle;
        self.fan_in.clear();
        self.commands.clear();
    }

    fn spawn_gem(&mut self, pos: Pos, gem_type: u8) -> Gem {
        let gem = Gem::new(GemId(self.next_id), pos, gem_type);
        self.next_id += 1;
        gem
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn gem_keys(&self) -> &[String] {
        &self.settings.gem_keys
    }

    pub fn grid(&self) -> &GemGrid {
        &self.grid
    }

    /// Row-major copy of every gem on the board.
    pub fn gems(&self) -> Vec<Gem> {
        self.grid.gems().copied().collect()
    }

    pub fn snapshot_types(&self) -> Option<TypeGrid> {
        self.grid.snapshot_types()
    }

    pub fn is_busy(&self) -> bool {
        self.session.busy
    }

    pub fn is_locked(&self) -> bool {
        self.session.locked
    }

    pub fn selected(&self) -> Option<GemId> {
        self.session.selection.selected()
    }

    /// Passes of the current (or last) cascade. Feedback only.
    pub fn cascade_depth(&self) -> u32 {
        self.session.cascade_depth
    }

    pub fn state(&self) -> CascadeState {
        match self.phase {
            Phase::Idle => CascadeState::Idle,
            Phase::Swapping { .. } | Phase::Reverting { .. } => CascadeState::Swapping,
            Phase::Clearing(_) => CascadeState::Resolving,
            Phase::Settling(_) => CascadeState::Settling,
            Phase::Reshuffling(_) => CascadeState::Reshuffling,
        }
    }

    // ─── Host interface ─────────────────────────────────────────────────────

    pub fn lock(&mut self) {
        self.session.locked = true;
    }

    pub fn unlock(&mut self) {
        self.session.locked = false;
    }

    /// Drain visual commands issued since the last call.
    pub fn take_commands(&mut self) -> Vec<VisualCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Drain notifications emitted since the last call.
    pub fn take_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    /// Report one finished animation. Returns false for unknown or repeated tickets.
    pub fn complete(&mut self, ticket: u32) -> bool {
        if !self.fan_in.remove(&ticket) {
            log::warn!("ignoring completion for unknown ticket {ticket}");
            return false;
        }
        if self.fan_in.is_empty() {
            self.pump();
        }
        true
    }

    /// Complete every outstanding animation until the board is idle.
    /// For hosts that do not animate.
    pub fn settle(&mut self) {
        while !self.fan_in.is_empty() {
            let mut tickets: Vec<u32> = self.fan_in.iter().copied().collect();
            tickets.sort_unstable();
            for ticket in tickets {
                self.complete(ticket);
            }
        }
        self.commands.clear();
    }

    fn check_input(&self) -> Result<(), InputError> {
        if self.session.busy {
            return Err(InputError::Busy);
        }
        if self.session.locked {
            return Err(InputError::Locked);
        }
        Ok(())
    }

    fn gem_at(&self, pos: Pos) -> Result<Gem, InputError> {
        if !self.grid.in_bounds(pos) {
            return Err(InputError::OutOfBounds { row: pos.row, col: pos.col });
        }
        self.grid.get(pos).copied().ok_or(InputError::EmptyCell { row: pos.row, col: pos.col })
    }

    /// Player tap on a cell. A second tap on a neighbor starts a swap.
    pub fn tap(&mut self, row: usize, col: usize) -> Result<TapOutcome, InputError> {
        self.check_input()?;
        let gem = self.gem_at(Pos::new(row, col))?;

        self.clear_hint();
        let outcome = self.session.selection.tap(gem);
        match outcome {
            TapOutcome::Selected(_) | TapOutcome::Reselected { .. } => self.sound(SoundCue::Click),
            TapOutcome::SwapRequested(a, b) => self.begin_swap(a, b),
            TapOutcome::Deselected(_) => {}
        }
        Ok(outcome)
    }

    /// Direct swap request (drag input). Rejected requests leave the grid untouched.
    pub fn request_swap(&mut self, a: Pos, b: Pos) -> Result<(), InputError> {
        self.check_input()?;
        let ga = self.gem_at(a)?;
        let gb = self.gem_at(b)?;
        if !a.is_adjacent(b) {
            return Err(InputError::NotAdjacent(a.row, a.col, b.row, b.col));
        }
        self.session.selection.clear();
        self.begin_swap(ga.id, gb.id);
        Ok(())
    }

    // ─── Hints ──────────────────────────────────────────────────────────────

    /// Pure query: first swap that would make a match. None while busy.
    pub fn find_hint_pair(&self) -> Option<(Gem, Gem)> {
        if self.session.busy {
            return None;
        }
        let types = self.grid.snapshot_types()?;
        let (a, b) = find_hint_pair(&types)?;
        Some((*self.grid.get(a)?, *self.grid.get(b)?))
    }

    /// Activate a hint. False while busy or locked, or when no move exists.
    pub fn show_hint(&mut self) -> bool {
        if self.session.busy || self.session.locked {
            return false;
        }
        if self.session.hint.is_some() {
            return true;
        }
        match self.find_hint_pair() {
            Some((a, b)) => {
                self.session.hint = Some((a.id, b.id));
                true
            }
            None => false,
        }
    }

    pub fn clear_hint(&mut self) {
        if self.session.hint.take().is_some() {
            self.events.push(BoardEvent::HintCleared);
        }
    }

    /// Currently active hint pair, if any.
    pub fn hint_pair(&self) -> Option<(Gem, Gem)> {
        let (a, b) = self.session.hint?;
        Some((*self.grid.find(a)?, *self.grid.find(b)?))
    }

    // ─── Cascade state machine ──────────────────────────────────────────────

    fn sound(&mut self, cue: SoundCue) {
        self.events.push(BoardEvent::Sound { cue });
    }

    fn issue(&mut self, ops: impl IntoIterator<Item = VisualOp>) {
        for op in ops {
            let ticket = self.next_ticket;
            self.next_ticket = self.next_ticket.wrapping_add(1);
            self.fan_in.insert(ticket);
            self.commands.push(VisualCommand { ticket, op });
        }
    }

    /// Run phase completions for as long as nothing is outstanding.
    fn pump(&mut self) {
        while self.fan_in.is_empty() {
            match std::mem::take(&mut self.phase) {
                Phase::Idle => break,
                Phase::Swapping { a, b } => self.finish_swap(a, b),
                Phase::Reverting { a, b } => self.finish_revert(a, b),
                Phase::Clearing(plan) => self.finish_clear(plan),
                Phase::Settling(plan) => self.finish_settle(plan),
                Phase::Reshuffling(types) => self.finish_reshuffle(types),
            }
        }
    }

    fn begin_swap(&mut self, a: GemId, b: GemId) {
        let (Some(pa), Some(pb)) = (self.grid.position_of(a), self.grid.position_of(b)) else {
            return;
        };
        self.session.busy = true;
        self.clear_hint();
        self.session.last_swap = Some((a, b));
        self.sound(SoundCue::Swap);
        log::debug!("swap {pa:?} <-> {pb:?}");

        self.phase = Phase::Swapping { a, b };
        self.issue([VisualOp::Move { gem: a, to: pb }, VisualOp::Move { gem: b, to: pa }]);
    }

    fn finish_swap(&mut self, a: GemId, b: GemId) {
        let (Some(pa), Some(pb)) = (self.grid.position_of(a), self.grid.position_of(b)) else {
            self.finish_cascade();
            return;
        };
        self.grid.swap_contents(pa, pb);
        let (Some(&ga), Some(&gb)) = (self.grid.get(pb), self.grid.get(pa)) else {
            self.finish_cascade();
            return;
        };

        if let Some(activation) = color_bomb_activation(&ga, &gb) {
            log::debug!("color bomb activation {activation:?}");
            self.events.push(BoardEvent::ValidMove);
            self.session.cascade_depth = 0;
            let plan = resolve_activation(&self.grid, &ga, &gb, activation);
            self.start_clear(plan, ClearStyle::Activation);
            return;
        }

        let groups = find_matches(&self.grid);
        if groups.is_empty() {
            self.phase = Phase::Reverting { a, b };
            self.issue([VisualOp::Move { gem: a, to: pa }, VisualOp::Move { gem: b, to: pb }]);
            return;
        }

        self.events.push(BoardEvent::ValidMove);
        self.session.cascade_depth = 0;
        self.step(groups);
    }

    fn finish_revert(&mut self, a: GemId, b: GemId) {
        if let (Some(pa), Some(pb)) = (self.grid.position_of(a), self.grid.position_of(b)) {
            self.grid.swap_contents(pa, pb);
        }
        self.session.busy = false;
        self.phase = Phase::Idle;
    }

    /// One cascade iteration, or quiescence when `groups` is empty.
    fn step(&mut self, groups: Vec<MatchGroup>) {
        if groups.is_empty() {
            self.enter_quiescence();
            return;
        }
        self.session.cascade_depth += 1;
        let plan = resolve_groups(&self.grid, &groups, self.session.last_swap);
        self.start_clear(plan, ClearStyle::Match);
    }

    fn start_clear(&mut self, plan: ClearPlan, style: ClearStyle) {
        self.clear_hint();
        let count = plan.cleared_count();
        log::debug!(
            "clearing {count} gem(s), {} promotion(s), depth {}",
            plan.promotions.len(),
            self.session.cascade_depth
        );
        if style == ClearStyle::Match {
            let touched = count + plan.promotions.len();
            self.sound(if touched >= SPECIAL_CLEAR_SIZE { SoundCue::Special } else { SoundCue::Match });
        }
        self.events.push(BoardEvent::GemsCleared {
            count,
            depth: self.session.cascade_depth,
        });

        let promotes: Vec<VisualOp> = plan
            .promotions
            .iter()
            .map(|p| VisualOp::Promote { gem: p.carrier.id, kind: p.kind })
            .collect();
        let clears: Vec<VisualOp> = plan
            .destroyed
            .iter()
            .map(|g| VisualOp::Clear { gem: g.id, style })
            .collect();

        self.phase = Phase::Clearing(plan);
        self.issue(promotes.into_iter().chain(clears));
    }

    fn finish_clear(&mut self, plan: ClearPlan) {
        for p in &plan.promotions {
            if let Some(g) = self.grid.get_mut(p.carrier.pos()).filter(|g| g.id == p.carrier.id) {
                g.kind = p.kind;
            }
        }
        for g in &plan.destroyed {
            if self.grid.get(g.pos()).is_some_and(|cur| cur.id == g.id) {
                self.grid.take(g.pos());
            }
        }

        let gravity = plan_gravity(&self.grid, self.settings.palette_len(), &mut self.rng, &mut self.next_id);
        let ops: Vec<VisualOp> = gravity
            .falls
            .iter()
            .map(|f| VisualOp::Move { gem: f.gem, to: f.to })
            .chain(gravity.spawns.iter().map(|s| VisualOp::DropIn {
                gem: s.gem,
                spawn_row: s.spawn_row,
            }))
            .collect();

        self.phase = Phase::Settling(gravity);
        self.issue(ops);
    }

    fn finish_settle(&mut self, plan: GravityPlan) {
        apply_gravity(&mut self.grid, &plan);
        let groups = find_matches(&self.grid);
        self.step(groups);
    }

    fn enter_quiescence(&mut self) {
        let Some(types) = self.grid.snapshot_types() else {
            self.finish_cascade();
            return;
        };
        if has_any_possible_move(&types) {
            self.finish_cascade();
            return;
        }

        let result = reshuffle_types(&types, self.settings.palette_len(), &mut self.rng);
        self.events.push(BoardEvent::Reshuffled { permuted: result.permuted });
        let ops: Vec<VisualOp> = self
            .grid
            .gems()
            .map(|g| VisualOp::Retype {
                gem: g.id,
                gem_type: result.types.at(g.pos()),
            })
            .collect();

        self.phase = Phase::Reshuffling(result.types);
        self.issue(ops);
    }

    fn finish_reshuffle(&mut self, types: TypeGrid) {
        for r in 0..types.rows {
            for c in 0..types.cols {
                if let Some(g) = self.grid.get_mut(Pos::new(r, c)) {
                    g.gem_type = types.get(r, c);
                }
            }
        }
        self.finish_cascade();
    }

    fn finish_cascade(&mut self) {
        self.session.busy = false;
        self.phase = Phase::Idle;
        self.events.push(BoardEvent::CascadeComplete);
        log::debug!("cascade complete at depth {}", self.session.cascade_depth);
    }
}
