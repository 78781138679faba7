//! Fixed timestep game tick
//!
//! `GameState` wraps a board with the level clock, score and phase. `tick`
//! only advances the board while Playing; every other phase freezes it.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::board::{Board, TickOutcome};
use super::geometry::LineSegment;
use super::state::{Ball, BorderPatrol, DrawnLine, GamePhase, Hole, LineId, Spawner, Tile};
use crate::consts::*;
use crate::error::LevelResult;
use crate::level::{LevelConfig, ScoreRules};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pause toggle
    pub pause: bool,
    /// Reload the current level (handled by `Session`, which owns the config)
    pub restart: bool,
    /// A line the player just finished drawing
    pub finished_line: Option<Vec<LineSegment>>,
    /// Undo the most recent line
    pub undo_line: bool,
}

/// Complete game state for one level in play
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub phase: GamePhase,
    pub score: i64,
    /// Seconds left on the level clock
    pub remaining_time: f32,
    /// Bonus time waiting to be converted into points
    pub bonus_accumulator: f32,
    pub level_index: usize,
    /// Score when the current level was entered; restart goes back to it
    pub level_start_score: i64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub board: Board,
}

impl GameState {
    /// Start a level from scratch with score 0
    pub fn new(level: &LevelConfig, rules: ScoreRules, level_index: usize, seed: u64) -> LevelResult<Self> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let board = Board::load(level, rules, &mut rng)?;
        log::info!("Level {} started (seed {})", level_index, seed);
        Ok(Self {
            seed,
            rng,
            phase: GamePhase::Playing,
            score: 0,
            remaining_time: level.time,
            bonus_accumulator: 0.0,
            level_index,
            level_start_score: 0,
            time_ticks: 0,
            board,
        })
    }

    /// Rebuild the board for `level_index` and reset the clock.
    ///
    /// Reloading the same level restores the score it was entered with;
    /// moving to a different level carries the current score in. Level 0
    /// always starts from 0. On error the state is left untouched.
    pub fn restart(&mut self, level: &LevelConfig, rules: ScoreRules, level_index: usize) -> LevelResult<()> {
        let board = Board::load(level, rules, &mut self.rng)?;

        if level_index == 0 {
            self.level_start_score = 0;
        } else if level_index != self.level_index {
            self.level_start_score = self.score;
        }

        self.board = board;
        self.level_index = level_index;
        self.score = self.level_start_score;
        self.remaining_time = level.time;
        self.bonus_accumulator = 0.0;
        self.phase = GamePhase::Playing;
        log::info!("Level {} restarted with score {}", level_index, self.score);
        Ok(())
    }

    /// Playing and Paused swap; other phases ignore the toggle
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            other => other,
        };
        log::debug!("Phase now {:?}", self.phase);
    }

    /// Remaining time as shown on the HUD: whole seconds, never negative
    pub fn remaining_time_display(&self) -> u32 {
        self.remaining_time.max(0.0).round() as u32
    }

    /// Seconds until the next spawn window
    pub fn time_to_spawn(&self) -> f32 {
        self.board.time_to_spawn()
    }

    /// Convert bonus time into points: each full quantum drains one second
    /// of the clock for one point.
    pub fn award_time_bonus(&mut self, amount: f32) {
        if self.remaining_time <= 0.0 {
            return;
        }
        self.bonus_accumulator += amount.min(self.remaining_time);
        while self.bonus_accumulator >= BONUS_QUANTUM_SECONDS && self.remaining_time > 0.0 {
            self.bonus_accumulator -= BONUS_QUANTUM_SECONDS;
            self.remaining_time = (self.remaining_time - 1.0).max(0.0);
            self.score += 1;
        }
    }

    pub fn add_line(&mut self, segments: Vec<LineSegment>) -> Option<LineId> {
        self.board.add_line(segments)
    }

    pub fn remove_line(&mut self, id: LineId) -> bool {
        self.board.remove_line(id)
    }

    /// In-progress drag query; `true` means the caller should drop the line
    pub fn deflect_with_pending_line(&mut self, segments: &[LineSegment]) -> bool {
        self.board.deflect_with_pending_line(segments)
    }

    /// Read-only view for a renderer or host
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            score: self.score,
            remaining_time: self.remaining_time_display(),
            time_to_spawn: self.time_to_spawn(),
            level_index: self.level_index,
            tiles: self.board.tiles(),
            balls: &self.board.balls,
            holes: &self.board.holes,
            spawners: &self.board.spawners,
            lines: &self.board.lines,
            patrol: &self.board.patrol,
        }
    }
}

/// Per-tick read-only view of everything a renderer draws
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub score: i64,
    /// Whole seconds, as displayed
    pub remaining_time: u32,
    pub time_to_spawn: f32,
    pub level_index: usize,
    pub tiles: &'a [Tile],
    pub balls: &'a [Ball],
    pub holes: &'a [Hole],
    pub spawners: &'a [Spawner],
    pub lines: &'a [DrawnLine],
    pub patrol: &'a BorderPatrol,
}

impl Snapshot<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Advance the game state by one fixed timestep.
///
/// Returns the board outcome, or `None` when the phase kept the board frozen.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Option<TickOutcome> {
    if input.pause {
        state.toggle_pause();
    }

    if state.phase != GamePhase::Playing {
        return None;
    }

    if let Some(segments) = input.finished_line.clone() {
        state.board.add_line(segments);
    }
    if input.undo_line {
        state.board.remove_last_line();
    }

    state.time_ticks += 1;
    state.remaining_time = (state.remaining_time - dt).max(0.0);

    let outcome = state.board.tick(dt, &mut state.rng);
    state.score += outcome.score_delta;

    if outcome.won {
        state.award_time_bonus(BONUS_RATE);
    }

    for id in state.board.collide_lines() {
        log::debug!("Line {:?} spent", id);
    }

    if state.remaining_time_display() == 0 {
        state.phase = if state.board.check_win_condition() {
            GamePhase::GameOver
        } else {
            GamePhase::TimesUp
        };
        log::info!("Level {} ended: {:?}, score {}", state.level_index, state.phase, state.score);
    }

    Some(outcome)
}
