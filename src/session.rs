//! Level progression across a whole configuration
//!
//! A cleared level (GameOver) moves on to the next one with the score carried
//! over; the last level stays in GameOver. Dropping below zero points sends the
//! player back to level 0.

use crate::error::LevelResult;
use crate::level::GameConfig;
use crate::sim::{GamePhase, GameState, TickInput, TickOutcome, tick};

pub struct Session {
    config: GameConfig,
    pub state: GameState,
}

impl Session {
    /// Start at level 0
    pub fn new(config: GameConfig, seed: u64) -> LevelResult<Self> {
        let level = config.level(0)?;
        let rules = config.score_rules(0)?;
        let state = GameState::new(level, rules, 0, seed)?;
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn level_index(&self) -> usize {
        self.state.level_index
    }

    /// Every level cleared
    pub fn is_finished(&self) -> bool {
        self.state.phase == GamePhase::GameOver && self.level_index() + 1 >= self.config.levels.len()
    }

    /// Reload the current level
    pub fn restart(&mut self) -> LevelResult<()> {
        self.load_level(self.level_index())
    }

    fn load_level(&mut self, index: usize) -> LevelResult<()> {
        let level = self.config.level(index)?;
        let rules = self.config.score_rules(index)?;
        self.state.restart(level, rules, index)
    }

    /// One tick of the current level, then any level change it triggers
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> LevelResult<Option<TickOutcome>> {
        if input.restart {
            self.restart()?;
        }

        let outcome = tick(&mut self.state, input, dt);

        if outcome.is_some() && self.state.score < 0 {
            log::info!("Score fell to {}; back to level 0", self.state.score);
            self.load_level(0)?;
        } else if self.state.phase == GamePhase::GameOver && !self.is_finished() {
            let next = self.level_index() + 1;
            log::info!("Level {} cleared with {} points", self.level_index(), self.state.score);
            self.load_level(next)?;
        }

        Ok(outcome)
    }
}
