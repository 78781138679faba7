//! Inkball - A grid-based ball rolling puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, holes, spawners, game state)
//! - `level`: Level layouts and scoring tables consumed by the simulation
//! - `session`: Level progression across a whole configuration
//! - `error`: Load and configuration errors

pub mod error;
pub mod level;
pub mod session;
pub mod sim;

pub use error::LevelError;
pub use level::{GameConfig, LevelConfig, ScoreRules};
pub use session::Session;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation tick rate (ticks per second)
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;

    /// Grid cell edge length in world units
    pub const CELL_SIZE: f32 = 32.0;
    /// Height of the HUD strip above the board
    pub const TOP_BAR: f32 = 64.0;

    /// Board dimensions in cells
    pub const BOARD_WIDTH: usize = 18;
    pub const BOARD_HEIGHT: usize = 18;

    /// Playfield extents in world units (border bounce limits)
    pub const WINDOW_WIDTH: f32 = 576.0;
    pub const WINDOW_HEIGHT: f32 = 640.0;

    /// Ball radius - always half a cell
    pub const BALL_RADIUS: f32 = CELL_SIZE / 2.0;
    /// Ticks during which wall tests are suppressed after a wall bounce
    pub const COLLISION_COOLDOWN_TICKS: u32 = 5;
    /// Wall hitboxes extend past the tile square by this much on each side
    pub const HITBOX_PADDING: f32 = 2.0;

    /// Holes only pull balls closer than this. Equal to the cell size in the
    /// shipped configuration but not derived from it.
    pub const HOLE_ATTRACTION_RADIUS: f32 = 32.0;
    /// Attraction force per unit of distance to the hole centre
    pub const HOLE_ATTRACTION_FORCE: f32 = 0.005;

    /// Border patrol markers step one cell per quantum (seconds)
    pub const PATROL_STEP_SECONDS: f32 = 0.067;
    /// Accumulated bonus time that converts one second into one point
    pub const BONUS_QUANTUM_SECONDS: f32 = 0.067;
    /// Bonus time drained per tick once the level is cleared (4 ticks worth)
    pub const BONUS_RATE: f32 = 4.0 / TICK_RATE as f32;
}

/// Linearly re-map `value` from `[in_min, in_max]` to `[out_min, out_max]`
#[inline]
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (out_max - out_min) * ((value - in_min) / (in_max - in_min))
}

/// World position of a cell's top-left corner
#[inline]
pub fn cell_origin(grid_x: usize, grid_y: usize) -> Vec2 {
    Vec2::new(
        grid_x as f32 * consts::CELL_SIZE,
        grid_y as f32 * consts::CELL_SIZE + consts::TOP_BAR,
    )
}

/// World position of a cell's centre
#[inline]
pub fn cell_center(grid_x: usize, grid_y: usize) -> Vec2 {
    cell_origin(grid_x, grid_y) + Vec2::splat(consts::CELL_SIZE / 2.0)
}
