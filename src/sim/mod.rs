//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (tiles column by column, balls in spawn order)
//! - No rendering or platform dependencies

pub mod attraction;
pub mod board;
pub mod collision;
pub mod geometry;
pub mod spawn;
pub mod state;
pub mod tick;

pub use attraction::{Attraction, Capture, attract, attraction_pass};
pub use board::{Board, TickOutcome};
pub use collision::{Bounds, WallHit, advance_ball, collide_with_walls, deflect_off_line};
pub use geometry::{LineSegment, reflect, reflect_off_segment};
pub use spawn::{SpawnClock, SpawnEvent, tick_spawners};
pub use state::{
    Ball, BallColor, BorderPatrol, DrawnLine, GamePhase, Hole, LineId, PatrolMarker, Spawner, Tile, TileKind,
};
pub use tick::{GameState, Snapshot, TickInput, tick};
