//! Collision detection and response
//!
//! Everything here tests a ball's *next* position (pos + vel) against line
//! segments and reflects the velocity in place. Positions are never corrected;
//! only velocities change.

use glam::Vec2;

use super::geometry::{LineSegment, reflect_off_segment};
use super::state::{Ball, BallColor, DrawnLine, LineId, Tile};
use crate::consts::*;

/// Playfield limits for border bounces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec2::new(0.0, TOP_BAR),
            max: Vec2::new(WINDOW_WIDTH - CELL_SIZE, WINDOW_HEIGHT - CELL_SIZE),
        }
    }
}

/// Result of a wall pass for one ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    pub grid_x: usize,
    pub grid_y: usize,
    /// Edge index in hitbox order (top, bottom, left, right)
    pub edge: usize,
    /// Colour picked up from the wall, if it had one
    pub recolored: Option<BallColor>,
}

/// Integrate one step and flip velocity components that left the bounds.
///
/// The ball is not pushed back inside, so it can sit out of bounds for a tick.
pub fn advance_ball(ball: &mut Ball, bounds: &Bounds) {
    ball.pos += ball.vel;
    bounce_off_border(ball, bounds);
}

pub fn bounce_off_border(ball: &mut Ball, bounds: &Bounds) {
    if ball.pos.x < bounds.min.x || ball.pos.x > bounds.max.x {
        ball.vel.x = -ball.vel.x;
    }
    if ball.pos.y < bounds.min.y || ball.pos.y > bounds.max.y {
        ball.vel.y = -ball.vel.y;
    }
}

/// Test one hitbox against the ball's next position, reflecting off the first
/// edge it touches. Returns the edge index.
pub fn collide_with_hitbox(ball: &mut Ball, hitbox: &[LineSegment; 4]) -> Option<usize> {
    let future = ball.future_pos();
    let radius = ball.radius();

    let edge = hitbox.iter().position(|e| e.touches(future, radius))?;
    ball.vel = reflect_off_segment(ball.vel, ball.pos, &hitbox[edge]);
    ball.collision_cooldown = COLLISION_COOLDOWN_TICKS;
    Some(edge)
}

/// Wall pass for one ball over tiles in scan order.
///
/// While the cooldown is running it is decremented and nothing is tested.
/// Otherwise the first wall edge hit reflects the ball, restarts the cooldown,
/// recolours the ball for coloured walls, and ends the pass.
pub fn collide_with_walls<'a, I>(ball: &mut Ball, tiles: I) -> Option<WallHit>
where
    I: IntoIterator<Item = &'a Tile>,
{
    if ball.collision_cooldown > 0 {
        ball.collision_cooldown -= 1;
        return None;
    }

    for tile in tiles {
        let Some(hitbox) = tile.hitbox.as_ref() else {
            continue;
        };
        if let Some(edge) = collide_with_hitbox(ball, hitbox) {
            let recolored = tile.recolor();
            if let Some(color) = recolored {
                ball.color = color;
            }
            return Some(WallHit {
                grid_x: tile.grid_x,
                grid_y: tile.grid_y,
                edge,
                recolored,
            });
        }
    }
    None
}

/// True if the ball's next position touches any of the segments
pub fn touches_any(ball: &Ball, segments: &[LineSegment]) -> bool {
    let future = ball.future_pos();
    segments.iter().any(|s| s.touches(future, ball.radius()))
}

/// Drawn-line response: test against every segment, but bounce off the
/// first segment of the line regardless of which one was hit.
pub fn deflect_off_line(ball: &mut Ball, segments: &[LineSegment]) -> bool {
    let Some(first) = segments.first() else {
        return false;
    };
    if !touches_any(ball, segments) {
        return false;
    }
    if first.is_degenerate() {
        log::warn!("Drawn line starts with a zero-length segment; discarding without bounce");
        return true;
    }
    ball.vel = reflect_off_segment(ball.vel, ball.pos, first);
    true
}

/// Run every stored line against every ball. A line is spent on its first
/// hit; spent line ids are returned and left for the caller to remove.
pub fn collide_lines(balls: &mut [Ball], lines: &[DrawnLine]) -> Vec<LineId> {
    let mut spent = Vec::new();
    for line in lines {
        for ball in balls.iter_mut().filter(|b| b.active) {
            if deflect_off_line(ball, &line.segments) {
                log::debug!("Ball deflected by line {:?}", line.id);
                spent.push(line.id);
                break;
            }
        }
    }
    spent
}
