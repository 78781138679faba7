//! Hole attraction and capture
//!
//! A ball is Free until it comes within `HOLE_ATTRACTION_RADIUS` of a hole
//! centre, Attracting while inside that radius (pulled in, shrinking with
//! distance), and Captured once the distance drops to its own radius.

use super::state::{Ball, BallColor, Hole};
use crate::consts::*;
use crate::map_range;

/// Where a ball stands relative to one hole
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attraction {
    Free,
    Attracting { distance: f32 },
    Captured { matched: bool },
}

/// A capture recorded during the attraction pass, applied afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    /// Index into the ball list as it was at the start of the pass
    pub ball: usize,
    pub hole: usize,
    pub ball_color: BallColor,
    pub hole_color: BallColor,
    pub matched: bool,
}

/// Pull a ball toward a hole, shrink it, and deactivate it on capture
pub fn attract(ball: &mut Ball, hole: &Hole) -> Attraction {
    let to_center = hole.center - ball.pos;
    let distance = to_center.length();

    if distance > HOLE_ATTRACTION_RADIUS {
        return Attraction::Free;
    }

    ball.apply_force(to_center.normalize_or_zero() * (HOLE_ATTRACTION_FORCE * distance));
    ball.scale = map_range(distance, 0.0, CELL_SIZE, 0.0, 1.0).clamp(0.0, 1.0);

    if distance <= ball.radius() {
        ball.active = false;
        Attraction::Captured {
            matched: ball.color.matches(hole.color),
        }
    } else {
        Attraction::Attracting { distance }
    }
}

/// One attraction pass over every active ball against every hole.
///
/// Balls are only mutated in place (velocity, scale, active flag); removal is
/// left to the caller using the returned captures. The first hole to capture a
/// ball ends that ball's pass.
pub fn attraction_pass(balls: &mut [Ball], holes: &[Hole]) -> Vec<Capture> {
    let mut captures = Vec::new();
    for (ball_idx, ball) in balls.iter_mut().enumerate() {
        if !ball.active {
            continue;
        }
        for (hole_idx, hole) in holes.iter().enumerate() {
            if let Attraction::Captured { matched } = attract(ball, hole) {
                captures.push(Capture {
                    ball: ball_idx,
                    hole: hole_idx,
                    ball_color: ball.color,
                    hole_color: hole.color,
                    matched,
                });
                break;
            }
        }
    }
    captures
}
