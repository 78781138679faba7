//! Board entities and core simulation types

use std::collections::VecDeque;
use std::fmt;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::LineSegment;
use crate::consts::*;
use crate::{cell_center, cell_origin};

/// Ball / hole / wall colour. Grey is neutral and matches everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallColor {
    Grey,
    Orange,
    Blue,
    Green,
    Yellow,
}

impl BallColor {
    pub const ALL: [BallColor; 5] = [
        BallColor::Grey,
        BallColor::Orange,
        BallColor::Blue,
        BallColor::Green,
        BallColor::Yellow,
    ];

    /// Colour for a layout digit (0-4)
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BallColor::Grey => "grey",
            BallColor::Orange => "orange",
            BallColor::Blue => "blue",
            BallColor::Green => "green",
            BallColor::Yellow => "yellow",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "grey" | "gray" => Some(BallColor::Grey),
            "orange" => Some(BallColor::Orange),
            "blue" => Some(BallColor::Blue),
            "green" => Some(BallColor::Green),
            "yellow" => Some(BallColor::Yellow),
            _ => None,
        }
    }

    /// Grey on either side always matches
    pub fn matches(&self, other: BallColor) -> bool {
        *self == BallColor::Grey || other == BallColor::Grey || *self == other
    }
}

impl fmt::Display for BallColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: BallColor,
    /// Cleared the moment a hole captures the ball
    pub active: bool,
    /// Render scale, shrinks while a hole pulls the ball in
    pub scale: f32,
    /// Ticks left before wall collisions are tested again
    pub collision_cooldown: u32,
}

impl Ball {
    /// New ball at `pos` with a diagonal unit-component velocity of random signs
    pub fn new<R: Rng>(pos: Vec2, color: BallColor, rng: &mut R) -> Self {
        let vx = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
        let vy = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
        Self::with_velocity(pos, Vec2::new(vx, vy), color)
    }

    pub fn with_velocity(pos: Vec2, vel: Vec2, color: BallColor) -> Self {
        Self {
            pos,
            vel,
            color,
            active: true,
            scale: 1.0,
            collision_cooldown: 0,
        }
    }

    /// New ball centred on a grid cell
    pub fn at_cell<R: Rng>(grid_x: usize, grid_y: usize, color: BallColor, rng: &mut R) -> Self {
        Self::new(cell_center(grid_x, grid_y), color, rng)
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        BALL_RADIUS
    }

    /// Where the ball will be after one more step
    #[inline]
    pub fn future_pos(&self) -> Vec2 {
        self.pos + self.vel
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.vel += force;
    }
}

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Empty,
    /// Colour index 0 is the plain wall; 1-4 recolour balls that bounce off
    Wall { color: u8 },
    /// One quarter of a 2x2 hole
    HolePart { hole: usize },
}

/// A single grid cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub grid_x: usize,
    pub grid_y: usize,
    pub kind: TileKind,
    /// Present only for walls: top, bottom, left, right
    pub hitbox: Option<[LineSegment; 4]>,
}

impl Tile {
    pub fn empty(grid_x: usize, grid_y: usize) -> Self {
        Self {
            grid_x,
            grid_y,
            kind: TileKind::Empty,
            hitbox: None,
        }
    }

    pub fn wall(grid_x: usize, grid_y: usize, color: u8) -> Self {
        Self {
            grid_x,
            grid_y,
            kind: TileKind::Wall { color },
            hitbox: Some(wall_hitbox(grid_x, grid_y)),
        }
    }

    pub fn hole_part(grid_x: usize, grid_y: usize, hole: usize) -> Self {
        Self {
            grid_x,
            grid_y,
            kind: TileKind::HolePart { hole },
            hitbox: None,
        }
    }

    pub fn is_wall(&self) -> bool {
        matches!(self.kind, TileKind::Wall { .. })
    }

    /// Colour a ball takes after bouncing off this tile (plain walls leave it alone)
    pub fn recolor(&self) -> Option<BallColor> {
        match self.kind {
            TileKind::Wall { color } if color > 0 => BallColor::from_index(color),
            _ => None,
        }
    }
}

/// Hitbox for a wall cell: the tile square grown by the padding on every side
pub fn wall_hitbox(grid_x: usize, grid_y: usize) -> [LineSegment; 4] {
    let origin = cell_origin(grid_x, grid_y);
    let top_left = origin - Vec2::splat(HITBOX_PADDING);
    let bottom_right = origin + Vec2::splat(CELL_SIZE + HITBOX_PADDING);
    let top_right = Vec2::new(bottom_right.x, top_left.y);
    let bottom_left = Vec2::new(top_left.x, bottom_right.y);

    [
        LineSegment::new(top_left, top_right),
        LineSegment::new(bottom_left, bottom_right),
        LineSegment::new(top_left, bottom_left),
        LineSegment::new(top_right, bottom_right),
    ]
}

/// A 2x2 hole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hole {
    /// Top-left cell of the footprint
    pub grid_x: usize,
    pub grid_y: usize,
    pub center: Vec2,
    pub color: BallColor,
}

impl Hole {
    pub fn new(grid_x: usize, grid_y: usize, color: BallColor) -> Self {
        let center = cell_origin(grid_x + 1, grid_y + 1);
        Self {
            grid_x,
            grid_y,
            center,
            color,
        }
    }
}

/// A ball spawner with its own queue of pending colours
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub grid_x: usize,
    pub grid_y: usize,
    pub pos: Vec2,
    /// Ticks between spawn windows
    pub interval_ticks: u32,
    /// Front is the next colour to emit
    pub queue: VecDeque<BallColor>,
    /// Ticks since this spawner last emitted a ball
    pub ticks_since_fire: u32,
    /// Set for the tick on which this spawner emitted
    pub firing: bool,
}

impl Spawner {
    pub fn new(grid_x: usize, grid_y: usize, interval_seconds: f32) -> Self {
        Self {
            grid_x,
            grid_y,
            pos: cell_center(grid_x, grid_y),
            interval_ticks: (interval_seconds * TICK_RATE as f32).round() as u32,
            queue: VecDeque::new(),
            ticks_since_fire: 0,
            firing: false,
        }
    }

    pub fn enqueue(&mut self, color: BallColor) {
        self.queue.push_back(color);
    }
}

/// Handle for a stored drawn line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(pub u32);

/// A player-drawn polyline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawnLine {
    pub id: LineId,
    pub segments: Vec<LineSegment>,
}

/// A marker circling the board edge after the level is cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatrolMarker {
    pub grid_x: usize,
    pub grid_y: usize,
    pub clockwise: bool,
}

impl PatrolMarker {
    /// Move one cell along the perimeter of a `width` x `height` grid
    pub fn step(&mut self, width: usize, height: usize) {
        let (max_x, max_y) = (width.saturating_sub(1), height.saturating_sub(1));
        let (x, y) = (self.grid_x, self.grid_y);
        if self.clockwise {
            if y == 0 && x < max_x {
                self.grid_x += 1;
            } else if x == max_x && y < max_y {
                self.grid_y += 1;
            } else if y == max_y && x > 0 {
                self.grid_x -= 1;
            } else if x == 0 && y > 0 {
                self.grid_y -= 1;
            }
        } else if x == max_x && y > 0 {
            self.grid_y -= 1;
        } else if y == 0 && x > 0 {
            self.grid_x -= 1;
        } else if x == 0 && y < max_y {
            self.grid_y += 1;
        } else if y == max_y && x < max_x {
            self.grid_x += 1;
        }
    }
}

/// The two end-of-level border markers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorderPatrol {
    pub markers: [PatrolMarker; 2],
    /// Seconds accumulated toward the next step
    pub timer: f32,
}

impl BorderPatrol {
    /// One marker at the top-left heading clockwise, one at the bottom-right
    /// heading counter-clockwise
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            markers: [
                PatrolMarker {
                    grid_x: 0,
                    grid_y: 0,
                    clockwise: true,
                },
                PatrolMarker {
                    grid_x: width.saturating_sub(1),
                    grid_y: height.saturating_sub(1),
                    clockwise: false,
                },
            ],
            timer: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32, width: usize, height: usize) {
        self.timer += dt;
        if self.timer >= PATROL_STEP_SECONDS {
            self.timer = 0.0;
            for marker in &mut self.markers {
                marker.step(width, height);
            }
        }
    }
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen by the player
    Paused,
    /// Clock ran out with balls still in play or queued
    TimesUp,
    /// Clock ran out on a cleared board
    GameOver,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_ball_new_diagonal_velocity() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..20 {
            let ball = Ball::new(Vec2::ZERO, BallColor::Blue, &mut rng);
            assert_eq!(ball.vel.x.abs(), 1.0);
            assert_eq!(ball.vel.y.abs(), 1.0);
            assert!(ball.active);
            assert_eq!(ball.scale, 1.0);
            assert_eq!(ball.collision_cooldown, 0);
            assert_eq!(ball.radius(), CELL_SIZE / 2.0);
        }
    }

    #[test]
    fn test_ball_at_cell() {
        let mut rng = Pcg32::seed_from_u64(1);
        let ball = Ball::at_cell(1, 2, BallColor::Grey, &mut rng);
        assert_eq!(ball.pos, Vec2::new(48.0, 144.0));
    }

    #[test]
    fn test_color_matching() {
        for c in BallColor::ALL {
            assert!(BallColor::Grey.matches(c));
            assert!(c.matches(BallColor::Grey));
            assert!(c.matches(c));
        }
        assert!(!BallColor::Orange.matches(BallColor::Blue));
        assert!(!BallColor::Yellow.matches(BallColor::Green));
    }

    #[test]
    fn test_color_index_round_trip() {
        assert_eq!(BallColor::from_index(0), Some(BallColor::Grey));
        assert_eq!(BallColor::from_index(4), Some(BallColor::Yellow));
        assert_eq!(BallColor::from_index(5), None);
        assert_eq!(BallColor::Green.index(), 3);
        assert_eq!(BallColor::from_name("Orange"), Some(BallColor::Orange));
        assert_eq!(BallColor::from_name("pink"), None);
    }

    #[test]
    fn test_wall_hitbox_edges() {
        let [top, bottom, left, right] = wall_hitbox(1, 0);
        assert_eq!(top.start, Vec2::new(30.0, 62.0));
        assert_eq!(top.end, Vec2::new(66.0, 62.0));
        assert_eq!(bottom.start, Vec2::new(30.0, 98.0));
        assert_eq!(left.end, Vec2::new(30.0, 98.0));
        assert_eq!(right.start, Vec2::new(66.0, 62.0));
        assert_eq!(right.end, Vec2::new(66.0, 98.0));
    }

    #[test]
    fn test_tile_recolor() {
        assert_eq!(Tile::wall(0, 0, 0).recolor(), None);
        assert_eq!(Tile::wall(0, 0, 2).recolor(), Some(BallColor::Blue));
        assert_eq!(Tile::empty(0, 0).recolor(), None);
        assert!(Tile::wall(0, 0, 1).hitbox.is_some());
        assert!(Tile::hole_part(0, 0, 0).hitbox.is_none());
    }

    #[test]
    fn test_hole_center() {
        let hole = Hole::new(10, 10, BallColor::Orange);
        assert_eq!(hole.center, Vec2::new(352.0, 416.0));
    }

    #[test]
    fn test_spawner_interval_ticks() {
        let spawner = Spawner::new(0, 0, 5.0);
        assert_eq!(spawner.interval_ticks, 300);
    }

    #[test]
    fn test_border_patrol_laps() {
        let (w, h) = (4, 3);
        let mut patrol = BorderPatrol::new(w, h);
        let perimeter = 2 * (w - 1) + 2 * (h - 1);

        let mut first = Vec::new();
        for _ in 0..perimeter {
            patrol.markers[0].step(w, h);
            patrol.markers[1].step(w, h);
            first.push((patrol.markers[0].grid_x, patrol.markers[0].grid_y));
        }
        // Full lap returns both markers to their start cells
        assert_eq!((patrol.markers[0].grid_x, patrol.markers[0].grid_y), (0, 0));
        assert_eq!((patrol.markers[1].grid_x, patrol.markers[1].grid_y), (3, 2));
        assert_eq!(first[0], (1, 0));
        assert_eq!(first[3], (3, 1));
    }

    #[test]
    fn test_border_patrol_timer() {
        let mut patrol = BorderPatrol::new(18, 18);
        patrol.advance(0.05, 18, 18);
        assert_eq!(patrol.markers[0].grid_x, 0);
        patrol.advance(0.05, 18, 18);
        assert_eq!(patrol.markers[0].grid_x, 1);
        assert_eq!((patrol.markers[1].grid_x, patrol.markers[1].grid_y), (17, 16));
        assert_eq!(patrol.timer, 0.0);
    }

    #[test]
    fn test_border_patrol_opposite_directions() {
        let (w, h) = (18, 18);
        let mut patrol = BorderPatrol::new(w, h);
        let mut cw = Vec::new();
        let mut ccw = Vec::new();
        for _ in 0..3 {
            patrol.markers[0].step(w, h);
            patrol.markers[1].step(w, h);
            cw.push((patrol.markers[0].grid_x, patrol.markers[0].grid_y));
            ccw.push((patrol.markers[1].grid_x, patrol.markers[1].grid_y));
        }
        // Clockwise: right along the top. Counter-clockwise: up the right column.
        assert_eq!(cw, vec![(1, 0), (2, 0), (3, 0)]);
        assert_eq!(ccw, vec![(17, 16), (17, 15), (17, 14)]);
    }

    #[test]
    fn test_counter_clockwise_corners() {
        let (w, h) = (4, 3);
        let mut marker = PatrolMarker {
            grid_x: 3,
            grid_y: 2,
            clockwise: false,
        };
        let mut path = Vec::new();
        for _ in 0..10 {
            marker.step(w, h);
            path.push((marker.grid_x, marker.grid_y));
        }
        assert_eq!(
            path,
            vec![(3, 1), (3, 0), (2, 0), (1, 0), (0, 0), (0, 1), (0, 2), (1, 2), (2, 2), (3, 2)]
        );
    }
}
