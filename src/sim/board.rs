//! The board: tile grid, entity collections and the per-tick call order
//!
//! Tick order is fixed: spawners, then each ball moves and tests walls, then
//! one attraction pass over all balls, then captures are resolved and removed,
//! then the win condition is checked.

use rand::Rng;

use super::attraction::{Capture, attraction_pass};
use super::collision::{Bounds, advance_ball, collide_lines, collide_with_walls, deflect_off_line};
use super::geometry::LineSegment;
use super::spawn::{SpawnClock, SpawnEvent, tick_spawners};
use super::state::{Ball, BallColor, BorderPatrol, DrawnLine, Hole, LineId, Spawner, Tile, TileKind};
use crate::consts::*;
use crate::error::{LevelError, LevelResult};
use crate::level::{LevelConfig, ScoreRules};

/// What happened during one board tick
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    pub spawned: Option<SpawnEvent>,
    pub wall_hits: usize,
    pub captures: Vec<Capture>,
    /// Net score change from captures this tick
    pub score_delta: i64,
    pub won: bool,
}

/// A loaded level in play
#[derive(Debug, Clone)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    /// Column-major: index = x * height + y
    tiles: Vec<Tile>,
    pub balls: Vec<Ball>,
    pub holes: Vec<Hole>,
    pub spawners: Vec<Spawner>,
    pub spawn_clock: SpawnClock,
    pub lines: Vec<DrawnLine>,
    pub patrol: BorderPatrol,
    pub bounds: Bounds,
    rules: ScoreRules,
    next_line_id: u32,
}

impl Board {
    /// Build a board from a level's layout, queue and timing
    pub fn load<R: Rng>(level: &LevelConfig, rules: ScoreRules, rng: &mut R) -> LevelResult<Self> {
        level.validate()?;
        let queue = level.ball_colors()?;
        Self::from_layout(
            &level.layout_rows(),
            level.spawn_interval,
            &queue,
            rules,
            BOARD_WIDTH,
            BOARD_HEIGHT,
            rng,
        )
    }

    /// Parse layout rows into a `width` x `height` board.
    ///
    /// Rows and columns past the grid are ignored. `queue` goes to the first
    /// spawner in reading order.
    pub fn from_layout<R: Rng>(
        rows: &[&str],
        spawn_interval: f32,
        queue: &[BallColor],
        rules: ScoreRules,
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> LevelResult<Self> {
        if rows.iter().all(|r| r.trim().is_empty()) {
            return Err(LevelError::EmptyLayout);
        }
        if rows.len() > height {
            log::warn!("Layout has {} rows; only the first {} are used", rows.len(), height);
        }

        let mut tiles: Vec<Tile> = (0..width)
            .flat_map(|x| (0..height).map(move |y| Tile::empty(x, y)))
            .collect();
        let mut balls = Vec::new();
        let mut holes = Vec::new();
        let mut spawners = Vec::new();

        for (y, row) in rows.iter().enumerate().take(height) {
            let chars: Vec<char> = row.chars().collect();
            if chars.len() > width {
                log::warn!("Layout row {} is {} wide; truncating to {}", y, chars.len(), width);
            }

            let mut x = 0;
            while x < chars.len().min(width) {
                // Cells covered by an earlier hole stay part of it
                if matches!(tiles[x * height + y].kind, TileKind::HolePart { .. }) {
                    if let marker @ ('H' | 'B') = chars[x] {
                        return Err(LevelError::HoleOverlap { marker, row: y, col: x });
                    }
                    x += 1;
                    continue;
                }

                match chars[x] {
                    'X' => tiles[x * height + y] = Tile::wall(x, y, 0),
                    c @ '1'..='4' => {
                        let color = c as u8 - b'0';
                        tiles[x * height + y] = Tile::wall(x, y, color);
                    }
                    'H' => {
                        let color = color_suffix(&chars, 'H', y, x)?;
                        if x + 1 >= width || y + 1 >= height {
                            return Err(LevelError::HoleOutOfBounds { row: y, col: x });
                        }
                        let hole = holes.len();
                        for (hx, hy) in [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)] {
                            tiles[hx * height + hy] = Tile::hole_part(hx, hy, hole);
                        }
                        holes.push(Hole::new(x, y, color));
                        x += 2;
                        continue;
                    }
                    'B' => {
                        let color = color_suffix(&chars, 'B', y, x)?;
                        balls.push(Ball::at_cell(x, y, color, rng));
                        x += 2;
                        continue;
                    }
                    'S' => spawners.push(Spawner::new(x, y, spawn_interval)),
                    _ => {}
                }
                x += 1;
            }
        }

        let Some(primary) = spawners.first_mut() else {
            return Err(LevelError::NoSpawner);
        };
        primary.queue.extend(queue.iter().copied());
        let interval_ticks = primary.interval_ticks;

        let wall_colors = tiles.iter().filter_map(Tile::recolor);
        rules.validate(
            balls
                .iter()
                .map(|b: &Ball| b.color)
                .chain(queue.iter().copied())
                .chain(wall_colors),
        )?;

        log::info!(
            "Board loaded: {} balls, {} holes, {} spawners, {} queued",
            balls.len(),
            holes.len(),
            spawners.len(),
            queue.len()
        );

        Ok(Self {
            width,
            height,
            tiles,
            balls,
            holes,
            spawners,
            spawn_clock: SpawnClock::new(interval_ticks),
            lines: Vec::new(),
            patrol: BorderPatrol::new(width, height),
            bounds: Bounds::default(),
            rules,
            next_line_id: 1,
        })
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        (x < self.width && y < self.height).then(|| &self.tiles[x * self.height + y])
    }

    /// All tiles, column by column
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn rules(&self) -> &ScoreRules {
        &self.rules
    }

    /// The spawner that receives the level queue and requeued balls
    pub fn primary_spawner(&self) -> Option<&Spawner> {
        self.spawners.first()
    }

    /// Seconds until the next spawn window (0 when the primary queue is empty)
    pub fn time_to_spawn(&self) -> f32 {
        let queue_empty = self.primary_spawner().is_none_or(|s| s.queue.is_empty());
        self.spawn_clock.time_to_spawn(queue_empty)
    }

    /// No balls left in play and nothing waiting in any spawner
    pub fn check_win_condition(&self) -> bool {
        self.balls.is_empty() && self.spawners.iter().all(|s| s.queue.is_empty())
    }

    /// Advance the board by one tick
    pub fn tick<R: Rng>(&mut self, dt: f32, rng: &mut R) -> TickOutcome {
        let spawned = tick_spawners(&mut self.spawn_clock, &mut self.spawners, &mut self.balls, rng);

        let mut wall_hits = 0;
        for ball in &mut self.balls {
            advance_ball(ball, &self.bounds);
            if let Some(hit) = collide_with_walls(ball, &self.tiles) {
                log::debug!("Ball bounced off wall ({}, {}) edge {}", hit.grid_x, hit.grid_y, hit.edge);
                wall_hits += 1;
            }
        }

        let captures = attraction_pass(&mut self.balls, &self.holes);
        let score_delta = self.resolve_captures(&captures);

        let won = self.check_win_condition();
        if won {
            self.patrol.advance(dt, self.width, self.height);
        }

        TickOutcome {
            spawned,
            wall_hits,
            captures,
            score_delta,
            won,
        }
    }

    /// Score captured balls, requeue mismatches, then drop every captured ball
    fn resolve_captures(&mut self, captures: &[Capture]) -> i64 {
        let mut delta = 0;
        for capture in captures {
            let color = capture.ball_color;
            if capture.matched {
                match self.rules.reward(color) {
                    Some(points) => delta += points,
                    None => log::error!("No capture reward for {}; score unchanged", color),
                }
                log::debug!("{} ball sunk in {} hole", color, capture.hole_color);
            } else {
                match self.rules.penalty(color) {
                    Some(points) => delta -= points,
                    None => log::error!("No wrong-hole penalty for {}; score unchanged", color),
                }
                match self.spawners.first_mut() {
                    Some(primary) => primary.enqueue(color),
                    None => log::error!("No spawner to requeue {} ball", color),
                }
                log::debug!("{} ball sunk in wrong ({}) hole; requeued", color, capture.hole_color);
            }
        }
        if !captures.is_empty() {
            self.balls.retain(|b| b.active);
        }
        delta
    }

    /// Store a finished drawn line. Empty lines are rejected.
    pub fn add_line(&mut self, segments: Vec<LineSegment>) -> Option<LineId> {
        if segments.is_empty() {
            log::warn!("Ignoring drawn line with no segments");
            return None;
        }
        let id = LineId(self.next_line_id);
        self.next_line_id = self.next_line_id.wrapping_add(1);
        self.lines.push(DrawnLine { id, segments });
        Some(id)
    }

    pub fn remove_line(&mut self, id: LineId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        self.lines.len() != before
    }

    /// Undo the most recent line
    pub fn remove_last_line(&mut self) -> Option<LineId> {
        self.lines.pop().map(|l| l.id)
    }

    pub fn clear_lines(&mut self) {
        self.lines.clear();
    }

    /// Bounce balls off stored lines and discard every line that was hit
    pub fn collide_lines(&mut self) -> Vec<LineId> {
        let spent = collide_lines(&mut self.balls, &self.lines);
        if !spent.is_empty() {
            self.lines.retain(|l| !spent.contains(&l.id));
        }
        spent
    }

    /// Test a line that is still being drawn. The first ball it touches
    /// bounces off its first segment; `true` means the line must be dropped.
    pub fn deflect_with_pending_line(&mut self, segments: &[LineSegment]) -> bool {
        self.balls
            .iter_mut()
            .filter(|b| b.active)
            .any(|ball| deflect_off_line(ball, segments))
    }
}

/// Colour digit following a marker at `chars[col]`
fn color_suffix(chars: &[char], marker: char, row: usize, col: usize) -> LevelResult<BallColor> {
    let Some(&found) = chars.get(col + 1).filter(|c| c.is_ascii_digit()) else {
        return Err(LevelError::MissingColorDigit { marker, row, col });
    };
    let digit = found as u8 - b'0';
    BallColor::from_index(digit).ok_or(LevelError::UnknownColor { found, row, col })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rules() -> ScoreRules {
        ScoreRules::uniform(50, 25)
    }

    fn board(rows: &[&str], queue: &[BallColor]) -> Board {
        let mut rng = Pcg32::seed_from_u64(5);
        Board::from_layout(rows, 5.0, queue, rules(), BOARD_WIDTH, BOARD_HEIGHT, &mut rng).unwrap()
    }

    fn load_err(rows: &[&str]) -> LevelError {
        let mut rng = Pcg32::seed_from_u64(5);
        Board::from_layout(rows, 5.0, &[], rules(), BOARD_WIDTH, BOARD_HEIGHT, &mut rng).unwrap_err()
    }

    #[test]
    fn test_parse_layout() {
        let b = board(&["X12 S", "H3  B2", "    4"], &[BallColor::Orange]);
        assert_eq!(b.tile(0, 0).unwrap().kind, TileKind::Wall { color: 0 });
        assert_eq!(b.tile(1, 0).unwrap().kind, TileKind::Wall { color: 1 });
        assert_eq!(b.tile(2, 0).unwrap().kind, TileKind::Wall { color: 2 });
        assert_eq!(b.tile(4, 0).unwrap().kind, TileKind::Empty);

        assert_eq!(b.holes.len(), 1);
        assert_eq!(b.holes[0].color, BallColor::Green);
        for (x, y) in [(0, 1), (1, 1), (0, 2), (1, 2)] {
            assert_eq!(b.tile(x, y).unwrap().kind, TileKind::HolePart { hole: 0 });
        }

        assert_eq!(b.balls.len(), 1);
        assert_eq!(b.balls[0].color, BallColor::Blue);
        assert_eq!(b.balls[0].pos, crate::cell_center(4, 1));
        assert_eq!(b.tile(5, 1).unwrap().kind, TileKind::Empty);
        assert_eq!(b.tile(4, 2).unwrap().kind, TileKind::Wall { color: 4 });

        assert_eq!(b.spawners.len(), 1);
        assert_eq!(b.spawners[0].queue.len(), 1);
        assert_eq!(b.spawn_clock.interval_ticks, 300);
        assert!(b.tile(BOARD_WIDTH, 0).is_none());
    }

    #[test]
    fn test_hole_covers_next_row() {
        // The '1' under the hole is part of the footprint, not a wall
        let b = board(&["S H0", "  1 X"], &[]);
        assert_eq!(b.tile(2, 1).unwrap().kind, TileKind::HolePart { hole: 0 });
        assert_eq!(b.tile(4, 1).unwrap().kind, TileKind::Wall { color: 0 });
    }

    #[test]
    fn test_marker_on_hole_footprint_is_error() {
        assert!(matches!(
            load_err(&["H1 S", " H2"]),
            LevelError::HoleOverlap { marker: 'H', row: 1, col: 1 }
        ));
        assert!(matches!(
            load_err(&["S H1", "   B3"]),
            LevelError::HoleOverlap { marker: 'B', row: 1, col: 3 }
        ));
    }

    #[test]
    fn test_queue_goes_to_first_spawner() {
        let b = board(&["S  S"], &[BallColor::Blue, BallColor::Grey]);
        assert_eq!(b.spawners.len(), 2);
        assert_eq!(b.spawners[0].queue.len(), 2);
        assert!(b.spawners[1].queue.is_empty());
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(load_err(&[]), LevelError::EmptyLayout));
        assert!(matches!(load_err(&["X X"]), LevelError::NoSpawner));
        assert!(matches!(
            load_err(&["S H"]),
            LevelError::MissingColorDigit { marker: 'H', row: 0, col: 2 }
        ));
        assert!(matches!(
            load_err(&["S B7"]),
            LevelError::UnknownColor { found: '7', .. }
        ));
        let edge = format!("S{}H1", " ".repeat(16));
        assert!(matches!(
            load_err(&[edge.as_str()]),
            LevelError::HoleOutOfBounds { row: 0, col: 17 }
        ));
    }

    #[test]
    fn test_missing_score_entry_fails_load() {
        let mut r = rules();
        r.increase.remove(&BallColor::Yellow);
        let mut rng = Pcg32::seed_from_u64(5);
        let err = Board::from_layout(&["S 4"], 5.0, &[], r, BOARD_WIDTH, BOARD_HEIGHT, &mut rng).unwrap_err();
        assert!(matches!(err, LevelError::MissingScoreEntry { color: BallColor::Yellow, .. }));
    }

    #[test]
    fn test_win_condition() {
        let mut b = board(&["S"], &[]);
        assert!(b.check_win_condition());

        b.spawners[0].enqueue(BallColor::Blue);
        assert!(!b.check_win_condition());

        b.spawners[0].queue.clear();
        b.balls.push(Ball::with_velocity(Vec2::new(100.0, 100.0), Vec2::ONE, BallColor::Blue));
        assert!(!b.check_win_condition());
    }

    #[test]
    fn test_win_condition_checks_every_spawner() {
        let mut b = board(&["S S"], &[]);
        b.spawners[1].enqueue(BallColor::Grey);
        assert!(!b.check_win_condition());
    }

    #[test]
    fn test_matching_capture_scores_and_removes() {
        let mut b = board(&["S", "", "", "", "", "", "", "", "", "", "          H2"], &[]);
        let center = b.holes[0].center;
        // Stationary ball right on the centre after moving
        b.balls.push(Ball::with_velocity(center, Vec2::ZERO, BallColor::Blue));
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = b.tick(SIM_DT, &mut rng);
        assert_eq!(outcome.captures.len(), 1);
        assert!(outcome.captures[0].matched);
        assert_eq!(outcome.score_delta, 50);
        assert!(b.balls.is_empty());
        assert!(outcome.won);
    }

    #[test]
    fn test_mismatched_capture_penalises_and_requeues() {
        let mut b = board(&["S", "", "", "", "", "", "", "", "", "", "          H2"], &[]);
        let center = b.holes[0].center;
        b.balls.push(Ball::with_velocity(center, Vec2::ZERO, BallColor::Orange));
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = b.tick(SIM_DT, &mut rng);
        assert_eq!(outcome.score_delta, -25);
        assert!(b.balls.is_empty());
        assert_eq!(b.spawners[0].queue.len(), 1);
        assert_eq!(b.spawners[0].queue.back(), Some(&BallColor::Orange));
        assert!(!outcome.won);
    }

    #[test]
    fn test_tick_moves_and_bounces() {
        let mut b = board(&["S"], &[]);
        b.balls.push(Ball::with_velocity(Vec2::new(200.0, 200.0), Vec2::new(1.0, -1.0), BallColor::Grey));
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = b.tick(SIM_DT, &mut rng);
        assert_eq!(b.balls[0].pos, Vec2::new(201.0, 199.0));
        assert_eq!(outcome.wall_hits, 0);
        assert!(!outcome.won);
    }

    #[test]
    fn test_tick_wall_bounce_then_cooldown() {
        // Wall at (5, 5); ball just above its top edge heading down-right
        let mut rows = vec![""; 6];
        rows[0] = "S";
        rows[5] = "     X";
        let mut b = board(&rows, &[]);
        b.balls.push(Ball::with_velocity(Vec2::new(175.0, 204.0), Vec2::new(1.0, 1.0), BallColor::Grey));
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = b.tick(SIM_DT, &mut rng);
        assert_eq!(outcome.wall_hits, 1);
        assert!((b.balls[0].vel - Vec2::new(1.0, -1.0)).length() < 1e-6);
        assert_eq!(b.balls[0].collision_cooldown, COLLISION_COOLDOWN_TICKS);
        b.tick(SIM_DT, &mut rng);
        assert_eq!(b.balls[0].collision_cooldown, COLLISION_COOLDOWN_TICKS - 1);
    }

    #[test]
    fn test_patrol_only_moves_when_won() {
        let mut b = board(&["S"], &[BallColor::Blue]);
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..10 {
            b.tick(SIM_DT, &mut rng);
        }
        assert_eq!(b.patrol.markers[0].grid_x, 0);

        b.spawners[0].queue.clear();
        for _ in 0..10 {
            b.tick(SIM_DT, &mut rng);
        }
        assert!(b.patrol.markers[0].grid_x > 0);
    }

    #[test]
    fn test_time_to_spawn_tracks_clock() {
        let mut b = board(&["S"], &[BallColor::Blue]);
        assert!((b.time_to_spawn() - 5.0).abs() < 1e-6);
        let mut rng = Pcg32::seed_from_u64(1);
        b.tick(SIM_DT, &mut rng);
        b.tick(SIM_DT, &mut rng);
        assert!((b.time_to_spawn() - 4.9667).abs() < 1e-3);

        b.spawners[0].queue.clear();
        assert_eq!(b.time_to_spawn(), 0.0);
    }

    #[test]
    fn test_line_management() {
        let mut b = board(&["S"], &[]);
        assert!(b.add_line(Vec::new()).is_none());
        let seg = LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        let a = b.add_line(vec![seg]).unwrap();
        let c = b.add_line(vec![seg]).unwrap();
        assert_ne!(a, c);
        assert!(b.remove_line(a));
        assert!(!b.remove_line(a));
        assert_eq!(b.remove_last_line(), Some(c));
        assert!(b.lines.is_empty());
    }

    #[test]
    fn test_line_ids_wrap() {
        let mut b = board(&["S"], &[]);
        b.next_line_id = u32::MAX;
        let seg = LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        assert_eq!(b.add_line(vec![seg]), Some(LineId(u32::MAX)));
        assert_eq!(b.add_line(vec![seg]), Some(LineId(0)));
        assert_eq!(b.lines.len(), 2);
    }

    #[test]
    fn test_collide_lines_discards_hit_line() {
        let mut b = board(&["S"], &[]);
        b.balls.push(Ball::with_velocity(Vec2::new(90.0, 200.0), Vec2::new(1.0, 0.0), BallColor::Grey));
        let hit = b
            .add_line(vec![LineSegment::new(Vec2::new(100.0, 150.0), Vec2::new(100.0, 250.0))])
            .unwrap();
        let miss = b
            .add_line(vec![LineSegment::new(Vec2::new(400.0, 400.0), Vec2::new(420.0, 400.0))])
            .unwrap();
        assert_eq!(b.collide_lines(), vec![hit]);
        assert_eq!(b.lines.len(), 1);
        assert_eq!(b.lines[0].id, miss);
        assert!(b.balls[0].vel.x < 0.0);
    }

    #[test]
    fn test_pending_line() {
        let mut b = board(&["S"], &[]);
        b.balls.push(Ball::with_velocity(Vec2::new(90.0, 200.0), Vec2::new(1.0, 0.0), BallColor::Grey));
        let far = [LineSegment::new(Vec2::new(400.0, 400.0), Vec2::new(420.0, 400.0))];
        assert!(!b.deflect_with_pending_line(&far));
        let near = [LineSegment::new(Vec2::new(100.0, 150.0), Vec2::new(100.0, 250.0))];
        assert!(b.deflect_with_pending_line(&near));
        assert!(b.balls[0].vel.x < 0.0);
    }
}
