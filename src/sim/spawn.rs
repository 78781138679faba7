//! Spawn scheduling
//!
//! One global clock counts ticks since the last spawn window. When it reaches
//! the interval a single spawner is drawn uniformly at random; it emits the
//! front of its queue, or nothing if its queue is empty. Either way the window
//! is consumed and the clock starts over.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Ball, BallColor, Spawner};
use crate::consts::TICK_RATE;

/// Global spawn clock shared by all spawners on a board
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpawnClock {
    pub interval_ticks: u32,
    pub elapsed_ticks: u32,
}

/// A ball emitted this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnEvent {
    pub spawner: usize,
    pub color: BallColor,
}

impl SpawnClock {
    pub fn new(interval_ticks: u32) -> Self {
        Self {
            interval_ticks,
            elapsed_ticks: 0,
        }
    }

    /// Seconds until the next window, or 0 when nothing is waiting
    pub fn time_to_spawn(&self, queue_empty: bool) -> f32 {
        if queue_empty {
            return 0.0;
        }
        let remaining = self.interval_ticks as f32 - self.elapsed_ticks as f32;
        (remaining / TICK_RATE as f32).max(0.0)
    }
}

/// Advance the spawn clock by one tick, possibly emitting one ball
pub fn tick_spawners<R: Rng>(
    clock: &mut SpawnClock,
    spawners: &mut [Spawner],
    balls: &mut Vec<Ball>,
    rng: &mut R,
) -> Option<SpawnEvent> {
    if spawners.is_empty() {
        log::error!("Spawn tick with no spawners; skipping");
        return None;
    }

    clock.elapsed_ticks += 1;
    for spawner in spawners.iter_mut() {
        spawner.firing = false;
        spawner.ticks_since_fire = spawner.ticks_since_fire.saturating_add(1);
    }

    if clock.elapsed_ticks < clock.interval_ticks {
        return None;
    }
    clock.elapsed_ticks = 0;

    let index = rng.random_range(0..spawners.len());
    let spawner = &mut spawners[index];
    let Some(color) = spawner.queue.pop_front() else {
        log::debug!("Spawn window missed: spawner {} has an empty queue", index);
        return None;
    };

    balls.push(Ball::new(spawner.pos, color, rng));
    spawner.ticks_since_fire = 0;
    spawner.firing = true;
    log::info!("Spawner {} emitted a {} ball", index, color);

    Some(SpawnEvent {
        spawner: index,
        color,
    })
}
