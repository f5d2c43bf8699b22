#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use std::time::Duration;

use grid_defence_core::{Command, Event, GridCoord};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;
const SPAWN_SCALES: [f32; 4] = [1.0, 0.5, 1.5, 0.75];

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
        }
    }
}

/// Pure system that deterministically emits spawn commands.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    accumulator: Duration,
    rng_state: u64,
    scale_index: usize,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            rng_state: config.rng_seed,
            scale_index: 0,
        }
    }

    /// Consumes events and immutable views to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], spawn_points: &[GridCoord], out: &mut Vec<Command>) {
        if self.spawn_interval.is_zero() || spawn_points.is_empty() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let spawn_attempts = self.resolve_spawn_attempts();

        for _ in 0..spawn_attempts {
            let spawn_point = self.select_spawn_point(spawn_points);
            let scale = self.next_scale();
            out.push(Command::SpawnEnemy { spawn_point, scale });
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.spawn_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn select_spawn_point(&mut self, spawn_points: &[GridCoord]) -> GridCoord {
        debug_assert!(
            !spawn_points.is_empty(),
            "select_spawn_point requires spawn points"
        );
        let value = self.advance_rng();
        let index = (value % spawn_points.len() as u64) as usize;
        spawn_points[index]
    }

    fn advance_rng(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state
    }

    fn next_scale(&mut self) -> f32 {
        let scale = SPAWN_SCALES[self.scale_index % SPAWN_SCALES.len()];
        self.scale_index = (self.scale_index + 1) % SPAWN_SCALES.len();
        scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_spawn_attempts_without_interval() {
        let mut spawning = Spawning::new(Config::new(Duration::ZERO, 1));
        spawning.accumulator = Duration::from_secs(10);
        assert_eq!(spawning.resolve_spawn_attempts(), 0);
    }

    #[test]
    fn scales_cycle_through_the_fixed_palette() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), 7));
        let produced: Vec<f32> = (0..6).map(|_| spawning.next_scale()).collect();
        assert_eq!(produced, vec![1.0, 0.5, 1.5, 0.75, 1.0, 0.5]);
    }
}
