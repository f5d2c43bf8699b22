#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stateful targeting system that locks towers onto enemies.
//!
//! Each tower holds at most one lock. Locks are sticky: a tracked enemy is
//! followed until it leaves the tower's tracking radius or vanishes, even
//! when a closer candidate walks by. Acquisition scans the enemy view in id
//! order, so replaying the same snapshots yields the same assignments.

use glam::Vec3;
use grid_defence_core::{EnemyId, EnemySnapshot, EnemyView, GridCoord, TowerTarget, TowerView};

/// Extra tracking reach granted per unit of enemy scale. A locked enemy is
/// followed slightly beyond acquisition range before the lock breaks.
const TRACK_SLACK_PER_SCALE: f32 = 0.125;

/// Height of the acquisition capsule above the tower base.
const CAPSULE_HEIGHT: f32 = 2.0;

/// Tower targeting system that remembers per-tower locks between frames.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    locks: Vec<Lock>,
}

impl TowerTargeting {
    /// Creates a new targeting system with no locks held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Stale locks (vanished towers or enemies, or enemies that
    /// walked out of tracking range) are released before new ones are
    /// acquired.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        self.locks
            .retain(|lock| towers.iter().any(|tower| tower.tile == lock.tower));

        for tower in towers.iter() {
            let held = self.lock_index(tower.tile);

            let target = match held {
                Some(index) => {
                    let lock = self.locks[index];
                    match enemies.iter().find(|enemy| enemy.id == lock.enemy) {
                        Some(enemy) if tracks(tower.position, tower.range, enemy) => Some(enemy),
                        _ => {
                            let _ = self.locks.swap_remove(index);
                            None
                        }
                    }
                }
                None => None,
            };

            let target = match target {
                Some(enemy) => Some(enemy),
                None => {
                    let acquired = enemies
                        .iter()
                        .find(|enemy| acquires(tower.position, tower.range, enemy));
                    if let Some(enemy) = acquired {
                        self.locks.push(Lock {
                            tower: tower.tile,
                            enemy: enemy.id,
                        });
                    }
                    acquired
                }
            };

            if let Some(enemy) = target {
                out.push(TowerTarget {
                    tower: tower.tile,
                    enemy: enemy.id,
                    target_point: enemy.target_point(),
                });
            }
        }
    }

    fn lock_index(&self, tower: GridCoord) -> Option<usize> {
        self.locks.iter().position(|lock| lock.tower == tower)
    }
}

/// Sticky tracking test: planar distance against range plus per-scale slack.
/// An enemy sitting exactly on the boundary keeps the lock.
fn tracks(tower_position: Vec3, range: f32, enemy: &EnemySnapshot) -> bool {
    let slack = range + TRACK_SLACK_PER_SCALE * enemy.scale;
    let target = enemy.target_point();
    let dx = target.x - tower_position.x;
    let dz = target.z - tower_position.z;
    dx * dx + dz * dz <= slack * slack
}

/// Acquisition test: the enemy's target point must touch the vertical
/// capsule of the tower's range, anchored from the base to
/// [`CAPSULE_HEIGHT`] above it.
fn acquires(tower_position: Vec3, range: f32, enemy: &EnemySnapshot) -> bool {
    let target = enemy.target_point();
    let clamped_y = target
        .y
        .clamp(tower_position.y, tower_position.y + CAPSULE_HEIGHT);
    let nearest = Vec3::new(tower_position.x, clamped_y, tower_position.z);
    target.distance_squared(nearest) <= range * range
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Lock {
    tower: GridCoord,
    enemy: EnemyId,
}
