//! Enemy pool and tile-to-tile interpolation movement.

use glam::Vec3;
use grid_defence_core::{EnemyId, EnemySnapshot, Event};

use crate::pathfinding::FlowField;

/// Simulated seconds required to traverse one tile. Enemy speed is fixed at
/// one tile per second, so tick deltas accrue directly onto progress.
const TILE_TRAVERSAL_SECS: f32 = 1.0;

/// One mobile agent following the flow field toward a destination.
#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    tile_from: usize,
    tile_to: usize,
    position_from: Vec3,
    position_to: Vec3,
    progress: f32,
    scale: f32,
}

impl Enemy {
    fn position(&self) -> Vec3 {
        self.position_from.lerp(self.position_to, self.progress)
    }
}

/// Object pool owning every live enemy.
///
/// Enemies are checked out at spawn time and returned when they run off the
/// end of the path; ownership never leaves the pool. Spare instances are
/// reused to avoid per-spawn allocation.
#[derive(Debug, Default)]
pub(crate) struct EnemyPool {
    active: Vec<Enemy>,
    spare: Vec<Enemy>,
    next_id: u32,
}

impl EnemyPool {
    /// Returns every live enemy to the spare list. Used when the board is
    /// reconfigured and all tile indices become stale.
    pub(crate) fn reset(&mut self) {
        self.spare.append(&mut self.active);
    }

    /// Number of live enemies.
    #[cfg(test)]
    pub(crate) fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Checks an enemy out of the pool onto the provided tile.
    ///
    /// The tile must have a path successor: spawn points always lie on a
    /// valid path, so a missing successor is a broken invariant.
    pub(crate) fn spawn_on(&mut self, field: &FlowField, tile: usize, scale: f32) -> EnemyId {
        let start = field.tile(tile);
        let next = start
            .next_on_path()
            .expect("enemy spawned on a tile with no path successor");

        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let mut enemy = self.spare.pop().unwrap_or_else(|| Enemy {
            id,
            tile_from: tile,
            tile_to: next,
            position_from: Vec3::ZERO,
            position_to: Vec3::ZERO,
            progress: 0.0,
            scale,
        });
        enemy.id = id;
        enemy.tile_from = tile;
        enemy.tile_to = next;
        enemy.position_from = start.position();
        enemy.position_to = start.exit_point();
        enemy.progress = 0.0;
        enemy.scale = scale;

        self.active.push(enemy);
        id
    }

    /// Advances every live enemy by the provided simulated seconds.
    ///
    /// Finished enemies are compacted out with swap-remove and returned to
    /// the spare list, emitting [`Event::EnemyExited`].
    pub(crate) fn advance(&mut self, dt: f32, field: &FlowField, out_events: &mut Vec<Event>) {
        let mut index = 0;
        while index < self.active.len() {
            if Self::advance_one(&mut self.active[index], dt, field, out_events) {
                index += 1;
            } else {
                let enemy = self.active.swap_remove(index);
                out_events.push(Event::EnemyExited { enemy: enemy.id });
                self.spare.push(enemy);
            }
        }
    }

    /// Moves one enemy forward, consuming whole tile transitions. Returns
    /// `false` once the enemy steps onto a tile with no successor.
    fn advance_one(
        enemy: &mut Enemy,
        dt: f32,
        field: &FlowField,
        out_events: &mut Vec<Event>,
    ) -> bool {
        enemy.progress += dt / TILE_TRAVERSAL_SECS;
        while enemy.progress >= 1.0 {
            let arrived = enemy.tile_to;
            let Some(next) = field.tile(arrived).next_on_path() else {
                return false;
            };
            out_events.push(Event::EnemyAdvanced {
                enemy: enemy.id,
                from: field.coord_of(enemy.tile_from),
                to: field.coord_of(arrived),
            });
            enemy.tile_from = arrived;
            enemy.tile_to = next;
            enemy.position_from = enemy.position_to;
            enemy.position_to = field.tile(arrived).exit_point();
            enemy.progress -= 1.0;
        }
        true
    }

    /// Captures a read-only snapshot of every live enemy.
    pub(crate) fn snapshots(&self, field: &FlowField) -> Vec<EnemySnapshot> {
        self.active
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                tile_from: field.coord_of(enemy.tile_from),
                tile_to: field.coord_of(enemy.tile_to),
                position: enemy.position(),
                progress: enemy.progress,
                scale: enemy.scale,
            })
            .collect()
    }

    #[cfg(test)]
    fn spare_len(&self) -> usize {
        self.spare.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_defence_core::{BoardSize, GridCoord};

    fn straight_field() -> FlowField {
        // 1x5 strip is below the world's minimum board size but exercises
        // the pool in isolation; destination sits at the far end.
        let mut field = FlowField::new(BoardSize::new(5, 1));
        assert!(field.rebuild(|index| index == 4, |_| false));
        field
    }

    #[test]
    fn spawn_initializes_interpolation_endpoints() {
        let field = straight_field();
        let mut pool = EnemyPool::default();
        let id = pool.spawn_on(&field, 0, 1.0);

        assert_eq!(id, EnemyId::new(0));
        let snapshot = &pool.snapshots(&field)[0];
        assert_eq!(snapshot.position, field.tile(0).position());
        assert_eq!(snapshot.tile_from, GridCoord::new(0, 0));
        assert_eq!(snapshot.tile_to, GridCoord::new(1, 0));
    }

    #[test]
    fn whole_second_consumes_one_transition() {
        let field = straight_field();
        let mut pool = EnemyPool::default();
        let _ = pool.spawn_on(&field, 0, 1.0);

        let mut events = Vec::new();
        pool.advance(1.0, &field, &mut events);

        assert_eq!(
            events,
            vec![Event::EnemyAdvanced {
                enemy: EnemyId::new(0),
                from: GridCoord::new(0, 0),
                to: GridCoord::new(1, 0),
            }]
        );
        let snapshot = &pool.snapshots(&field)[0];
        assert_eq!(snapshot.tile_from, GridCoord::new(1, 0));
        assert!(snapshot.progress.abs() < f32::EPSILON);
    }

    #[test]
    fn enemy_exits_when_the_path_runs_out() {
        let field = straight_field();
        let mut pool = EnemyPool::default();
        // Two transitions away: the first tick lands one tile short, the
        // second steps onto the destination and finds no successor.
        let id = pool.spawn_on(&field, 2, 1.0);

        let mut events = Vec::new();
        pool.advance(1.0, &field, &mut events);
        assert_eq!(pool.active_len(), 1);

        events.clear();
        pool.advance(1.0, &field, &mut events);
        assert_eq!(events, vec![Event::EnemyExited { enemy: id }]);
        assert_eq!(pool.active_len(), 0);
        assert_eq!(pool.spare_len(), 1);
    }

    #[test]
    fn pool_reuses_reclaimed_instances_with_fresh_ids() {
        let field = straight_field();
        let mut pool = EnemyPool::default();
        let first = pool.spawn_on(&field, 3, 1.0);

        let mut events = Vec::new();
        pool.advance(2.0, &field, &mut events);
        assert_eq!(pool.active_len(), 0);

        let second = pool.spawn_on(&field, 0, 0.5);
        assert_ne!(first, second);
        assert_eq!(pool.spare_len(), 0, "spare instance was checked out again");
    }

    #[test]
    fn fractional_progress_interpolates_toward_exit_point() {
        let field = straight_field();
        let mut pool = EnemyPool::default();
        let _ = pool.spawn_on(&field, 0, 1.0);

        let mut events = Vec::new();
        pool.advance(0.5, &field, &mut events);
        assert!(events.is_empty());

        let snapshot = &pool.snapshots(&field)[0];
        let expected = field
            .tile(0)
            .position()
            .lerp(field.tile(0).exit_point(), 0.5);
        assert_eq!(snapshot.position, expected);
    }
}
