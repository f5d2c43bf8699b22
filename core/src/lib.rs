#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the board with the provided dimensions.
    ConfigureBoard {
        /// Grid dimensions measured in whole tiles.
        size: BoardSize,
    },
    /// Flips a tile between empty ground and a wall.
    ToggleWall {
        /// Coordinate of the tile to edit.
        tile: GridCoord,
    },
    /// Flips a tile between empty ground and a destination.
    ToggleDestination {
        /// Coordinate of the tile to edit.
        tile: GridCoord,
    },
    /// Flips a tile between empty ground and a spawn point.
    ToggleSpawnPoint {
        /// Coordinate of the tile to edit.
        tile: GridCoord,
    },
    /// Cycles a tile through the tower transitions (empty, wall, tower).
    ToggleTower {
        /// Coordinate of the tile to edit.
        tile: GridCoord,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an enemy enter the board at a spawn point.
    SpawnEnemy {
        /// Spawn-point tile where the enemy appears.
        spawn_point: GridCoord,
        /// Visual scale assigned to the enemy.
        scale: f32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a tile edit took effect.
    TileChanged {
        /// Coordinate of the edited tile.
        tile: GridCoord,
        /// Content occupying the tile after the edit.
        content: TileContentKind,
    },
    /// Reports that a tile edit was rejected and rolled back.
    EditRejected {
        /// Coordinate the rejected edit addressed.
        tile: GridCoord,
        /// Specific reason the edit failed.
        reason: EditError,
    },
    /// Confirms that an enemy entered the board.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Spawn-point tile where the enemy appeared.
        tile: GridCoord,
    },
    /// Confirms that an enemy completed a tile transition.
    EnemyAdvanced {
        /// Identifier of the enemy that advanced.
        enemy: EnemyId,
        /// Tile the enemy occupied before the transition.
        from: GridCoord,
        /// Tile the enemy occupies after the transition.
        to: GridCoord,
    },
    /// Reports that an enemy ran off the end of the path and was reclaimed.
    EnemyExited {
        /// Identifier of the reclaimed enemy.
        enemy: EnemyId,
    },
}

/// Reasons a tile edit may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum EditError {
    /// The coordinate lies outside the configured board.
    #[error("tile coordinate lies outside the board")]
    OutOfBounds,
    /// The edit would leave part of the board unable to reach a destination.
    #[error("edit would disconnect the board from every destination")]
    PathBlocked,
    /// The edit would remove the only spawn point on the board.
    #[error("at least one spawn point must remain on the board")]
    LastSpawnPoint,
}

/// Location of a single board tile expressed as x and y coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: u32,
    y: u32,
}

impl GridCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Dimensions of the board measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSize {
    width: u32,
    height: u32,
}

impl BoardSize {
    /// Creates a new board size descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of tile columns on the board.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows on the board.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles on the board.
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Reports whether the coordinate addresses a tile on this board.
    #[must_use]
    pub const fn contains(&self, tile: GridCoord) -> bool {
        tile.x() < self.width && tile.y() < self.height
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Role occupying a tile, reduced to its variant tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileContentKind {
    /// Open ground with no occupant.
    Empty,
    /// Solid wall that blocks traversal.
    Wall,
    /// Flow-field root that enemies walk toward.
    Destination,
    /// Entry tile where enemies appear.
    SpawnPoint,
    /// Placed tower; blocks traversal like a wall and targets enemies.
    Tower,
}

impl TileContentKind {
    /// Reports whether content of this kind blocks path traversal.
    ///
    /// Walls and towers share blocking semantics; every other variant is
    /// walkable.
    #[must_use]
    pub const fn blocks_path(self) -> bool {
        matches!(self, Self::Wall | Self::Tower)
    }
}

/// Immutable representation of a single tile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSnapshot {
    /// Coordinate of the tile on the board.
    pub tile: GridCoord,
    /// Content occupying the tile.
    pub content: TileContentKind,
    /// Breadth-first depth from the nearest destination, if reachable.
    pub distance: Option<u32>,
    /// Path successor the tile feeds into, if any.
    pub next_on_path: Option<GridCoord>,
    /// World-space position of the tile center.
    pub position: Vec3,
    /// World-space point enemies aim for when leaving the tile.
    pub exit_point: Vec3,
}

/// Read-only snapshot describing every tile on the board in row-major order.
#[derive(Clone, Debug, Default)]
pub struct TileView {
    size: Option<BoardSize>,
    snapshots: Vec<TileSnapshot>,
}

impl TileView {
    /// Creates a new tile view from row-major snapshots.
    #[must_use]
    pub fn from_snapshots(size: BoardSize, snapshots: Vec<TileSnapshot>) -> Self {
        debug_assert_eq!(snapshots.len(), size.area() as usize);
        Self {
            size: Some(size),
            snapshots,
        }
    }

    /// Returns the snapshot for the provided coordinate, if on the board.
    #[must_use]
    pub fn tile(&self, tile: GridCoord) -> Option<&TileSnapshot> {
        let size = self.size?;
        if !size.contains(tile) {
            return None;
        }
        let index = (tile.x() + tile.y() * size.width()) as usize;
        self.snapshots.get(index)
    }

    /// Iterator over the captured tile snapshots in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &TileSnapshot> {
        self.snapshots.iter()
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Tile the enemy is currently leaving.
    pub tile_from: GridCoord,
    /// Tile the enemy is interpolating toward.
    pub tile_to: GridCoord,
    /// World-space position interpolated for the current frame.
    pub position: Vec3,
    /// Fraction of the current tile traversal completed, in [0, 1).
    pub progress: f32,
    /// Visual scale assigned to the enemy at spawn time.
    pub scale: f32,
}

impl EnemySnapshot {
    /// World-space point towers aim at, raised off the ground with scale.
    #[must_use]
    pub fn target_point(&self) -> Vec3 {
        self.position + Vec3::Y * (0.5 * self.scale)
    }
}

/// Read-only snapshot describing all enemies on the board.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots, sorted by id.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single tower used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Tile the tower occupies.
    pub tile: GridCoord,
    /// World-space position of the tower base.
    pub position: Vec3,
    /// Targeting radius measured in world units.
    pub range: f32,
}

/// Read-only snapshot describing all towers in registration order.
///
/// Unlike [`EnemyView`] the snapshots are not sorted: the world registers
/// towers in placement order and per-frame updates honor that order.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view preserving the provided registry order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<TowerSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }
}

/// Target lock resolved by the targeting system for a single tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tile of the tower holding the lock.
    pub tower: GridCoord,
    /// Enemy the tower is locked onto.
    pub enemy: EnemyId,
    /// World-space point the tower is tracking.
    pub target_point: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = GridCoord::new(1, 1);
        let destination = GridCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn only_walls_and_towers_block_paths() {
        assert!(TileContentKind::Wall.blocks_path());
        assert!(TileContentKind::Tower.blocks_path());
        assert!(!TileContentKind::Empty.blocks_path());
        assert!(!TileContentKind::Destination.blocks_path());
        assert!(!TileContentKind::SpawnPoint.blocks_path());
    }

    #[test]
    fn board_size_bounds_check_rejects_edges() {
        let size = BoardSize::new(3, 2);
        assert!(size.contains(GridCoord::new(2, 1)));
        assert!(!size.contains(GridCoord::new(3, 1)));
        assert!(!size.contains(GridCoord::new(2, 2)));
    }

    #[test]
    fn edit_error_round_trips_through_bincode() {
        let bytes = bincode::serialize(&EditError::PathBlocked).expect("serialize");
        let restored: EditError = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, EditError::PathBlocked);
    }

    #[test]
    fn target_point_rises_with_scale() {
        let snapshot = EnemySnapshot {
            id: EnemyId::new(1),
            tile_from: GridCoord::new(0, 0),
            tile_to: GridCoord::new(1, 0),
            position: Vec3::new(2.0, 0.0, 3.0),
            progress: 0.5,
            scale: 1.5,
        };
        assert_eq!(snapshot.target_point(), Vec3::new(2.0, 0.75, 3.0));
    }

    #[test]
    fn tile_view_addresses_row_major_snapshots() {
        let size = BoardSize::new(2, 2);
        let snapshots: Vec<TileSnapshot> = (0..4)
            .map(|index| TileSnapshot {
                tile: GridCoord::new(index % 2, index / 2),
                content: TileContentKind::Empty,
                distance: Some(index),
                next_on_path: None,
                position: Vec3::ZERO,
                exit_point: Vec3::ZERO,
            })
            .collect();
        let view = TileView::from_snapshots(size, snapshots);

        let snapshot = view.tile(GridCoord::new(1, 1)).expect("tile on board");
        assert_eq!(snapshot.distance, Some(3));
        assert!(view.tile(GridCoord::new(2, 0)).is_none());
    }
}
