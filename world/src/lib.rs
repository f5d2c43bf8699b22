#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Grid Defence.

mod content;
mod enemies;
mod pathfinding;

use grid_defence_core::{BoardSize, Command, EditError, Event, GridCoord, TileContentKind};

use content::{TileContent, DEFAULT_TOWER_RANGE};
use enemies::EnemyPool;
use pathfinding::FlowField;

const DEFAULT_BOARD_SIZE: BoardSize = BoardSize::new(11, 11);

/// Smallest permitted board axis. Smaller requests are clamped up so that the
/// default destination and spawn point never collide.
const MIN_BOARD_AXIS: u32 = 2;

/// Represents the authoritative Grid Defence board state.
#[derive(Debug)]
pub struct World {
    size: BoardSize,
    contents: Vec<TileContent>,
    spawn_points: Vec<GridCoord>,
    towers: Vec<GridCoord>,
    field: FlowField,
    enemies: EnemyPool,
}

impl World {
    /// Creates a new Grid Defence world ready for simulation.
    #[must_use]
    pub fn new() -> Self {
        let mut world = Self {
            size: DEFAULT_BOARD_SIZE,
            contents: Vec::new(),
            spawn_points: Vec::new(),
            towers: Vec::new(),
            field: FlowField::default(),
            enemies: EnemyPool::default(),
        };
        world.configure(DEFAULT_BOARD_SIZE);
        world
    }

    /// Rebuilds the board wholesale: all tiles empty, the center tile a
    /// destination, tile zero a spawn point, paths recomputed once.
    fn configure(&mut self, size: BoardSize) {
        let size = BoardSize::new(
            size.width().max(MIN_BOARD_AXIS),
            size.height().max(MIN_BOARD_AXIS),
        );
        self.size = size;
        self.field = FlowField::new(size);
        self.contents = vec![TileContent::Empty; size.area() as usize];
        self.spawn_points.clear();
        self.towers.clear();
        self.enemies.reset();

        let center = self.contents.len() / 2;
        self.contents[center] = TileContent::Destination;
        self.contents[0] = TileContent::SpawnPoint;
        self.spawn_points.push(GridCoord::new(0, 0));

        let valid = self.rebuild_paths();
        debug_assert!(valid, "an empty board always has a valid path graph");
    }

    fn rebuild_paths(&mut self) -> bool {
        let contents = &self.contents;
        self.field.rebuild(
            |index| contents[index].kind() == TileContentKind::Destination,
            |index| contents[index].blocks_path(),
        )
    }

    fn tile_index(&self, tile: GridCoord) -> Option<usize> {
        self.size
            .contains(tile)
            .then(|| (tile.x() + tile.y() * self.size.width()) as usize)
    }

    fn toggle_wall(&mut self, tile: GridCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.tile_index(tile) else {
            out_events.push(Event::EditRejected {
                tile,
                reason: EditError::OutOfBounds,
            });
            return;
        };

        match self.contents[index] {
            TileContent::Wall => {
                self.contents[index] = TileContent::Empty;
                let _ = self.rebuild_paths();
                out_events.push(Event::TileChanged {
                    tile,
                    content: TileContentKind::Empty,
                });
            }
            TileContent::Empty => {
                self.contents[index] = TileContent::Wall;
                if self.rebuild_paths() {
                    out_events.push(Event::TileChanged {
                        tile,
                        content: TileContentKind::Wall,
                    });
                } else {
                    self.contents[index] = TileContent::Empty;
                    let _ = self.rebuild_paths();
                    out_events.push(Event::EditRejected {
                        tile,
                        reason: EditError::PathBlocked,
                    });
                }
            }
            _ => {}
        }
    }

    fn toggle_destination(&mut self, tile: GridCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.tile_index(tile) else {
            out_events.push(Event::EditRejected {
                tile,
                reason: EditError::OutOfBounds,
            });
            return;
        };

        match self.contents[index] {
            TileContent::Destination => {
                self.contents[index] = TileContent::Empty;
                if self.rebuild_paths() {
                    out_events.push(Event::TileChanged {
                        tile,
                        content: TileContentKind::Empty,
                    });
                } else {
                    self.contents[index] = TileContent::Destination;
                    let _ = self.rebuild_paths();
                    out_events.push(Event::EditRejected {
                        tile,
                        reason: EditError::PathBlocked,
                    });
                }
            }
            TileContent::Empty => {
                self.contents[index] = TileContent::Destination;
                let _ = self.rebuild_paths();
                out_events.push(Event::TileChanged {
                    tile,
                    content: TileContentKind::Destination,
                });
            }
            _ => {}
        }
    }

    fn toggle_spawn_point(&mut self, tile: GridCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.tile_index(tile) else {
            out_events.push(Event::EditRejected {
                tile,
                reason: EditError::OutOfBounds,
            });
            return;
        };

        match self.contents[index] {
            TileContent::SpawnPoint => {
                if self.spawn_points.len() == 1 {
                    out_events.push(Event::EditRejected {
                        tile,
                        reason: EditError::LastSpawnPoint,
                    });
                    return;
                }
                self.contents[index] = TileContent::Empty;
                if let Some(position) = self.spawn_points.iter().position(|point| *point == tile) {
                    let _ = self.spawn_points.remove(position);
                }
                out_events.push(Event::TileChanged {
                    tile,
                    content: TileContentKind::Empty,
                });
            }
            TileContent::Empty => {
                self.contents[index] = TileContent::SpawnPoint;
                self.spawn_points.push(tile);
                out_events.push(Event::TileChanged {
                    tile,
                    content: TileContentKind::SpawnPoint,
                });
            }
            _ => {}
        }
    }

    fn toggle_tower(&mut self, tile: GridCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.tile_index(tile) else {
            out_events.push(Event::EditRejected {
                tile,
                reason: EditError::OutOfBounds,
            });
            return;
        };

        match self.contents[index] {
            TileContent::Tower { .. } => {
                self.contents[index] = TileContent::Empty;
                if let Some(position) = self.towers.iter().position(|point| *point == tile) {
                    let _ = self.towers.remove(position);
                }
                let _ = self.rebuild_paths();
                out_events.push(Event::TileChanged {
                    tile,
                    content: TileContentKind::Empty,
                });
            }
            TileContent::Empty => {
                self.contents[index] = TileContent::Tower {
                    range: DEFAULT_TOWER_RANGE,
                };
                if self.rebuild_paths() {
                    self.towers.push(tile);
                    out_events.push(Event::TileChanged {
                        tile,
                        content: TileContentKind::Tower,
                    });
                } else {
                    self.contents[index] = TileContent::Empty;
                    let _ = self.rebuild_paths();
                    out_events.push(Event::EditRejected {
                        tile,
                        reason: EditError::PathBlocked,
                    });
                }
            }
            // A wall already proved it does not disconnect the graph and
            // towers share its blocking semantics, so no rebuild is needed.
            TileContent::Wall => {
                self.contents[index] = TileContent::Tower {
                    range: DEFAULT_TOWER_RANGE,
                };
                self.towers.push(tile);
                out_events.push(Event::TileChanged {
                    tile,
                    content: TileContentKind::Tower,
                });
            }
            _ => {}
        }
    }

    fn spawn_enemy(&mut self, spawn_point: GridCoord, scale: f32, out_events: &mut Vec<Event>) {
        let Some(index) = self.tile_index(spawn_point) else {
            return;
        };
        if self.contents[index].kind() != TileContentKind::SpawnPoint {
            return;
        }
        let enemy = self.enemies.spawn_on(&self.field, index, scale);
        out_events.push(Event::EnemySpawned {
            enemy,
            tile: spawn_point,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBoard { size } => {
            world.configure(size);
        }
        Command::ToggleWall { tile } => world.toggle_wall(tile, out_events),
        Command::ToggleDestination { tile } => world.toggle_destination(tile, out_events),
        Command::ToggleSpawnPoint { tile } => world.toggle_spawn_point(tile, out_events),
        Command::ToggleTower { tile } => world.toggle_tower(tile, out_events),
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world
                .enemies
                .advance(dt.as_secs_f32(), &world.field, out_events);
        }
        Command::SpawnEnemy { spawn_point, scale } => {
            world.spawn_enemy(spawn_point, scale, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec3;
    use grid_defence_core::{
        BoardSize, EnemyView, GridCoord, TileSnapshot, TileView, TowerSnapshot, TowerView,
    };

    use super::{TileContent, World};

    /// Dimensions of the configured board.
    #[must_use]
    pub fn board_size(world: &World) -> BoardSize {
        world.size
    }

    /// Captures a read-only view of every tile in row-major order.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView {
        let snapshots = (0..world.contents.len())
            .map(|index| {
                let tile = world.field.tile(index);
                TileSnapshot {
                    tile: world.field.coord_of(index),
                    content: world.contents[index].kind(),
                    distance: tile.distance(),
                    next_on_path: tile.next_on_path().map(|next| world.field.coord_of(next)),
                    position: tile.position(),
                    exit_point: tile.exit_point(),
                }
            })
            .collect();
        TileView::from_snapshots(world.size, snapshots)
    }

    /// Maps a continuous board-plane point to the tile that contains it.
    ///
    /// The board is centered on the origin of the XZ plane; points outside
    /// the grid yield `None`.
    #[must_use]
    pub fn tile_at(world: &World, point: Vec3) -> Option<GridCoord> {
        let x = (point.x + world.size.width() as f32 * 0.5).floor();
        let y = (point.z + world.size.height() as f32 * 0.5).floor();
        if x < 0.0 || y < 0.0 || x >= world.size.width() as f32 || y >= world.size.height() as f32 {
            return None;
        }
        Some(GridCoord::new(x as u32, y as u32))
    }

    /// Ordered registry of spawn-point tiles. Never empty after configuration.
    #[must_use]
    pub fn spawn_points(world: &World) -> &[GridCoord] {
        &world.spawn_points
    }

    /// Spawn point at the provided registry index, if present.
    #[must_use]
    pub fn spawn_point(world: &World, index: usize) -> Option<GridCoord> {
        world.spawn_points.get(index).copied()
    }

    /// Captures a read-only view of every tower in placement order.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let mut snapshots = Vec::with_capacity(world.towers.len());
        for &tile in &world.towers {
            let Some(index) = world.tile_index(tile) else {
                continue;
            };
            if let TileContent::Tower { range } = world.contents[index] {
                snapshots.push(TowerSnapshot {
                    tile,
                    position: world.field.tile(index).position(),
                    range,
                });
            }
        }
        TowerView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the enemies inhabiting the board.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.snapshots(&world.field))
    }
}
