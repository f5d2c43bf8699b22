//! Flow-field builder used by the world crate.

use std::collections::VecDeque;

use glam::Vec3;
use grid_defence_core::{BoardSize, GridCoord};

/// Cardinal neighbor slots wired once at field construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    const fn slot(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }
}

const PRIMARY_ORDER: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];

const ALTERNATE_ORDER: [Direction; 4] = [
    Direction::West,
    Direction::East,
    Direction::South,
    Direction::North,
];

/// Path state carried by a single tile of the flow field.
#[derive(Clone, Debug)]
pub(crate) struct PathTile {
    position: Vec3,
    neighbors: [Option<usize>; 4],
    alternative: bool,
    distance: Option<u32>,
    next_on_path: Option<usize>,
    exit_point: Vec3,
}

impl PathTile {
    /// World-space position of the tile center.
    pub(crate) fn position(&self) -> Vec3 {
        self.position
    }

    /// Breadth-first depth from the nearest destination, if reachable.
    pub(crate) fn distance(&self) -> Option<u32> {
        self.distance
    }

    /// Index of the path successor the tile feeds into, if any.
    pub(crate) fn next_on_path(&self) -> Option<usize> {
        self.next_on_path
    }

    /// World-space point enemies aim for when leaving the tile.
    pub(crate) fn exit_point(&self) -> Vec3 {
        self.exit_point
    }

    fn become_destination(&mut self) {
        self.distance = Some(0);
        self.next_on_path = None;
        self.exit_point = self.position;
    }

    fn clear_path(&mut self) {
        self.distance = None;
        self.next_on_path = None;
        self.exit_point = self.position;
    }
}

/// Dense per-tile path graph seeded from the destination tiles.
///
/// The grid topology is wired once per board configuration; every rebuild
/// recomputes distances, successors, and exit points wholesale with a
/// multi-source breadth-first search. The frontier queue is reused across
/// rebuilds.
#[derive(Debug, Default)]
pub(crate) struct FlowField {
    size: Option<BoardSize>,
    tiles: Vec<PathTile>,
    frontier: VecDeque<usize>,
}

impl FlowField {
    /// Builds the tile grid for the provided board size.
    ///
    /// Tiles are laid out in row-major order, neighbor links never wrap
    /// around the board edges, and the parity flag follows the checkerboard
    /// pattern `(x % 2 == 0) XOR (y % 2 == 0)` so that breadth-first
    /// expansion order varies between adjacent tiles.
    pub(crate) fn new(size: BoardSize) -> Self {
        let width = size.width();
        let height = size.height();
        let offset_x = (width.saturating_sub(1)) as f32 * 0.5;
        let offset_y = (height.saturating_sub(1)) as f32 * 0.5;

        let mut tiles = Vec::with_capacity(size.area() as usize);
        for y in 0..height {
            for x in 0..width {
                let index = (x + y * width) as usize;
                let mut neighbors = [None; 4];
                if y + 1 < height {
                    neighbors[Direction::North.slot()] = Some(index + width as usize);
                }
                if x + 1 < width {
                    neighbors[Direction::East.slot()] = Some(index + 1);
                }
                if y > 0 {
                    neighbors[Direction::South.slot()] = Some(index - width as usize);
                }
                if x > 0 {
                    neighbors[Direction::West.slot()] = Some(index - 1);
                }

                let position = Vec3::new(x as f32 - offset_x, 0.0, y as f32 - offset_y);
                tiles.push(PathTile {
                    position,
                    neighbors,
                    alternative: (x % 2 == 0) != (y % 2 == 0),
                    distance: None,
                    next_on_path: None,
                    exit_point: position,
                });
            }
        }

        Self {
            size: Some(size),
            tiles,
            frontier: VecDeque::new(),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Borrow of the tile state at the provided index.
    pub(crate) fn tile(&self, index: usize) -> &PathTile {
        &self.tiles[index]
    }

    /// Maps a tile index back to its board coordinate.
    pub(crate) fn coord_of(&self, index: usize) -> GridCoord {
        let width = self.size.map_or(0, |size| size.width()).max(1);
        GridCoord::new(index as u32 % width, index as u32 / width)
    }

    /// Recomputes the path graph from scratch.
    ///
    /// Destination tiles become breadth-first roots; the search then grows
    /// edges from each dequeued tile into unvisited, non-blocking neighbors,
    /// alternating the expansion order on the tile's parity flag. Returns
    /// `false` when no destination exists or when any non-blocking tile is
    /// left without a distance, which signals the caller to roll back the
    /// edit that triggered the rebuild.
    pub(crate) fn rebuild<D, B>(&mut self, mut is_destination: D, mut is_blocked: B) -> bool
    where
        D: FnMut(usize) -> bool,
        B: FnMut(usize) -> bool,
    {
        self.frontier.clear();
        for index in 0..self.tiles.len() {
            if is_destination(index) {
                self.tiles[index].become_destination();
                self.frontier.push_back(index);
            } else {
                self.tiles[index].clear_path();
            }
        }

        if self.frontier.is_empty() {
            return false;
        }

        while let Some(index) = self.frontier.pop_front() {
            let order = if self.tiles[index].alternative {
                PRIMARY_ORDER
            } else {
                ALTERNATE_ORDER
            };
            for direction in order {
                if let Some(grown) = self.grow_path(index, direction, &mut is_blocked) {
                    self.frontier.push_back(grown);
                }
            }
        }

        (0..self.tiles.len()).all(|index| is_blocked(index) || self.tiles[index].distance.is_some())
    }

    /// Attempts to grow a path edge from the neighbor in `direction` back
    /// into `from`. Succeeds only for unvisited, non-blocking neighbors.
    fn grow_path<B>(&mut self, from: usize, direction: Direction, is_blocked: &mut B) -> Option<usize>
    where
        B: FnMut(usize) -> bool,
    {
        let distance = self.tiles[from].distance?;
        let neighbor = self.tiles[from].neighbors[direction.slot()]?;
        if self.tiles[neighbor].distance.is_some() || is_blocked(neighbor) {
            return None;
        }

        let from_position = self.tiles[from].position;
        let tile = &mut self.tiles[neighbor];
        tile.distance = Some(distance + 1);
        tile.next_on_path = Some(from);
        tile.exit_point = (tile.position + from_position) * 0.5;
        Some(neighbor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_3x4() -> FlowField {
        FlowField::new(BoardSize::new(3, 4))
    }

    /// Plain queue-order BFS used as an order-independent distance oracle.
    fn reference_distances(
        size: BoardSize,
        destinations: &[usize],
        blocked: &[usize],
    ) -> Vec<Option<u32>> {
        let width = size.width() as usize;
        let count = size.area() as usize;
        let mut distances: Vec<Option<u32>> = vec![None; count];
        let mut queue = VecDeque::new();
        for &root in destinations {
            distances[root] = Some(0);
            queue.push_back(root);
        }
        while let Some(index) = queue.pop_front() {
            let here = distances[index].expect("queued tiles have distances");
            let x = index % width;
            let mut neighbors = Vec::new();
            if x > 0 {
                neighbors.push(index - 1);
            }
            if x + 1 < width {
                neighbors.push(index + 1);
            }
            if index >= width {
                neighbors.push(index - width);
            }
            if index + width < count {
                neighbors.push(index + width);
            }
            for neighbor in neighbors {
                if distances[neighbor].is_none() && !blocked.contains(&neighbor) {
                    distances[neighbor] = Some(here + 1);
                    queue.push_back(neighbor);
                }
            }
        }
        distances
    }

    #[test]
    fn rebuild_marks_destination_as_root() {
        let mut field = field_3x4();
        assert!(field.rebuild(|index| index == 4, |_| false));
        assert_eq!(field.tile(4).distance(), Some(0));
        assert_eq!(field.tile(4).next_on_path(), None);
        assert_eq!(field.tile(4).exit_point(), field.tile(4).position());
    }

    #[test]
    fn rebuild_fails_without_destination() {
        let mut field = field_3x4();
        assert!(!field.rebuild(|_| false, |_| false));
    }

    #[test]
    fn rebuild_fails_when_a_tile_is_cut_off() {
        // Walls at 1 and 3 isolate corner 0 on a 3-wide grid.
        let mut field = field_3x4();
        let blocked = [1_usize, 3];
        assert!(!field.rebuild(|index| index == 4, |index| blocked.contains(&index)));
    }

    #[test]
    fn distances_match_reference_bfs_regardless_of_parity() {
        let size = BoardSize::new(5, 5);
        let mut field = FlowField::new(size);
        let destinations = [12_usize];
        let blocked = [7_usize, 11, 17];
        assert!(field.rebuild(
            |index| destinations.contains(&index),
            |index| blocked.contains(&index),
        ));

        let expected = reference_distances(size, &destinations, &blocked);
        for index in 0..field.len() {
            if blocked.contains(&index) {
                assert_eq!(field.tile(index).distance(), None);
            } else {
                assert_eq!(field.tile(index).distance(), expected[index], "tile {index}");
            }
        }
    }

    #[test]
    fn successors_step_one_tile_closer() {
        let mut field = FlowField::new(BoardSize::new(4, 4));
        assert!(field.rebuild(|index| index == 8, |_| false));
        for index in 0..field.len() {
            let tile = field.tile(index);
            if tile.distance() == Some(0) {
                continue;
            }
            let next = tile.next_on_path().expect("reachable tile has successor");
            assert_eq!(
                field.tile(next).distance(),
                tile.distance().map(|distance| distance - 1)
            );
        }
    }

    #[test]
    fn exit_points_sit_between_tile_and_successor() {
        let mut field = field_3x4();
        assert!(field.rebuild(|index| index == 4, |_| false));
        let tile = field.tile(1);
        let next = tile.next_on_path().expect("tile 1 is reachable");
        let midpoint = (tile.position() + field.tile(next).position()) * 0.5;
        assert_eq!(tile.exit_point(), midpoint);
    }

    #[test]
    fn rebuild_is_idempotent_without_edits() {
        let mut field = FlowField::new(BoardSize::new(5, 3));
        let blocked = [6_usize, 8];
        assert!(field.rebuild(|index| index == 7, |index| blocked.contains(&index)));
        let first: Vec<(Option<u32>, Option<usize>)> = (0..field.len())
            .map(|index| (field.tile(index).distance(), field.tile(index).next_on_path()))
            .collect();

        assert!(field.rebuild(|index| index == 7, |index| blocked.contains(&index)));
        let second: Vec<(Option<u32>, Option<usize>)> = (0..field.len())
            .map(|index| (field.tile(index).distance(), field.tile(index).next_on_path()))
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn neighbor_links_do_not_wrap_board_edges() {
        let field = FlowField::new(BoardSize::new(3, 2));
        // Corner 0 has no south or west neighbors.
        assert_eq!(field.tiles[0].neighbors[Direction::South.slot()], None);
        assert_eq!(field.tiles[0].neighbors[Direction::West.slot()], None);
        assert_eq!(field.tiles[0].neighbors[Direction::North.slot()], Some(3));
        assert_eq!(field.tiles[0].neighbors[Direction::East.slot()], Some(1));
        // Far corner mirrors it.
        assert_eq!(field.tiles[5].neighbors[Direction::North.slot()], None);
        assert_eq!(field.tiles[5].neighbors[Direction::East.slot()], None);
    }

    #[test]
    fn parity_flags_form_a_checkerboard() {
        let field = FlowField::new(BoardSize::new(3, 3));
        assert!(!field.tiles[0].alternative);
        assert!(field.tiles[1].alternative);
        assert!(field.tiles[3].alternative);
        assert!(!field.tiles[4].alternative);
    }

    #[test]
    fn positions_center_the_grid_on_the_origin() {
        let field = FlowField::new(BoardSize::new(3, 3));
        assert_eq!(field.tile(4).position(), Vec3::ZERO);
        assert_eq!(field.tile(0).position(), Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(field.tile(8).position(), Vec3::new(1.0, 0.0, 1.0));
    }
}
