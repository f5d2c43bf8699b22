//! Tile content variants and their blocking semantics.

use grid_defence_core::TileContentKind;

/// Targeting radius assigned to newly placed towers, in world units.
pub(crate) const DEFAULT_TOWER_RANGE: f32 = 1.5;

/// Content occupying a single tile.
///
/// Exactly one instance per tile; edits swap the variant in place. Only the
/// tower variant carries payload, so content values are fungible by kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum TileContent {
    Empty,
    Wall,
    Destination,
    SpawnPoint,
    Tower { range: f32 },
}

impl TileContent {
    /// Variant tag exposed through events and queries.
    pub(crate) const fn kind(&self) -> TileContentKind {
        match self {
            Self::Empty => TileContentKind::Empty,
            Self::Wall => TileContentKind::Wall,
            Self::Destination => TileContentKind::Destination,
            Self::SpawnPoint => TileContentKind::SpawnPoint,
            Self::Tower { .. } => TileContentKind::Tower,
        }
    }

    /// Reports whether this content blocks path traversal.
    pub(crate) const fn blocks_path(&self) -> bool {
        self.kind().blocks_path()
    }
}
