use common::derive_more::{From, Into};
use common::*;

use crate::dim::CHUNK_SIZE;
use crate::world_position::WorldPosition;

/// A tile's position within its owning chunk, `[0, CHUNK_SIZE)` in both axes
#[derive(Copy, Clone, PartialEq, Eq, Hash, Into, From)]
pub struct LocalTile(pub u16, pub u16);

impl LocalTile {
    pub fn new(x: u16, y: u16) -> Self {
        debug_assert!((x as u32) < CHUNK_SIZE.as_usize() as u32);
        debug_assert!((y as u32) < CHUNK_SIZE.as_usize() as u32);
        Self(x, y)
    }

    /// Flat index into a `CHUNK_SIZE * CHUNK_SIZE` tile array, row-major
    pub fn flat_index(self) -> usize {
        self.1 as usize * CHUNK_SIZE.as_usize() + self.0 as usize
    }

    /// The 16x16-tile sector this tile falls within
    pub fn sector(self) -> (u16, u16) {
        (self.0 / 16, self.1 / 16)
    }
}

impl From<WorldPosition> for LocalTile {
    fn from(pos: WorldPosition) -> Self {
        let size = CHUNK_SIZE.as_i32();
        let x = (pos.x().floor() as i32).rem_euclid(size);
        let y = (pos.y().floor() as i32).rem_euclid(size);
        Self(x as u16, y as u16)
    }
}

impl Debug for LocalTile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "({}, {})", self.0, self.1)
    }
}

slog_value_debug!(LocalTile);
slog_kv_debug!(LocalTile, "tile");
