use common::derive_more::{From, Into};
use common::*;

use crate::dim::CHUNK_SIZE;
use crate::world_position::WorldPosition;
use std::ops::{Add, Sub};

/// Identifies a single chunk in the infinite tile grid
#[derive(Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Into, From)]
pub struct ChunkCoordinate(pub i32, pub i32);

impl ChunkCoordinate {
    pub const ORIGIN: Self = Self(0, 0);

    pub fn new(x: i32, y: i32) -> Self {
        Self(x, y)
    }

    /// Manhattan distance between two chunk coordinates
    pub fn manhattan_distance(self, other: Self) -> i32 {
        (self.0 - other.0).abs() + (self.1 - other.1).abs()
    }

    /// Chebyshev distance between two chunk coordinates, i.e. ring index
    pub fn chebyshev_distance(self, other: Self) -> i32 {
        (self.0 - other.0).abs().max((self.1 - other.1).abs())
    }

    /// All chunks within the given Chebyshev radius, including self, in no particular order
    pub fn ring(self, radius: i32) -> impl Iterator<Item = Self> {
        let centre = self;
        (-radius..=radius)
            .flat_map(move |dx| (-radius..=radius).map(move |dy| (dx, dy)))
            .map(move |(dx, dy)| Self(centre.0 + dx, centre.1 + dy))
    }
}

impl From<WorldPosition> for ChunkCoordinate {
    fn from(pos: WorldPosition) -> Self {
        let size = CHUNK_SIZE.as_f32();
        Self(
            (pos.x() / size).floor() as i32,
            (pos.y() / size).floor() as i32,
        )
    }
}

impl Add<(i32, i32)> for ChunkCoordinate {
    type Output = Self;

    fn add(self, (dx, dy): (i32, i32)) -> Self::Output {
        Self(self.0 + dx, self.1 + dy)
    }
}

impl Sub for ChunkCoordinate {
    type Output = (i32, i32);

    fn sub(self, rhs: Self) -> Self::Output {
        (self.0 - rhs.0, self.1 - rhs.1)
    }
}

impl Debug for ChunkCoordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}, {}]", self.0, self.1)
    }
}

slog_value_debug!(ChunkCoordinate);
slog_kv_debug!(ChunkCoordinate, "chunk");
