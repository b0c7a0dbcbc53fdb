use std::fmt::{Display, Error, Formatter};
use std::ops::{Add, Sub};

use common::derive_more::*;
use common::*;

use crate::chunk_coordinate::ChunkCoordinate;
use crate::dim::CHUNK_SIZE;
use crate::local_tile::LocalTile;

/// A continuous position anywhere in the world, in metres
#[derive(Debug, Copy, Clone, PartialEq, Into, From)]
pub struct WorldPosition(pub f32, pub f32);

impl WorldPosition {
    pub const ORIGIN: Self = Self(0.0, 0.0);

    pub fn new(x: f32, y: f32) -> Self {
        Self(x, y)
    }

    pub fn x(self) -> f32 {
        self.0
    }

    pub fn y(self) -> f32 {
        self.1
    }

    pub fn as_vector2(self) -> Vector2 {
        Vector2::new(self.0, self.1)
    }

    pub fn distance2(self, other: Self) -> f32 {
        let dx = self.0 - other.0;
        let dy = self.1 - other.1;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Self) -> f32 {
        self.distance2(other).sqrt()
    }

    /// Which chunk this position falls within
    pub fn chunk(self) -> ChunkCoordinate {
        ChunkCoordinate::from(self)
    }

    /// The local tile within its chunk
    pub fn local_tile(self) -> LocalTile {
        LocalTile::from(self)
    }
}

impl From<Vector2> for WorldPosition {
    fn from(v: Vector2) -> Self {
        Self(v.x, v.y)
    }
}

impl From<(f32, f32)> for WorldPosition {
    fn from((x, y): (f32, f32)) -> Self {
        Self(x, y)
    }
}

impl Add<(f32, f32)> for WorldPosition {
    type Output = Self;

    fn add(self, (x, y): (f32, f32)) -> Self::Output {
        Self(self.0 + x, self.1 + y)
    }
}

impl Sub for WorldPosition {
    type Output = (f32, f32);

    fn sub(self, rhs: Self) -> Self::Output {
        (self.0 - rhs.0, self.1 - rhs.1)
    }
}

impl From<ChunkCoordinate> for WorldPosition {
    /// The position of a chunk's origin corner, i.e. its (0, 0) tile
    fn from(c: ChunkCoordinate) -> Self {
        let size = CHUNK_SIZE.as_f32();
        Self(c.0 as f32 * size, c.1 as f32 * size)
    }
}

impl Display for WorldPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "({:.2}, {:.2})", self.0, self.1)
    }
}

slog_value_display!(WorldPosition);
slog_kv_display!(WorldPosition, "pos");
