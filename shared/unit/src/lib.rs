pub use chunk_coordinate::ChunkCoordinate;
pub use local_tile::LocalTile;
pub use world_position::WorldPosition;

pub mod dim;

mod chunk_coordinate;
mod local_tile;
mod world_position;
