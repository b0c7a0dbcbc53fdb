//! Grid-hashed per-chunk store of placed static entities, with radius
//! queries.

pub use index::{EntityFilter, SpatialIndex, DEFAULT_CELL_SIZE};
pub use placed::PlacedEntity;

mod index;
mod placed;
