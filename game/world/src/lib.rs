//! World generation primitives: deterministic noise, biome classification,
//! per-chunk tile generation, and chunk streaming around a moving centre.

pub use biome::{Biome, BiomeWeights, BIOME_COUNT};
pub use chunk::{Chunk, ChunkSnapshot, Tile};
pub use sampler::{ChunkSample, MockWorldSampler, WorldSampler};
pub use store::ChunkStore;
pub use surface::{Adjacency, Direction, Surface};

mod biome;
mod chunk;
mod mud;
mod noise;
mod sampler;
mod store;
mod surface;
mod surface_gen;

pub use noise::{fractal_noise, hash2, smoothstep, tile_hash, value_noise};
