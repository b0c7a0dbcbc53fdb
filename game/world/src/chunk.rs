use std::cell::Cell;
use std::time::Instant;

use common::*;
use unit::dim::{CHUNK_SIZE, SECTOR_GRID_SIZE};
use unit::{ChunkCoordinate, LocalTile, WorldPosition};

use crate::biome::{Biome, BiomeWeights};
use crate::mud;
use crate::noise::tile_hash;
use crate::sampler::{ChunkSample, WorldSampler};
use crate::surface::{Adjacency, Surface};

const TILE_COUNT: usize = CHUNK_SIZE.as_usize() * CHUNK_SIZE.as_usize();
const SECTOR_COUNT: usize = SECTOR_GRID_SIZE.as_usize() * SECTOR_GRID_SIZE.as_usize();
const TILES_PER_SECTOR: u32 = (CHUNK_SIZE.as_usize() / SECTOR_GRID_SIZE.as_usize()) as u32;

/// A single tile's generated state. Produced once at chunk load and never
/// mutated afterwards except by the tile post-processor during loading.
#[derive(Copy, Clone, Debug, Default)]
pub struct Tile {
    pub surface: Surface,
    pub moisture: u8,
    pub biome_weights: BiomeWeights,
    pub adjacency: Adjacency,
}

/// A 512x512-tile square of the world.
pub struct Chunk {
    pub coord: ChunkCoordinate,
    pub world_seed: u64,
    pub corner_biomes: [BiomeWeights; 4],
    pub corner_elevations: [f32; 4],
    pub is_pure: bool,
    /// Precomputed 32x32 biome-weight grid, one entry per 16x16-tile sector.
    /// Absent for pure chunks, where every tile shares `corner_biomes[0]`.
    sector_grid: Option<Box<[BiomeWeights]>>,
    tiles: Box<[Tile]>,
    last_accessed: Cell<Instant>,
}

impl Chunk {
    /// Runs the full loading pipeline for `coord`: samples corners,
    /// precomputes the sector grid, generates every tile, and runs the tile
    /// post-processor. Deterministic in `(sampler.world_seed(), coord)`.
    pub fn generate(coord: ChunkCoordinate, sampler: &dyn WorldSampler) -> Self {
        let sample: ChunkSample = sampler.sample_chunk(coord);
        let world_seed = sampler.world_seed();

        let sector_grid = if sample.is_pure {
            None
        } else {
            Some(build_sector_grid(&sample.corner_biomes))
        };

        let mut tiles = vec![Tile::default(); TILE_COUNT].into_boxed_slice();
        generate_tiles(
            &mut tiles,
            coord,
            world_seed,
            &sample,
            sector_grid.as_deref(),
        );

        let mut chunk = Self {
            coord,
            world_seed,
            corner_biomes: sample.corner_biomes,
            corner_elevations: sample.corner_elevations,
            is_pure: sample.is_pure,
            sector_grid,
            tiles,
            last_accessed: Cell::new(Instant::now()),
        };

        mud::process_chunk(&mut chunk.tiles, coord, world_seed);

        chunk
    }

    pub fn tile(&self, local: LocalTile) -> &Tile {
        &self.tiles[local.flat_index()]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Biome weights at a local tile, via the precomputed sector grid (or
    /// the single corner biome for a pure chunk).
    pub fn biome_at(&self, local: LocalTile) -> BiomeWeights {
        match &self.sector_grid {
            None => self.corner_biomes[0],
            Some(grid) => {
                let (sx, sy) = local.sector();
                grid[sy as usize * SECTOR_GRID_SIZE.as_usize() + sx as usize]
            }
        }
    }

    pub fn primary_biome_at(&self, local: LocalTile) -> Biome {
        if self.is_pure {
            self.corner_biomes[0].primary()
        } else {
            self.biome_at(local).primary()
        }
    }

    /// Touches the last-accessed instant; not part of logical chunk state,
    /// safe to call through a shared reference.
    pub fn touch(&self) {
        self.last_accessed.set(Instant::now());
    }

    pub fn last_accessed(&self) -> Instant {
        self.last_accessed.get()
    }

    /// Immutable per-tile `(biome, surface)` snapshot handed to a background
    /// placement worker: workers never read chunk memory directly.
    pub fn snapshot(&self) -> ChunkSnapshot {
        ChunkSnapshot {
            coord: self.coord,
            world_seed: self.world_seed,
            tiles: self
                .tiles
                .iter()
                .map(|t| (t.biome_weights.primary(), t.surface))
                .collect(),
        }
    }
}

/// Cheap-to-clone snapshot of a chunk's per-tile biome/surface, captured
/// before a placement job is spawned so the worker never touches the
/// chunk's own memory.
#[derive(Clone)]
pub struct ChunkSnapshot {
    pub coord: ChunkCoordinate,
    pub world_seed: u64,
    pub tiles: Vec<(Biome, Surface)>,
}

impl ChunkSnapshot {
    pub fn primary_biome(&self, local: LocalTile) -> Biome {
        self.tiles[local.flat_index()].0
    }

    pub fn surface(&self, local: LocalTile) -> Surface {
        self.tiles[local.flat_index()].1
    }
}

fn build_sector_grid(corners: &[BiomeWeights; 4]) -> Box<[BiomeWeights]> {
    let n = SECTOR_GRID_SIZE.as_usize();
    let mut grid = vec![BiomeWeights::default(); SECTOR_COUNT];
    for sy in 0..n {
        for sx in 0..n {
            let u = (sx as f32 + 0.5) / n as f32;
            let v = (sy as f32 + 0.5) / n as f32;
            let mut weights = BiomeWeights::bilinear(corners, u, v);
            weights.normalize();
            grid[sy * n + sx] = weights;
        }
    }
    grid.into_boxed_slice()
}

fn generate_tiles(
    tiles: &mut [Tile],
    coord: ChunkCoordinate,
    world_seed: u64,
    sample: &ChunkSample,
    sector_grid: Option<&[BiomeWeights]>,
) {
    let size = CHUNK_SIZE.as_usize();
    for ly in 0..size {
        for lx in 0..size {
            let local = LocalTile::new(lx as u16, ly as u16);
            let idx = local.flat_index();

            let u = lx as f32 / (size - 1) as f32;
            let v = ly as f32 / (size - 1) as f32;
            let elevation = bilinear_scalar(&sample.corner_elevations, u, v);

            let biome_weights = match sector_grid {
                None => sample.corner_biomes[0],
                Some(grid) => {
                    let (sx, sy) = local.sector();
                    grid[sy as usize * SECTOR_GRID_SIZE.as_usize() + sx as usize]
                }
            };
            let biome = biome_weights.primary();

            let hash = tile_hash(coord.0, coord.1, local.0, local.1, world_seed);
            let variety = hash as f32 / u32::MAX as f32;
            let surface = crate::surface_gen::classify_surface(biome, elevation, variety);
            let moisture = crate::surface_gen::moisture_for(biome, hash);

            tiles[idx] = Tile {
                surface,
                moisture,
                biome_weights,
                adjacency: Adjacency::default(),
            };
        }
    }
}

fn bilinear_scalar(corners: &[f32; 4], u: f32, v: f32) -> f32 {
    // ordered NW, NE, SW, SE
    let top = corners[0] * (1.0 - u) + corners[1] * u;
    let bottom = corners[2] * (1.0 - u) + corners[3] * u;
    top * (1.0 - v) + bottom * v
}

#[allow(dead_code)]
fn _assert_tiles_per_sector() {
    debug_assert_eq!(TILES_PER_SECTOR, 16);
}
