use common::*;
use unit::WorldPosition;

use crate::biome::{Biome, BiomeWeights};
use crate::noise::fractal_noise;

/// Result of sampling a chunk's four corners.
#[derive(Copy, Clone, Debug)]
pub struct ChunkSample {
    /// Ordered NW, NE, SW, SE.
    pub corner_biomes: [BiomeWeights; 4],
    pub corner_elevations: [f32; 4],
    pub is_pure: bool,
    pub primary_biome: Option<Biome>,
}

/// Contract every chunk generator samples through. Must be pure in
/// `(pos, seed)` - no clocks, no atomics - so chunk generation stays
/// reproducible.
pub trait WorldSampler: Send + Sync {
    fn sample_chunk(&self, coord: unit::ChunkCoordinate) -> ChunkSample;

    fn sample_elevation(&self, pos: WorldPosition) -> f32;

    fn sample_biome(&self, pos: WorldPosition) -> BiomeWeights;

    fn world_seed(&self) -> u64;
}

const OCTAVES: u32 = 3;
const PERSISTENCE: f32 = 0.5;

/// Frequency scalars tuned so each noise field varies meaningfully across a
/// single 512-tile chunk without repeating.
const ELEVATION_SCALE: f32 = 1.0 / 400.0;
const MOISTURE_SCALE: f32 = 1.0 / 300.0;
const TEMPERATURE_SCALE: f32 = 1.0 / 600.0;

const SEA_LEVEL: f32 = 0.35;
const MOUNTAIN_ELEVATION: f32 = 0.78;
const MOISTURE_LOW: f32 = 0.3;
const MOISTURE_HIGH: f32 = 0.68;
const TEMPERATURE_LOW: f32 = 0.35;

/// Classifies the primary biome for a point from its climate samples:
/// mountain at high elevation; desert/tundra at low moisture split by
/// temperature; wetland/ocean at high moisture split by elevation;
/// forest/beach/grassland otherwise.
fn classify(elevation: f32, moisture: f32, temperature: f32) -> Biome {
    if elevation > MOUNTAIN_ELEVATION {
        return Biome::Mountain;
    }

    if moisture < MOISTURE_LOW {
        return if temperature < TEMPERATURE_LOW {
            Biome::Tundra
        } else {
            Biome::Desert
        };
    }

    if moisture > MOISTURE_HIGH {
        return if elevation < SEA_LEVEL {
            Biome::Ocean
        } else {
            Biome::Wetland
        };
    }

    if elevation < SEA_LEVEL {
        Biome::Beach
    } else if moisture > 0.5 {
        Biome::Forest
    } else {
        Biome::Grassland
    }
}

/// Reference `WorldSampler` built from fractal value noise alone. Corner
/// blending at ecotones is left for a future sampler; this one reports a
/// single dominant biome per corner.
pub struct MockWorldSampler {
    seed: u64,
}

impl MockWorldSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn elevation_noise(&self, pos: WorldPosition) -> f32 {
        fractal_noise(
            pos.x() * ELEVATION_SCALE,
            pos.y() * ELEVATION_SCALE,
            self.seed,
            OCTAVES,
            PERSISTENCE,
        )
    }

    fn moisture_noise(&self, pos: WorldPosition) -> f32 {
        fractal_noise(
            pos.x() * MOISTURE_SCALE,
            pos.y() * MOISTURE_SCALE,
            self.seed.wrapping_add(0x1111_1111),
            OCTAVES,
            PERSISTENCE,
        )
    }

    fn temperature_noise(&self, pos: WorldPosition) -> f32 {
        fractal_noise(
            pos.x() * TEMPERATURE_SCALE,
            pos.y() * TEMPERATURE_SCALE,
            self.seed.wrapping_add(0x2222_2222),
            2,
            PERSISTENCE,
        )
    }

    fn classify_at(&self, pos: WorldPosition) -> Biome {
        classify(
            self.elevation_noise(pos),
            self.moisture_noise(pos),
            self.temperature_noise(pos),
        )
    }
}

impl WorldSampler for MockWorldSampler {
    fn sample_chunk(&self, coord: unit::ChunkCoordinate) -> ChunkSample {
        let size = unit::dim::CHUNK_SIZE.as_f32();
        let origin = WorldPosition::from(coord);
        let corners_pos = [
            origin, // NW
            origin + (size, 0.0), // NE
            origin + (0.0, size), // SW
            origin + (size, size), // SE
        ];

        let mut corner_biomes = [BiomeWeights::default(); 4];
        let mut corner_elevations = [0.0f32; 4];
        let mut biomes = [Biome::Grassland; 4];

        for (i, pos) in corners_pos.into_iter().enumerate() {
            let biome = self.classify_at(pos);
            biomes[i] = biome;
            corner_biomes[i] = BiomeWeights::single(biome);
            corner_elevations[i] = self.elevation_noise(pos);
        }

        let is_pure = biomes.iter().all(|&b| b == biomes[0]);

        ChunkSample {
            corner_biomes,
            corner_elevations,
            is_pure,
            primary_biome: is_pure.then_some(biomes[0]),
        }
    }

    fn sample_elevation(&self, pos: WorldPosition) -> f32 {
        self.elevation_noise(pos)
    }

    fn sample_biome(&self, pos: WorldPosition) -> BiomeWeights {
        BiomeWeights::single(self.classify_at(pos))
    }

    fn world_seed(&self) -> u64 {
        self.seed
    }
}
