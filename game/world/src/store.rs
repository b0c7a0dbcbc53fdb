use std::collections::HashMap;

use common::*;
use unit::{ChunkCoordinate, WorldPosition};

use crate::chunk::Chunk;
use crate::sampler::WorldSampler;

/// Generates, caches, and evicts chunks around a moving centre.
///
/// All mutation happens on the main thread; [`Chunk::touch`] uses interior
/// mutability so `get_chunk` can bump the access time through a shared
/// reference.
pub struct ChunkStore<S> {
    sampler: S,
    load_radius: i32,
    unload_radius: i32,
    chunks: HashMap<ChunkCoordinate, Chunk>,
}

impl<S: WorldSampler> ChunkStore<S> {
    pub fn new(sampler: S, load_radius: i32, unload_radius: i32) -> Self {
        debug_assert!(
            unload_radius >= load_radius,
            "unload radius must be >= load radius to avoid thrashing"
        );
        Self {
            sampler,
            load_radius,
            unload_radius,
            chunks: HashMap::new(),
        }
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Loads every chunk within `load_radius` of `center` (generating any
    /// not already present) and unloads every chunk outside `unload_radius`.
    /// All chunks within `load_radius` are guaranteed present once this
    /// returns.
    pub fn update(&mut self, center: WorldPosition) {
        let center_coord = center.chunk();

        let mut loaded = 0;
        for coord in center_coord.ring(self.load_radius) {
            if !self.chunks.contains_key(&coord) {
                let chunk = Chunk::generate(coord, &self.sampler);
                self.chunks.insert(coord, chunk);
                loaded += 1;
            }
        }
        if loaded > 0 {
            debug!("loaded chunks"; "count" => loaded, "center" => %center_coord);
        }

        let to_unload: Vec<ChunkCoordinate> = self
            .chunks
            .keys()
            .filter(|&&coord| center_coord.chebyshev_distance(coord) > self.unload_radius)
            .copied()
            .collect();

        for coord in &to_unload {
            self.chunks.remove(coord);
        }
        if !to_unload.is_empty() {
            debug!("unloaded chunks"; "count" => to_unload.len());
        }
    }

    /// Returns the chunk if currently loaded, touching its last-accessed
    /// time. `None` if outside `load_radius` or not yet generated.
    pub fn get_chunk(&self, coord: ChunkCoordinate) -> Option<&Chunk> {
        let chunk = self.chunks.get(&coord)?;
        chunk.touch();
        Some(chunk)
    }

    pub fn is_loaded(&self, coord: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    /// The axis-aligned rectangle of chunk coordinates covering a world-space
    /// rectangle, for render-side culling.
    pub fn visible_chunks(&self, min: WorldPosition, max: WorldPosition) -> (ChunkCoordinate, ChunkCoordinate) {
        (min.chunk(), max.chunk())
    }

    pub fn loaded_coords(&self) -> impl Iterator<Item = ChunkCoordinate> + '_ {
        self.chunks.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::MockWorldSampler;

    #[test]
    fn update_loads_all_chunks_within_radius() {
        let mut store = ChunkStore::new(MockWorldSampler::new(1), 2, 3);
        store.update(WorldPosition::ORIGIN);

        for coord in ChunkCoordinate::ORIGIN.ring(2) {
            assert!(store.is_loaded(coord), "{:?} should be loaded", coord);
        }
    }

    #[test]
    fn update_unloads_outside_unload_radius() {
        let mut store = ChunkStore::new(MockWorldSampler::new(1), 1, 1);
        store.update(WorldPosition::ORIGIN);
        assert!(store.is_loaded(ChunkCoordinate::new(0, 0)));

        // move far away
        let far = WorldPosition::from(ChunkCoordinate::new(100, 100));
        store.update(far);

        assert!(!store.is_loaded(ChunkCoordinate::new(0, 0)));
        assert!(store.is_loaded(ChunkCoordinate::new(100, 100)));
    }

    #[test]
    fn hysteresis_keeps_chunk_loaded_between_load_and_unload_radius() {
        let mut store = ChunkStore::new(MockWorldSampler::new(1), 1, 3);
        store.update(WorldPosition::ORIGIN);

        // move center by 2 chunks: coord (0,0) is now 2 away, within unload
        // radius (3) but beyond load radius (1) - should remain loaded
        let shifted = WorldPosition::from(ChunkCoordinate::new(2, 0));
        store.update(shifted);

        assert!(store.is_loaded(ChunkCoordinate::new(0, 0)));
    }
}
