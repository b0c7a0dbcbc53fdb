use std::sync::Arc;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use common::parking_lot::RwLock;
use common::*;

use assets::{AssetCatalog, DefNameId, RelationshipKind, RelationshipTarget};
use spatial::{EntityFilter, PlacedEntity, SpatialIndex};
use unit::dim::CHUNK_SIZE;
use unit::{ChunkCoordinate, LocalTile, WorldPosition};
use world::{ChunkSnapshot, Direction};

use crate::error::PlacementError;
use crate::graph::DependencyGraph;

const SEED_MIX_X: u64 = 0x9E3779B97F4A7C15;
const SEED_MIX_Y: u64 = 0x6C62272E07BB0142;

fn chunk_seed(world_seed: u64, coord: ChunkCoordinate) -> u64 {
    let x = (coord.0 as i64 as u64).wrapping_mul(SEED_MIX_X);
    let y = (coord.1 as i64 as u64).wrapping_mul(SEED_MIX_Y);
    world_seed ^ x ^ y
}

fn quantize(pos: WorldPosition) -> (i32, i32) {
    ((pos.x() * 1000.0).round() as i32, (pos.y() * 1000.0).round() as i32)
}

/// Immutable, thread-safe placement context: catalog and dependency graph,
/// built once and never mutated. Cheap to clone (`Arc`) into worker tasks.
pub struct PlacementContext {
    pub catalog: Arc<AssetCatalog>,
    graph: DependencyGraph,
    world_seed: u64,
}

impl PlacementContext {
    /// A cyclic dependency graph disables placement entirely (empty spawn
    /// order) rather than panicking - logged once here.
    pub fn new(catalog: Arc<AssetCatalog>, world_seed: u64) -> Self {
        let graph = DependencyGraph::build(&catalog).unwrap_or_else(|e| {
            error!("disabling placement due to cyclic dependency"; "error" => %e);
            DependencyGraph::empty()
        });
        Self {
            catalog,
            graph,
            world_seed,
        }
    }

    pub fn spawn_order(&self) -> &[DefNameId] {
        self.graph.spawn_order()
    }

    /// Builds the local spatial index for one chunk. Pure and read-only with
    /// respect to already-stored indices: reads `neighbors` but never
    /// mutates them, so many chunks may be computed concurrently.
    pub fn compute_chunk_entities(
        &self,
        snapshot: &ChunkSnapshot,
        neighbors: &NeighborSnapshot,
    ) -> ChunkPlacementResult {
        let coord = snapshot.coord;
        let mut rng = SmallRng::seed_from_u64(chunk_seed(self.world_seed, coord));
        let mut local_index = SpatialIndex::new(spatial::DEFAULT_CELL_SIZE);
        let origin = WorldPosition::from(coord);
        let size = CHUNK_SIZE.as_i32();

        for &def_id in self.graph.spawn_order() {
            let def = match self.catalog.get_def_by_id(def_id) {
                Some(d) => d,
                None => continue,
            };

            for ly in 0..size {
                for lx in 0..size {
                    let local = LocalTile::new(lx as u16, ly as u16);
                    let biome = snapshot.primary_biome(local);
                    let rule = match def.biome_rule(biome as u8) {
                        Some(r) => r,
                        None => continue,
                    };

                    if let Some(near) = &rule.near_surface {
                        if !near_surface_matches(snapshot, lx, ly, size, near) {
                            continue;
                        }
                    }

                    let pos = origin + (lx as f32 + 0.5, ly as f32 + 0.5);

                    let mut modifier = 1.0f32;
                    let mut skip = false;
                    for rel in &def.relationships {
                        let filter = match self.resolve_target(def_id, &rel.target) {
                            Some(f) => f,
                            None => continue,
                        };
                        let nearby = local_index.has_nearby(pos, rel.distance, filter.as_filter())
                            || neighbors.has_nearby(pos, rel.distance, &filter);

                        match rel.kind {
                            RelationshipKind::Requires => {
                                if !nearby {
                                    skip = true;
                                }
                            }
                            RelationshipKind::Affinity => {
                                if nearby {
                                    modifier *= rel.strength;
                                }
                            }
                            RelationshipKind::Avoids => {
                                if nearby {
                                    modifier *= rel.penalty;
                                }
                            }
                        }

                        if skip {
                            break;
                        }
                    }

                    if skip {
                        continue;
                    }

                    let chance = (rule.spawn_chance * modifier).clamp(0.0, 1.0);
                    let roll: f32 = rng.gen_range(0.0, 1.0);
                    if roll < chance {
                        local_index.insert(PlacedEntity::new(def_id, pos));
                    }
                }
            }
        }

        let entities: Vec<PlacedEntity> = local_index.iter().copied().collect();
        ChunkPlacementResult {
            coord,
            entities,
            spatial_index: local_index,
        }
    }

    fn resolve_target(&self, current: DefNameId, target: &RelationshipTarget) -> Option<OwnedFilter> {
        match target {
            RelationshipTarget::Same => Some(OwnedFilter::Name(current)),
            RelationshipTarget::ByName(name) => match self.catalog.get_def_name_id(name) {
                Some(id) => Some(OwnedFilter::Name(id)),
                None => {
                    warn!("relationship target not found, skipping"; "name" => name);
                    None
                }
            },
            RelationshipTarget::ByGroup(group) => {
                Some(OwnedFilter::Names(self.catalog.group_members(group).to_vec()))
            }
        }
    }
}

/// Owned variant of [`spatial::EntityFilter`] so relationship resolution
/// doesn't need to thread catalog-borrowed slices through the hot loop.
enum OwnedFilter {
    Name(DefNameId),
    Names(Vec<DefNameId>),
}

impl OwnedFilter {
    fn as_filter(&self) -> EntityFilter<'_> {
        match self {
            OwnedFilter::Name(id) => EntityFilter::Name(*id),
            OwnedFilter::Names(ids) => EntityFilter::Names(ids),
        }
    }
}

fn near_surface_matches(
    snapshot: &ChunkSnapshot,
    lx: i32,
    ly: i32,
    size: i32,
    near: &assets::NearSurface,
) -> bool {
    let r = near.distance as i32;
    for dy in -r..=r {
        for dx in -r..=r {
            let x = lx + dx;
            let y = ly + dy;
            if x < 0 || y < 0 || x >= size || y >= size {
                continue;
            }
            let local = LocalTile::new(x as u16, y as u16);
            if snapshot.surface(local).id() == near.surface {
                return true;
            }
        }
    }
    false
}

/// Read-only view of already-processed neighboring chunks' spatial indices,
/// captured before a chunk computation is launched.
#[derive(Clone, Default)]
pub struct NeighborSnapshot {
    neighbors: Vec<(ChunkCoordinate, Arc<RwLock<SpatialIndex>>)>,
}

impl NeighborSnapshot {
    pub fn new(neighbors: Vec<(ChunkCoordinate, Arc<RwLock<SpatialIndex>>)>) -> Self {
        Self { neighbors }
    }

    fn has_nearby(&self, pos: WorldPosition, radius: f32, filter: &OwnedFilter) -> bool {
        self.neighbors
            .iter()
            .any(|(_, index)| index.read().has_nearby(pos, radius, filter.as_filter()))
    }
}

pub struct ChunkPlacementResult {
    pub coord: ChunkCoordinate,
    pub entities: Vec<PlacedEntity>,
    pub spatial_index: SpatialIndex,
}

/// Main-thread owner of every stored per-chunk spatial index. All mutating
/// methods (`store_chunk_result`, `remove_entity`, ...) are main-thread-only;
/// the `Arc<RwLock<_>>` indices handed out by [`Self::neighbors_of`] let
/// background workers read them safely while this executor keeps running.
pub struct PlacementExecutor {
    context: Arc<PlacementContext>,
    chunks: AHashMap<ChunkCoordinate, Arc<RwLock<SpatialIndex>>>,
    cooldowns: AHashMap<(ChunkCoordinate, DefNameId, (i32, i32)), Instant>,
    resource_pools: AHashMap<(ChunkCoordinate, DefNameId, (i32, i32)), u32>,
}

impl PlacementExecutor {
    pub fn new(context: Arc<PlacementContext>) -> Self {
        Self {
            context,
            chunks: AHashMap::default(),
            cooldowns: AHashMap::default(),
            resource_pools: AHashMap::default(),
        }
    }

    pub fn context(&self) -> &Arc<PlacementContext> {
        &self.context
    }

    pub fn is_processed(&self, coord: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Snapshot of the up-to-8 already-processed neighbor chunks, for the
    /// async processor to hand to a worker alongside the tile snapshot.
    pub fn neighbors_of(&self, coord: ChunkCoordinate) -> NeighborSnapshot {
        let neighbors = Direction::ALL
            .iter()
            .map(|d| coord + d.offset())
            .filter_map(|c| self.chunks.get(&c).map(|idx| (c, idx.clone())))
            .collect();
        NeighborSnapshot::new(neighbors)
    }

    pub fn store_chunk_result(&mut self, result: ChunkPlacementResult) {
        debug!("storing placement result"; "chunk" => result.coord, "entities" => result.entities.len());
        self.chunks
            .insert(result.coord, Arc::new(RwLock::new(result.spatial_index)));
    }

    pub fn unload_chunk(&mut self, coord: ChunkCoordinate) {
        self.chunks.remove(&coord);
        self.cooldowns.retain(|(c, ..), _| *c != coord);
        self.resource_pools.retain(|(c, ..), _| *c != coord);
    }

    pub fn get_chunk_index(&self, coord: ChunkCoordinate) -> Option<Arc<RwLock<SpatialIndex>>> {
        self.chunks.get(&coord).cloned()
    }

    /// Authoritative mutator for destructive harvest.
    pub fn remove_entity(&self, coord: ChunkCoordinate, pos: WorldPosition, def_name: DefNameId) -> bool {
        match self.chunks.get(&coord) {
            Some(index) => index.write().remove(pos, def_name),
            None => false,
        }
    }

    /// Authoritative mutator for non-destructive harvest regrowth: the
    /// entity stays placed but is off-limits until `seconds` elapse.
    pub fn set_entity_cooldown(
        &mut self,
        coord: ChunkCoordinate,
        pos: WorldPosition,
        def_name: DefNameId,
        seconds: f32,
    ) {
        let expiry = Instant::now() + Duration::from_secs_f32(seconds.max(0.0));
        self.cooldowns.insert((coord, def_name, quantize(pos)), expiry);
    }

    pub fn is_on_cooldown(&self, coord: ChunkCoordinate, pos: WorldPosition, def_name: DefNameId) -> bool {
        self.cooldowns
            .get(&(coord, def_name, quantize(pos)))
            .map(|expiry| Instant::now() < *expiry)
            .unwrap_or(false)
    }

    /// Decrements a finite harvest pool, initializing it from the asset's
    /// `total_pool` on first touch. Returns `true` once the pool is
    /// exhausted, signalling the caller should also `remove_entity`.
    pub fn decrement_resource_count(
        &mut self,
        coord: ChunkCoordinate,
        pos: WorldPosition,
        def_name: DefNameId,
    ) -> bool {
        let total = self
            .context
            .catalog
            .get_def_by_id(def_name)
            .and_then(|d| d.harvestable.as_ref())
            .and_then(|h| h.total_pool);

        let key = (coord, def_name, quantize(pos));
        let remaining = self.resource_pools.entry(key).or_insert_with(|| total.unwrap_or(0));
        *remaining = remaining.saturating_sub(1);
        *remaining == 0
    }
}
