use std::sync::Arc;

use common::parking_lot::RwLock;

use assets::DefNameId;
use ecs::{EntityId, World};
use placement::PlacementExecutor;
use spatial::SpatialIndex;
use unit::{ChunkCoordinate, WorldPosition};
use world::{Chunk, ChunkStore};

use crate::components::{Appearance, Packaged, Position, Rotation};
use crate::selection::Selection;

/// A dynamic (ECS-resident) entity's render-relevant state, read fresh every
/// frame rather than cached - the simulation owns the source of truth.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExtractedDynamicEntity {
    pub entity: EntityId,
    pub pos: WorldPosition,
    pub rotation: f32,
    pub def_name: DefNameId,
    pub scale: f32,
    pub rgba: [f32; 4],
}

/// A crafted-but-unplaced entity awaiting a colonist to carry it to
/// `target_pos`, drawn as a translucent preview at its destination.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExtractedGhost {
    pub def_name: DefNameId,
    pub target_pos: WorldPosition,
}

/// Everything the render side needs for one frame, gathered in a single
/// pass and handed back by value - the core keeps no reference to it and
/// receives no geometry in return.
pub struct RenderFrame<'a> {
    pub visible_chunks: Vec<(ChunkCoordinate, &'a Chunk)>,
    pub processed_indices: Vec<(ChunkCoordinate, Arc<RwLock<SpatialIndex>>)>,
    pub dynamic_entities: Vec<ExtractedDynamicEntity>,
    pub ghosts: Vec<ExtractedGhost>,
    pub selection: Option<Selection>,
}

/// Read-only extraction pass. Reads the chunk store, the executor's
/// processed spatial indices, the `(Position, Rotation, Appearance)` ECS
/// view, goal ghosts, and the current selection; owns none of it and writes
/// nothing back.
pub trait RenderExtract {
    fn extract<'a, S: world::WorldSampler>(
        &self,
        world: &World,
        store: &'a ChunkStore<S>,
        executor: &PlacementExecutor,
        selection: Option<Selection>,
        view_min: WorldPosition,
        view_max: WorldPosition,
    ) -> RenderFrame<'a>;
}

/// Default, stateless implementor of [`RenderExtract`].
pub struct FrameExtractor;

impl RenderExtract for FrameExtractor {
    fn extract<'a, S: world::WorldSampler>(
        &self,
        world: &World,
        store: &'a ChunkStore<S>,
        executor: &PlacementExecutor,
        selection: Option<Selection>,
        view_min: WorldPosition,
        view_max: WorldPosition,
    ) -> RenderFrame<'a> {
        let (min_coord, max_coord) = store.visible_chunks(view_min, view_max);

        let mut visible_chunks = Vec::new();
        let mut processed_indices = Vec::new();
        for cy in min_coord.1..=max_coord.1 {
            for cx in min_coord.0..=max_coord.0 {
                let coord = ChunkCoordinate::new(cx, cy);
                if let Some(chunk) = store.get_chunk(coord) {
                    visible_chunks.push((coord, chunk));
                }
                if let Some(index) = executor.get_chunk_index(coord) {
                    processed_indices.push((coord, index));
                }
            }
        }

        let mut dynamic_entities = Vec::new();
        world.view3::<Position, Rotation, Appearance>(|entity, pos, rotation, appearance| {
            dynamic_entities.push(ExtractedDynamicEntity {
                entity,
                pos: pos.0,
                rotation: rotation.radians,
                def_name: appearance.def_name,
                scale: appearance.scale,
                rgba: appearance.rgba,
            });
        });

        let mut ghosts = Vec::new();
        world.view2::<Packaged, Appearance>(|_entity, packaged, appearance| {
            if let Some(target_pos) = packaged.target_pos {
                ghosts.push(ExtractedGhost {
                    def_name: appearance.def_name,
                    target_pos,
                });
            }
        });

        RenderFrame {
            visible_chunks,
            processed_indices,
            dynamic_entities,
            ghosts,
            selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use ecs::World;
    use world::MockWorldSampler;

    use super::*;

    #[test]
    fn extracts_dynamic_entities_in_view() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position(WorldPosition::new(1.0, 1.0)));
        world.add_component(e, Rotation { radians: 0.5 });
        world.add_component(e, Appearance::default());

        let store: ChunkStore<MockWorldSampler> = ChunkStore::new(MockWorldSampler::new(1), 1, 1);
        let catalog = std::sync::Arc::new(assets::AssetCatalog::build(vec![]));
        let context = std::sync::Arc::new(placement::PlacementContext::new(catalog, 1));
        let executor = PlacementExecutor::new(context);

        let extractor = FrameExtractor;
        let frame = extractor.extract(
            &world,
            &store,
            &executor,
            None,
            WorldPosition::new(0.0, 0.0),
            WorldPosition::new(10.0, 10.0),
        );

        assert_eq!(frame.dynamic_entities.len(), 1);
        assert_eq!(frame.dynamic_entities[0].entity, e);
    }

    #[test]
    fn extracts_ghosts_only_for_targeted_packages() {
        let mut world = World::new();
        let targeted = world.create_entity();
        world.add_component(targeted, Packaged {
            target_pos: Some(WorldPosition::new(2.0, 2.0)),
            being_carried: false,
        });
        world.add_component(targeted, Appearance::default());

        let untargeted = world.create_entity();
        world.add_component(untargeted, Packaged::default());
        world.add_component(untargeted, Appearance::default());

        let store: ChunkStore<MockWorldSampler> = ChunkStore::new(MockWorldSampler::new(1), 1, 1);
        let catalog = std::sync::Arc::new(assets::AssetCatalog::build(vec![]));
        let context = std::sync::Arc::new(placement::PlacementContext::new(catalog, 1));
        let executor = PlacementExecutor::new(context);

        let extractor = FrameExtractor;
        let frame = extractor.extract(
            &world,
            &store,
            &executor,
            None,
            WorldPosition::new(0.0, 0.0),
            WorldPosition::new(10.0, 10.0),
        );

        assert_eq!(frame.ghosts.len(), 1);
        assert_eq!(frame.ghosts[0].target_pos, WorldPosition::new(2.0, 2.0));
    }
}
