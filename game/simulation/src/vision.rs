use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use common::*;

use assets::AssetCatalog;
use ecs::World;
use placement::PlacementExecutor;
use unit::dim::CHUNK_SIZE;
use unit::ChunkCoordinate;

use crate::components::{Memory, Position};

/// Populates each colonist's [`Memory`] from already-placed static entities
/// within sight range, by querying the processed chunks' spatial indices.
/// Never touches the ECS for dynamic entities yet - that's left for a
/// future producer.
pub struct VisionSystem {
    executor: Rc<RefCell<PlacementExecutor>>,
    catalog: Arc<AssetCatalog>,
}

impl VisionSystem {
    pub fn new(executor: Rc<RefCell<PlacementExecutor>>, catalog: Arc<AssetCatalog>) -> Self {
        Self { executor, catalog }
    }
}

impl ecs::System for VisionSystem {
    fn priority(&self) -> u32 {
        45
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        let executor = self.executor.borrow();
        let catalog = &self.catalog;

        world.view2::<Position, Memory>(|_entity, pos, memory| {
                let centre = pos.0;
                let radius = memory.sight_radius;
                let chunk_radius = (radius / CHUNK_SIZE.as_f32()).ceil() as i32 + 1;
                let home_chunk = ChunkCoordinate::from(centre);

                for coord in home_chunk.ring(chunk_radius) {
                    let index = match executor.get_chunk_index(coord) {
                        Some(i) => i,
                        None => continue,
                    };

                    let found = index
                        .read()
                        .query_radius(centre, radius, spatial::EntityFilter::Any);

                    for placed in found {
                        let mask = catalog.capability_mask(placed.def_name);
                        memory.remember_world_entity(placed.position, placed.def_name, mask_iter(mask));
                    }
                }
        });
    }
}

/// All [`assets::Capability`] variants present in `mask`. `enumflags2`'s
/// iterator support varies across versions, so this just checks each known
/// variant directly against the mask.
const ALL_CAPABILITIES: [assets::Capability; 9] = [
    assets::Capability::Edible,
    assets::Capability::Drinkable,
    assets::Capability::Sleepable,
    assets::Capability::Toilet,
    assets::Capability::Waste,
    assets::Capability::Carryable,
    assets::Capability::Harvestable,
    assets::Capability::Craftable,
    assets::Capability::Storage,
];

fn mask_iter(mask: assets::CapabilityMask) -> impl Iterator<Item = assets::Capability> {
    ALL_CAPABILITIES.iter().copied().filter(move |&cap| mask.contains(cap))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assets::{AssetCatalog, AssetDefinitionBuilder, Capability};
    use ecs::{System, World};
    use placement::{PlacementContext, PlacementExecutor};
    use unit::WorldPosition;

    use super::*;

    #[test]
    fn colonist_remembers_nearby_placed_entity() {
        let mut def = AssetDefinitionBuilder::new("Berries");
        def.capabilities = Capability::Edible.into();
        let catalog = Arc::new(AssetCatalog::build(vec![def]));
        let berries_id = catalog.get_def_name_id("Berries").unwrap();

        let context = Arc::new(PlacementContext::new(catalog.clone(), 1));
        let mut executor = PlacementExecutor::new(context);

        let coord = ChunkCoordinate::new(0, 0);
        let mut index = spatial::SpatialIndex::new(spatial::DEFAULT_CELL_SIZE);
        index.insert(spatial::PlacedEntity::new(berries_id, WorldPosition::new(5.0, 5.0)));
        executor.store_chunk_result(placement::ChunkPlacementResult {
                coord,
                entities: index.iter().copied().collect(),
                spatial_index: index,
        });

        let executor = Rc::new(RefCell::new(executor));
        let mut world = World::new();
        let colonist = world.create_entity();
        world.add_component(colonist, Position(WorldPosition::new(0.0, 0.0)));
        world.add_component(colonist, Memory::new(20.0));

        let mut system = VisionSystem::new(executor, catalog);
        system.update(&mut world, 1.0 / 60.0);

        let memory = world.get_component::<Memory>(colonist).unwrap();
        assert_eq!(memory.count_with_capability(Capability::Edible), 1);
    }
}
