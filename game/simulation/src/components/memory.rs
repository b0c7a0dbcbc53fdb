use ahash::{AHashMap, AHashSet};

use assets::{Capability, DefNameId};
use ecs::EntityId;
use unit::WorldPosition;

/// A remembered static world entity: where it was seen, not necessarily
/// where it still is (placed entities don't move, but may be removed or put
/// on cooldown after this memory was recorded).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldMemoryEntry {
    pub def_name_id: DefNameId,
    pub pos: WorldPosition,
}

/// Quantizes `pos` to a tenth of a metre and mixes in `def_name`, giving a
/// stable key for deduplicating repeated sightings of the same placed
/// entity without storing a separate `Vec` scan.
pub fn world_entity_key(pos: WorldPosition, def_name: DefNameId) -> u64 {
    let qx = (pos.x() * 10.0).round() as i32 as u32 as u64;
    let qy = (pos.y() * 10.0).round() as i32 as u32 as u64;
    (qx << 32 | qy) ^ ((def_name.0 as u64) << 1)
}

/// A colonist's recollection of the world: static entities it has seen
/// within [`VisionSystem`](crate::vision::VisionSystem) range, plus the
/// last-known position of dynamic (ECS) entities it has observed.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    known_world: AHashMap<u64, WorldMemoryEntry>,
    known_dynamic: AHashMap<EntityId, WorldPosition>,
    pub sight_radius: f32,
    capability_index: AHashMap<Capability, AHashSet<u64>>,
}

impl Memory {
    pub fn new(sight_radius: f32) -> Self {
        Self {
            known_world: AHashMap::default(),
            known_dynamic: AHashMap::default(),
            sight_radius,
            capability_index: AHashMap::default(),
        }
    }

    pub fn remember_world_entity(&mut self, pos: WorldPosition, def_name: DefNameId, mask: impl IntoIterator<Item = Capability>) {
        let key = world_entity_key(pos, def_name);
        self.known_world.insert(key, WorldMemoryEntry { def_name_id: def_name, pos });
        for cap in mask {
            self.capability_index.entry(cap).or_default().insert(key);
        }
    }

    pub fn remember_dynamic(&mut self, entity: EntityId, pos: WorldPosition) {
        self.known_dynamic.insert(entity, pos);
    }

    pub fn forget_dynamic(&mut self, entity: EntityId) {
        self.known_dynamic.remove(&entity);
    }

    pub fn known_dynamic_position(&self, entity: EntityId) -> Option<WorldPosition> {
        self.known_dynamic.get(&entity).copied()
    }

    pub fn known_with_capability(&self, cap: Capability) -> impl Iterator<Item = WorldMemoryEntry> + '_ {
        self.capability_index
            .get(&cap)
            .into_iter()
            .flatten()
            .filter_map(move |key| self.known_world.get(key))
            .copied()
    }

    pub fn count_with_capability(&self, cap: Capability) -> usize {
        self.capability_index.get(&cap).map(AHashSet::len).unwrap_or(0)
    }

    /// The closest remembered entity with `cap` to `from`, if any has ever
    /// been seen.
    pub fn nearest_with_capability(&self, from: WorldPosition, cap: Capability) -> Option<WorldMemoryEntry> {
        self.known_with_capability(cap)
            .min_by(|a, b| {
                from.distance2(a.pos)
                    .partial_cmp(&from.distance2(b.pos))
                    .unwrap()
            })
    }

    /// The closest remembered entity of a specific def name to `from`,
    /// regardless of capability - used to resolve a discovered
    /// harvest/storage target back to the sighting that matches it.
    pub fn nearest_with_def_name(&self, from: WorldPosition, def_name: DefNameId) -> Option<WorldMemoryEntry> {
        self.known_world
            .values()
            .filter(|entry| entry.def_name_id == def_name)
            .min_by(|a, b| {
                from.distance2(a.pos)
                    .partial_cmp(&from.distance2(b.pos))
                    .unwrap()
            })
            .copied()
    }
}
