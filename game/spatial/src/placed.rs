use unit::WorldPosition;

/// A statically-placed entity that has not (yet) been promoted into the ECS
/// - most world entities stay here forever and are only given a live
/// [`ecs::EntityId`](../ecs/struct.EntityId.html) when interacted with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacedEntity {
    pub def_name: assets::DefNameId,
    pub position: WorldPosition,
}

impl PlacedEntity {
    pub fn new(def_name: assets::DefNameId, position: WorldPosition) -> Self {
        Self { def_name, position }
    }
}
