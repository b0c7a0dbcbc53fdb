use std::sync::Arc;

use assets::{AssetCatalog, DefNameId};
use ecs::{EntityId, World};
use unit::WorldPosition;

use crate::components::{Colonist, Inventory, WorkQueue};

const CLICK_RADIUS: f32 = 2.0;

/// What a click resolved to, in priority order: a live colonist outranks a
/// crafting station, which outranks a storage container, which outranks a
/// placed-but-never-promoted world entity.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Selection {
    Colonist(EntityId),
    Station(EntityId),
    Storage(EntityId),
    WorldEntity { def_name: DefNameId, pos: WorldPosition },
}

/// Resolves `click` against colonists, stations, and storage containers in
/// `world`, falling back to placed world entities with any capability if
/// nothing ECS-side is within [`CLICK_RADIUS`].
pub fn resolve_click(world: &World, catalog: &AssetCatalog, executor: &dyn WorldEntityLookup, click: WorldPosition) -> Option<Selection> {
    let radius2 = CLICK_RADIUS * CLICK_RADIUS;

    let mut nearest_colonist: Option<(EntityId, f32)> = None;
    world.view2::<crate::components::Position, Colonist>(|entity, pos, _colonist| {
        let d2 = pos.0.distance2(click);
        if d2 <= radius2 && nearest_colonist.map(|(_, best)| d2 < best).unwrap_or(true) {
            nearest_colonist = Some((entity, d2));
        }
    });
    if let Some((entity, _)) = nearest_colonist {
        return Some(Selection::Colonist(entity));
    }

    let mut nearest_station: Option<(EntityId, f32)> = None;
    world.view3::<crate::components::Position, crate::components::Appearance, WorkQueue>(
        |entity, pos, _appearance, _queue| {
            let d2 = pos.0.distance2(click);
            if d2 <= radius2 && nearest_station.map(|(_, best)| d2 < best).unwrap_or(true) {
                nearest_station = Some((entity, d2));
            }
        },
    );
    if let Some((entity, _)) = nearest_station {
        return Some(Selection::Station(entity));
    }

    let mut nearest_storage: Option<(EntityId, f32)> = None;
    world.view3::<crate::components::Position, crate::components::Appearance, Inventory>(
        |entity, pos, _appearance, _inventory| {
            if world.has_component::<Colonist>(entity) || world.has_component::<WorkQueue>(entity) {
                return;
            }
            let d2 = pos.0.distance2(click);
            if d2 <= radius2 && nearest_storage.map(|(_, best)| d2 < best).unwrap_or(true) {
                nearest_storage = Some((entity, d2));
            }
        },
    );
    if let Some((entity, _)) = nearest_storage {
        return Some(Selection::Storage(entity));
    }

    executor
        .nearest_with_capability(click, CLICK_RADIUS)
        .filter(|(def_name, _)| !catalog.capability_mask(*def_name).is_empty())
        .map(|(def_name, pos)| Selection::WorldEntity { def_name, pos })
}

/// Narrow seam between [`resolve_click`] and [`placement::PlacementExecutor`]
/// so this module doesn't need to know about chunk coordinates or the
/// executor's locking scheme.
pub trait WorldEntityLookup {
    fn nearest_with_capability(&self, pos: WorldPosition, radius: f32) -> Option<(DefNameId, WorldPosition)>;
}

impl WorldEntityLookup for placement::PlacementExecutor {
    /// Scans every chunk whose processed spatial index might hold something
    /// within `radius` of `pos`, same ring-query shape as [`crate::vision::VisionSystem`].
    fn nearest_with_capability(&self, pos: WorldPosition, radius: f32) -> Option<(DefNameId, WorldPosition)> {
        let chunk_radius = (radius / unit::dim::CHUNK_SIZE.as_f32()).ceil() as i32 + 1;
        let home_chunk = pos.chunk();

        let mut nearest: Option<(DefNameId, WorldPosition, f32)> = None;
        for coord in home_chunk.ring(chunk_radius) {
            let index = match self.get_chunk_index(coord) {
                Some(i) => i,
                None => continue,
            };
            for placed in index.read().query_radius(pos, radius, spatial::EntityFilter::Any) {
                let d2 = pos.distance2(placed.position);
                if nearest.map(|(_, _, best)| d2 < best).unwrap_or(true) {
                    nearest = Some((placed.def_name, placed.position, d2));
                }
            }
        }
        nearest.map(|(def_name, pos, _)| (def_name, pos))
    }
}

/// Placement mode the UI is currently in, driving ghost rendering and what a
/// click does.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PlacementMode {
    #[default]
    None,
    MenuOpen,
    Placing {
        def_name: DefNameId,
        ghost_pos: WorldPosition,
    },
}

/// Host-provided outcome of a successful [`PlacementState::try_place`] call:
/// either spawn a brand new entity, or redirect an already-crafted
/// [`crate::components::Packaged`] entity to `pos`.
pub enum PlaceOutcome {
    SpawnEntity { def_name: DefNameId, pos: WorldPosition },
    RetargetPackaged { entity: EntityId, pos: WorldPosition },
}

/// Tracks the currently open placement menu and ghost position, and the
/// current [`Selection`]. Notifies registered listeners whenever either
/// changes; owns no rendering state itself.
pub struct PlacementState {
    mode: PlacementMode,
    selection: Option<Selection>,
    on_selection_changed: Vec<Box<dyn Fn(Option<Selection>)>>,
    on_mode_changed: Vec<Box<dyn Fn(&PlacementMode)>>,
}

impl Default for PlacementState {
    fn default() -> Self {
        Self {
            mode: PlacementMode::None,
            selection: None,
            on_selection_changed: Vec::new(),
            on_mode_changed: Vec::new(),
        }
    }
}

impl PlacementState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &PlacementMode {
        &self.mode
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn on_selection_changed(&mut self, listener: impl Fn(Option<Selection>) + 'static) {
        self.on_selection_changed.push(Box::new(listener));
    }

    pub fn on_mode_changed(&mut self, listener: impl Fn(&PlacementMode) + 'static) {
        self.on_mode_changed.push(Box::new(listener));
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
        for listener in &self.on_selection_changed {
            listener(selection);
        }
    }

    pub fn open_menu(&mut self) {
        self.set_mode(PlacementMode::MenuOpen);
    }

    pub fn begin_placing(&mut self, def_name: DefNameId, ghost_pos: WorldPosition) {
        self.set_mode(PlacementMode::Placing { def_name, ghost_pos });
    }

    pub fn move_ghost(&mut self, pos: WorldPosition) {
        if let PlacementMode::Placing { def_name, .. } = self.mode {
            self.set_mode(PlacementMode::Placing { def_name, ghost_pos: pos });
        }
    }

    pub fn cancel(&mut self) {
        self.set_mode(PlacementMode::None);
    }

    fn set_mode(&mut self, mode: PlacementMode) {
        self.mode = mode;
        for listener in &self.on_mode_changed {
            listener(&self.mode);
        }
    }

    /// Validates the current placement (must actually be in `Placing` mode
    /// with a catalog-known defName) and, if valid, clears back to `None`
    /// and returns the outcome for the caller to apply via `callback`.
    pub fn try_place(
        &mut self,
        catalog: &AssetCatalog,
        retarget: Option<EntityId>,
        callback: impl FnOnce(PlaceOutcome),
    ) -> bool {
        let (def_name, pos) = match self.mode {
            PlacementMode::Placing { def_name, ghost_pos } => (def_name, ghost_pos),
            _ => return false,
        };

        if catalog.get_def_by_id(def_name).is_none() {
            return false;
        }

        let outcome = match retarget {
            Some(entity) => PlaceOutcome::RetargetPackaged { entity, pos },
            None => PlaceOutcome::SpawnEntity { def_name, pos },
        };
        callback(outcome);
        self.cancel();
        true
    }
}

#[allow(dead_code)]
fn _assert_catalog_is_arc(_: Arc<AssetCatalog>) {}

#[cfg(test)]
mod tests {
    use unit::WorldPosition;

    use super::*;
    use crate::components::Position;

    struct NoWorldEntities;
    impl WorldEntityLookup for NoWorldEntities {
        fn nearest_with_capability(&self, _pos: WorldPosition, _radius: f32) -> Option<(DefNameId, WorldPosition)> {
            None
        }
    }

    fn catalog() -> AssetCatalog {
        AssetCatalog::build(vec![])
    }

    #[test]
    fn click_prefers_colonist_over_everything_else() {
        let mut world = World::new();
        let colonist = world.create_entity();
        world.add_component(colonist, Position(WorldPosition::new(0.0, 0.0)));
        world.add_component(colonist, Colonist { name: "Bob".to_owned() });

        let station = world.create_entity();
        world.add_component(station, Position(WorldPosition::new(0.1, 0.0)));
        world.add_component(station, crate::components::Appearance::default());
        world.add_component(station, WorkQueue::default());

        let catalog = catalog();
        let selection = resolve_click(&world, &catalog, &NoWorldEntities, WorldPosition::new(0.0, 0.0));
        assert_eq!(selection, Some(Selection::Colonist(colonist)));
    }

    #[test]
    fn click_with_nothing_nearby_selects_nothing() {
        let world = World::new();
        let catalog = catalog();
        let selection = resolve_click(&world, &catalog, &NoWorldEntities, WorldPosition::new(0.0, 0.0));
        assert_eq!(selection, None);
    }

    #[test]
    fn placement_mode_transitions_and_notifies_listeners() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        let mut state = PlacementState::new();
        state.on_mode_changed(move |mode| seen2.borrow_mut().push(mode.clone()));

        state.open_menu();
        state.begin_placing(DefNameId::new(1), WorldPosition::ORIGIN);
        state.cancel();

        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(*seen.borrow().last().unwrap(), PlacementMode::None);
    }

    #[test]
    fn try_place_fails_outside_placing_mode() {
        let mut state = PlacementState::new();
        let catalog = catalog();
        let placed = state.try_place(&catalog, None, |_| panic!("should not be called"));
        assert!(!placed);
    }
}
