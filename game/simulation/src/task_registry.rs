use std::time::Instant;

use ahash::AHashMap;

use assets::DefNameId;
use ecs::EntityId;
use unit::WorldPosition;

use crate::kinds::TaskKind;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct DiscoveryTaskId(u64);

/// A lightweight, ungoverned task any colonist may notice and claim
/// on its own - a loose item to pick up, a harvestable in sight range -
/// as opposed to a goal-registry task that's produced deliberately by a
/// storage/crafting/build reconciler.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DiscoveryTask {
    pub id: DiscoveryTaskId,
    pub kind: TaskKind,
    pub target_pos: WorldPosition,
    pub target_def_name: DefNameId,
}

/// Reservation bookkeeping for discovery tasks, grounded in the same
/// entity<->task double-map pattern as the goal registry's item
/// reservations: a task claimed by one colonist is unavailable to others
/// until released, and releasing by entity also frees its task.
#[derive(Default)]
pub struct GlobalTaskRegistry {
    next_id: u64,
    tasks: AHashMap<DiscoveryTaskId, DiscoveryTask>,
    entity_to_task: AHashMap<EntityId, DiscoveryTaskId>,
    task_to_entity: AHashMap<DiscoveryTaskId, EntityId>,
    reserved_at: AHashMap<DiscoveryTaskId, Instant>,
}

impl GlobalTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discover(&mut self, kind: TaskKind, target_pos: WorldPosition, target_def_name: DefNameId) -> DiscoveryTaskId {
        self.next_id += 1;
        let id = DiscoveryTaskId(self.next_id);
        self.tasks.insert(id, DiscoveryTask { id, kind, target_pos, target_def_name });
        id
    }

    pub fn get(&self, id: DiscoveryTaskId) -> Option<&DiscoveryTask> {
        self.tasks.get(&id)
    }

    fn find_existing(&self, kind: TaskKind, target_pos: WorldPosition, target_def_name: DefNameId) -> Option<DiscoveryTaskId> {
        self.tasks
            .values()
            .find(|t| t.kind == kind && t.target_pos == target_pos && t.target_def_name == target_def_name)
            .map(|t| t.id)
    }

    /// Finds the existing discovery task for this sighting, creating one if
    /// this is the first colonist to notice it, then reserves it for
    /// `entity`. Returns `None` if another colonist already holds it.
    pub fn claim(
        &mut self,
        kind: TaskKind,
        target_pos: WorldPosition,
        target_def_name: DefNameId,
        entity: EntityId,
        now: Instant,
    ) -> Option<DiscoveryTaskId> {
        let id = self
            .find_existing(kind, target_pos, target_def_name)
            .unwrap_or_else(|| self.discover(kind, target_pos, target_def_name));
        if self.is_available_to(id, entity) {
            self.reserve(entity, id, now);
            Some(id)
        } else {
            None
        }
    }

    pub fn remove_task(&mut self, id: DiscoveryTaskId) {
        self.tasks.remove(&id);
        self.reserved_at.remove(&id);
        if let Some(entity) = self.task_to_entity.remove(&id) {
            self.entity_to_task.remove(&entity);
        }
    }

    /// Reserves `task` for `entity`, replacing any previous reservation
    /// either side held. Returns the displaced task (if `entity` held a
    /// different one) and the displaced entity (if `task` was held by
    /// someone else).
    pub fn reserve(&mut self, entity: EntityId, task: DiscoveryTaskId, now: Instant) -> (Option<DiscoveryTaskId>, Option<EntityId>) {
        let old_task = self.entity_to_task.insert(entity, task);
        if let Some(old) = old_task {
            self.task_to_entity.remove(&old);
        }
        let old_entity = self.task_to_entity.insert(task, entity);
        self.reserved_at.insert(task, now);
        (old_task, old_entity)
    }

    pub fn unreserve(&mut self, entity: EntityId) -> Option<DiscoveryTaskId> {
        let task = self.entity_to_task.remove(&entity)?;
        self.task_to_entity.remove(&task);
        self.reserved_at.remove(&task);
        Some(task)
    }

    /// Not reserved, or already reserved by `entity` itself.
    pub fn is_available_to(&self, task: DiscoveryTaskId, entity: EntityId) -> bool {
        match self.task_to_entity.get(&task) {
            Some(e) => *e == entity,
            None => true,
        }
    }

    /// Unreserves (but does not delete) every task whose reservation has
    /// aged past `timeout` seconds. Mirrors the goal registry's stale sweep.
    pub fn release_stale(&mut self, now: Instant, timeout: f32) -> Vec<DiscoveryTaskId> {
        let stale: Vec<DiscoveryTaskId> = self
            .reserved_at
            .iter()
            .filter(|(_, reserved_at)| now.duration_since(**reserved_at).as_secs_f32() >= timeout)
            .map(|(id, _)| *id)
            .collect();

        for id in &stale {
            if let Some(entity) = self.task_to_entity.remove(id) {
                self.entity_to_task.remove(&entity);
            }
            self.reserved_at.remove(id);
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(n: u32) -> EntityId {
        let mut world = ecs::World::new();
        for _ in 0..n {
            world.create_entity();
        }
        world.create_entity()
    }

    #[test]
    fn reserving_a_task_displaces_previous_holder() {
        let mut registry = GlobalTaskRegistry::new();
        let task = registry.discover(TaskKind::Gather, WorldPosition::ORIGIN, DefNameId::new(1));
        let a = entity(1);
        let b = entity(2);
        let now = Instant::now();

        registry.reserve(a, task, now);
        assert!(!registry.is_available_to(task, b));

        let (_, displaced) = registry.reserve(b, task, now);
        assert_eq!(displaced, Some(a));
        assert!(registry.is_available_to(task, b));
    }

    #[test]
    fn unreserve_frees_the_task() {
        let mut registry = GlobalTaskRegistry::new();
        let task = registry.discover(TaskKind::Gather, WorldPosition::ORIGIN, DefNameId::new(1));
        let a = entity(1);
        registry.reserve(a, task, Instant::now());

        assert_eq!(registry.unreserve(a), Some(task));
        assert!(registry.is_available_to(task, entity(2)));
    }

    #[test]
    fn claim_dedupes_repeat_sightings_of_the_same_target() {
        let mut registry = GlobalTaskRegistry::new();
        let a = entity(1);
        let b = entity(2);
        let now = Instant::now();
        let def = DefNameId::new(1);

        let first = registry.claim(TaskKind::Harvest, WorldPosition::ORIGIN, def, a, now).unwrap();
        // b sees the same tile again; must not spawn a second task, and
        // must fail to claim it since a already holds it.
        assert!(registry.claim(TaskKind::Harvest, WorldPosition::ORIGIN, def, b, now).is_none());
        assert_eq!(registry.tasks.len(), 1);

        registry.unreserve(a);
        let reclaimed = registry.claim(TaskKind::Harvest, WorldPosition::ORIGIN, def, b, now).unwrap();
        assert_eq!(reclaimed, first);
    }

    #[test]
    fn stale_reservation_is_released() {
        let mut registry = GlobalTaskRegistry::new();
        let task = registry.discover(TaskKind::Gather, WorldPosition::ORIGIN, DefNameId::new(1));
        let a = entity(1);
        let then = Instant::now();
        registry.reserve(a, task, then);

        let released = registry.release_stale(then + std::time::Duration::from_secs(60), 30.0);
        assert_eq!(released, vec![task]);
        assert!(registry.is_available_to(task, entity(2)));
    }
}
