use std::time::Instant;

use ahash::AHashMap;

use assets::DefNameId;
use ecs::EntityId;
use unit::WorldPosition;

use crate::kinds::TaskKind;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Ord, PartialOrd)]
pub struct GoalId(u64);

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GoalStatus {
    Available,
    InProgress,
    /// Blocked on a dependent goal (e.g. a haul) supplying items
    WaitingForItems,
    /// Can't currently be progressed (e.g. crafting station missing an input)
    Blocked,
    Complete,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum GoalOwner {
    Storage,
    Crafting,
    Build,
    None,
}

/// A unit of colony work tracked independently of any one colonist.
/// Hierarchical: a crafting goal blocked on missing inputs spawns
/// child haul goals, which `notify_goal_completed` reports back up.
#[derive(Clone, Debug)]
pub struct GoalTask {
    pub id: GoalId,
    pub kind: TaskKind,
    pub status: GoalStatus,
    pub owner: GoalOwner,
    pub destination: Option<EntityId>,
    pub destination_pos: Option<WorldPosition>,
    pub item_def_name: Option<DefNameId>,
    pub quantity: u32,
    pub delivered: u32,
    pub parent: Option<GoalId>,
    pub assigned_to: Option<EntityId>,
    /// A sibling goal this one can't proceed past `WaitingForItems` until
    /// complete, e.g. a Haul waiting on the Harvest that feeds it. Distinct
    /// from `parent`, which is about cascade-delete and Blocked rollup.
    pub depends_on: Option<GoalId>,
    /// Links a harvest-then-haul pair so a single colonist prefers to see
    /// both legs through. See the GLOSSARY's "Chain" entry.
    pub chain_id: Option<u64>,
}

impl GoalTask {
    pub fn is_satisfied(&self) -> bool {
        self.delivered >= self.quantity
    }
}

/// Key identifying a reservable unit of source material: a specific source
/// entity and the item it offers. Two haul goals targeting the same pile
/// can't both claim it.
pub type ItemKey = (EntityId, DefNameId);

#[derive(Default)]
pub struct GoalRegistry {
    next_id: u64,
    goals: AHashMap<GoalId, GoalTask>,
    by_destination: AHashMap<EntityId, Vec<GoalId>>,
    reservations: AHashMap<ItemKey, (GoalId, EntityId, Instant)>,
    /// `parent -> children`, for cascade delete and Blocked rollup.
    children: AHashMap<GoalId, Vec<GoalId>>,
    /// `depends_on -> dependents`, for `WaitingForItems -> Available` on
    /// dependency completion. Populated only via `set_dependency`, distinct
    /// from the parent/child hierarchy above.
    dependents: AHashMap<GoalId, Vec<GoalId>>,
}

impl GoalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_goal(
        &mut self,
        kind: TaskKind,
        owner: GoalOwner,
        destination: Option<EntityId>,
        destination_pos: Option<WorldPosition>,
        item_def_name: Option<DefNameId>,
        quantity: u32,
        parent: Option<GoalId>,
    ) -> GoalId {
        self.next_id += 1;
        let id = GoalId(self.next_id);
        let goal = GoalTask {
            id,
            kind,
            status: GoalStatus::Available,
            owner,
            destination,
            destination_pos,
            item_def_name,
            quantity,
            delivered: 0,
            parent,
            assigned_to: None,
            depends_on: None,
            chain_id: None,
        };
        if let Some(dest) = destination {
            self.by_destination.entry(dest).or_default().push(id);
        }
        if let Some(parent_id) = parent {
            self.children.entry(parent_id).or_default().push(id);
        }
        self.goals.insert(id, goal);
        id
    }

    /// Marks `goal` as unable to leave `WaitingForItems` until `depends_on`
    /// completes. Does not itself change `goal`'s status - the caller
    /// sets it to `WaitingForItems` (or leaves it `Available` if there's
    /// nothing to wait for).
    pub fn set_dependency(&mut self, goal: GoalId, depends_on: GoalId) {
        if let Some(task) = self.goals.get_mut(&goal) {
            task.depends_on = Some(depends_on);
        }
        self.dependents.entry(depends_on).or_default().push(goal);
    }

    pub fn set_chain_id(&mut self, goal: GoalId, chain_id: u64) {
        if let Some(task) = self.goals.get_mut(&goal) {
            task.chain_id = Some(chain_id);
        }
    }

    pub fn get(&self, id: GoalId) -> Option<&GoalTask> {
        self.goals.get(&id)
    }

    pub fn get_mut(&mut self, id: GoalId) -> Option<&mut GoalTask> {
        self.goals.get_mut(&id)
    }

    pub fn goal_for_destination(&self, destination: EntityId) -> Option<&GoalTask> {
        self.by_destination
            .get(&destination)?
            .iter()
            .filter_map(|id| self.goals.get(id))
            .find(|g| g.status != GoalStatus::Complete)
    }

    pub fn goals_by_type(&self, kind: TaskKind) -> impl Iterator<Item = &GoalTask> {
        self.goals.values().filter(move |g| g.kind == kind)
    }

    pub fn goals_by_owner(&self, owner: GoalOwner) -> impl Iterator<Item = &GoalTask> {
        self.goals.values().filter(move |g| g.owner == owner)
    }

    /// Removes a goal and every descendant spawned under it (e.g. a
    /// cancelled crafting goal takes its haul children with it).
    pub fn remove_goal_with_children(&mut self, id: GoalId) {
        let children = self.children.remove(&id).unwrap_or_default();
        for child in children {
            self.remove_goal_with_children(child);
        }
        self.dependents.remove(&id);
        if let Some(goal) = self.goals.remove(&id) {
            if let Some(dest) = goal.destination {
                if let Some(list) = self.by_destination.get_mut(&dest) {
                    list.retain(|g| *g != id);
                }
            }
            if let Some(parent) = goal.parent {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.retain(|g| *g != id);
                }
            }
        }
        self.reservations.retain(|_, (goal_id, ..)| *goal_id != id);
        self.dependents.remove(&id);
        for dependents in self.dependents.values_mut() {
            dependents.retain(|g| *g != id);
        }
    }

    /// Called when `id` completes: every dependent goal (one that named
    /// `id` via `set_dependency`) flips `WaitingForItems -> Available`, and
    /// if `id`'s parent is `Blocked` and every one of its children is now
    /// `Complete`, the parent flips `Blocked -> Available` too.
    pub fn notify_goal_completed(&mut self, id: GoalId) {
        if let Some(goal) = self.goals.get_mut(&id) {
            goal.status = GoalStatus::Complete;
        }

        if let Some(dependents) = self.dependents.get(&id).cloned() {
            for dependent in dependents {
                if let Some(task) = self.goals.get_mut(&dependent) {
                    if task.status == GoalStatus::WaitingForItems {
                        task.status = GoalStatus::Available;
                    }
                }
            }
        }

        if let Some(parent_id) = self.goals.get(&id).and_then(|g| g.parent) {
            let all_children_complete = self
                .children
                .get(&parent_id)
                .map(|children| {
                    children
                        .iter()
                        .all(|c| self.goals.get(c).map(|g| g.status == GoalStatus::Complete).unwrap_or(true))
                })
                .unwrap_or(false);

            if all_children_complete {
                if let Some(parent) = self.goals.get_mut(&parent_id) {
                    if parent.status == GoalStatus::Blocked {
                        parent.status = GoalStatus::Available;
                    }
                }
            }
        }
    }

    /// Claims `item` for `goal`/`colonist` if unclaimed or already claimed by
    /// the same goal. Returns `false` if another goal holds it.
    pub fn reserve_item(&mut self, item: ItemKey, goal: GoalId, colonist: EntityId, now: Instant) -> bool {
        match self.reservations.get(&item) {
            Some((existing_goal, ..)) if *existing_goal != goal => false,
            _ => {
                self.reservations.insert(item, (goal, colonist, now));
                true
            }
        }
    }

    pub fn release_item(&mut self, item: ItemKey) {
        self.reservations.remove(&item);
    }

    /// Claims `id` for `colonist` if it's `Available` and unassigned,
    /// flipping it to `InProgress`. Returns `false` if someone else already
    /// holds it or it isn't currently claimable.
    pub fn claim(&mut self, id: GoalId, colonist: EntityId) -> bool {
        match self.goals.get_mut(&id) {
            Some(task) if task.status == GoalStatus::Available && task.assigned_to.is_none() => {
                task.status = GoalStatus::InProgress;
                task.assigned_to = Some(colonist);
                true
            }
            _ => false,
        }
    }

    /// Releases `colonist`'s claim on `id`, returning it to `Available` so
    /// another colonist may pick it up - used when a re-evaluation abandons
    /// the task before completion. A no-op if `colonist` doesn't hold it.
    pub fn release_claim(&mut self, id: GoalId, colonist: EntityId) {
        if let Some(task) = self.goals.get_mut(&id) {
            if task.assigned_to == Some(colonist) {
                task.assigned_to = None;
                if task.status == GoalStatus::InProgress {
                    task.status = GoalStatus::Available;
                }
            }
        }
    }

    pub fn record_delivery(&mut self, id: GoalId, qty: u32) {
        if let Some(goal) = self.goals.get_mut(&id) {
            goal.delivered += qty;
            if goal.is_satisfied() {
                drop(goal);
                self.notify_goal_completed(id);
            }
        }
    }

    /// Releases any reservation older than `timeout` seconds. Intended for a
    /// periodic reservation-stale-sweep run from a low-priority system, not
    /// on every tick.
    pub fn release_stale(&mut self, now: Instant, timeout: f32) -> Vec<ItemKey> {
        let mut released = Vec::new();
        self.reservations.retain(|item, (_, _, reserved_at)| {
            let stale = now.duration_since(*reserved_at).as_secs_f32() >= timeout;
            if stale {
                released.push(*item);
            }
            !stale
        });
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(i: u32) -> EntityId {
        let mut world = ecs::World::new();
        for _ in 0..i {
            world.create_entity();
        }
        world.create_entity()
    }

    #[test]
    fn cascading_delete_removes_children() {
        let mut registry = GoalRegistry::new();
        let parent = registry.create_goal(TaskKind::Craft, GoalOwner::Crafting, None, None, None, 1, None);
        let child = registry.create_goal(TaskKind::Haul, GoalOwner::Crafting, None, None, None, 1, Some(parent));

        registry.remove_goal_with_children(parent);
        assert!(registry.get(parent).is_none());
        assert!(registry.get(child).is_none());
    }

    #[test]
    fn completing_child_unblocks_blocked_parent() {
        let mut registry = GoalRegistry::new();
        let parent = registry.create_goal(TaskKind::Craft, GoalOwner::Crafting, None, None, None, 1, None);
        registry.get_mut(parent).unwrap().status = GoalStatus::Blocked;
        let child = registry.create_goal(TaskKind::Haul, GoalOwner::Crafting, None, None, None, 1, Some(parent));

        registry.notify_goal_completed(child);
        assert_eq!(registry.get(parent).unwrap().status, GoalStatus::Available);
    }

    #[test]
    fn reservation_rejects_other_goal_but_allows_same() {
        let mut registry = GoalRegistry::new();
        let goal_a = registry.create_goal(TaskKind::Haul, GoalOwner::None, None, None, None, 1, None);
        let goal_b = registry.create_goal(TaskKind::Haul, GoalOwner::None, None, None, None, 1, None);
        let colonist = entity(1);
        let source = entity(2);
        let item = (source, DefNameId::new(1));
        let now = Instant::now();

        assert!(registry.reserve_item(item, goal_a, colonist, now));
        assert!(!registry.reserve_item(item, goal_b, colonist, now));
        assert!(registry.reserve_item(item, goal_a, colonist, now));
    }

    #[test]
    fn stale_reservations_are_released() {
        let mut registry = GoalRegistry::new();
        let goal = registry.create_goal(TaskKind::Haul, GoalOwner::None, None, None, None, 1, None);
        let colonist = entity(1);
        let source = entity(2);
        let item = (source, DefNameId::new(1));
        let then = Instant::now();

        registry.reserve_item(item, goal, colonist, then);
        let released = registry.release_stale(then + std::time::Duration::from_secs(60), 30.0);
        assert_eq!(released, vec![item]);
    }
}
