use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use common::*;

use assets::{AssetCatalog, Capability, DefNameId, RecipeCatalog};
use ecs::{EntityId, System, World};
use placement::PlacementExecutor;
use unit::WorldPosition;

use crate::components::{
    Action, ActionKind, ActionState, ActiveAction, Inventory, Memory, NeedEffect, NeedsComponent,
    Packaged, Position, Task, TaskState, WorkQueue,
};
use crate::goal::GoalRegistry;
use crate::kinds::{Need, TaskKind};
use crate::task_registry::GlobalTaskRegistry;

const EAT_DURATION: f32 = 2.0;
const EAT_FALLBACK_NUTRITION: f32 = 0.3;
const EAT_RESTORE_PER_NUTRITION: f32 = 100.0;

const DRINK_DURATION: f32 = 1.5;
const DRINK_BASE_RESTORE: f32 = 40.0;
const DRINK_BLADDER_SIDE_EFFECT: f32 = 15.0;

const SLEEP_DURATION: f32 = 8.0;
const SLEEP_BASE_RESTORE: f32 = 60.0;
const SLEEP_GROUND_FALLBACK_QUALITY: f32 = 0.5;
const SLEEP_BED_QUALITY: f32 = 1.0;

const TOILET_DURATION: f32 = 3.0;
const TOILET_RESTORE: f32 = 100.0;

const GATHER_DURATION: f32 = 1.0;
const HAUL_LEG_DURATION: f32 = 1.0;
const PLACE_PACKAGED_DURATION: f32 = 0.5;

/// Host-provided hooks the simulation invokes but cannot satisfy on its
/// own: spawning a freshly crafted entity into the world, and optional
/// observers for UI/save-game bookkeeping registered once as callbacks
/// rather than through a global event bus.
pub trait WorldCallbacks {
    fn spawn_entity(&mut self, world: &mut World, def_name: DefNameId, pos: WorldPosition) -> EntityId;

    fn recipe_discovered(&mut self, _label: &str) {}

    fn item_crafted(&mut self, _label: &str) {}
}

/// What to do with an entity this tick, computed while the ECS view is
/// held. Applying it may need component types outside the 5-wide view, so
/// it happens in a second pass once the view's borrow is released.
enum Resolution {
    /// Not a kind `ActionSystem` handles - clear `Task` and `Action`.
    NotOurs,
    /// An `Action` is mid-flight; nothing to apply yet.
    InProgress,
    /// The action finished this tick - apply its effects and clear the task.
    Complete {
        kind: ActionKind,
        primary: Option<NeedEffect>,
        side: Option<NeedEffect>,
    },
}

/// Drives each colonist's [`Action`] from construction through completion
/// once its [`Task`] has arrived at its target, applying the task's effect
/// and clearing both on completion. Priority 350, after movement and
/// physics so an action never starts before the colonist has actually
/// reached its target this tick.
pub struct ActionSystem {
    catalog: Arc<AssetCatalog>,
    recipes: Arc<RecipeCatalog>,
    goals: Rc<RefCell<GoalRegistry>>,
    #[allow(dead_code)]
    tasks: Rc<RefCell<GlobalTaskRegistry>>,
    executor: Rc<RefCell<PlacementExecutor>>,
    callbacks: Box<dyn WorldCallbacks>,
    rng: SmallRng,
}

impl ActionSystem {
    pub fn new(
        catalog: Arc<AssetCatalog>,
        recipes: Arc<RecipeCatalog>,
        goals: Rc<RefCell<GoalRegistry>>,
        tasks: Rc<RefCell<GlobalTaskRegistry>>,
        executor: Rc<RefCell<PlacementExecutor>>,
        callbacks: Box<dyn WorldCallbacks>,
        seed: u64,
    ) -> Self {
        Self {
            catalog,
            recipes,
            goals,
            tasks,
            executor,
            callbacks,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Looks up nutrition for the colonist's target food, preferring
    /// whatever's already in the backpack over the memory-resolved target
    /// so a carried item is eaten without the decision evaluator needing
    /// to know about hands/inventory at all.
    fn eat_nutrition(&self, inventory: Option<&Inventory>, target: Option<DefNameId>) -> f32 {
        let held = inventory.and_then(|inv| {
                inv.backpack
                    .keys()
                    .copied()
                    .find(|&def| self.catalog.has_capability(def, Capability::Edible))
        });

        held.or(target)
            .and_then(|def| self.catalog.get_def_by_id(def))
            .and_then(|d| d.item.as_ref())
            .and_then(|i| i.edible_nutrition)
            .unwrap_or(EAT_FALLBACK_NUTRITION)
    }

    fn drink_quality(&self, target: Option<DefNameId>) -> f32 {
        target
            .and_then(|def| self.catalog.get_def_by_id(def))
            .and_then(|d| d.item.as_ref())
            .and_then(|i| i.edible_quality)
            .unwrap_or_default()
            .as_factor()
    }

    /// Builds the `ActiveAction` for a freshly-arrived task. `None` means
    /// the task can't be started (missing catalog data, or a kind with no
    /// handler), which the caller treats the same as `NotOurs`.
    fn construct_action(&self, task: &Task, inventory: Option<&Inventory>) -> Option<ActiveAction> {
        match task.kind {
            TaskKind::FulfillNeed => match task.need_to_fulfill {
                Some(Need::Hunger) => {
                    let nutrition = self.eat_nutrition(inventory, task.target_def_name_id);
                    Some(ActiveAction::new(ActionKind::Eat { nutrition }, EAT_DURATION).with_effects(
                            Some(NeedEffect {
                                    need: Need::Hunger,
                                    amount: nutrition * EAT_RESTORE_PER_NUTRITION,
                            }),
                            None,
                    ))
                }
                Some(Need::Thirst) => {
                    let quality = self.drink_quality(task.target_def_name_id);
                    Some(ActiveAction::new(ActionKind::Drink { quality }, DRINK_DURATION).with_effects(
                            Some(NeedEffect {
                                    need: Need::Thirst,
                                    amount: DRINK_BASE_RESTORE * quality,
                            }),
                            Some(NeedEffect {
                                    need: Need::Bladder,
                                    amount: -DRINK_BLADDER_SIDE_EFFECT,
                            }),
                    ))
                }
                Some(Need::Energy) => {
                    let quality = if task.target_def_name_id.is_none() {
                        SLEEP_GROUND_FALLBACK_QUALITY
                    } else {
                        SLEEP_BED_QUALITY
                    };
                    Some(ActiveAction::new(ActionKind::Sleep { quality }, SLEEP_DURATION).with_effects(
                            Some(NeedEffect {
                                    need: Need::Energy,
                                    amount: SLEEP_BASE_RESTORE * quality,
                            }),
                            None,
                    ))
                }
                Some(Need::Bladder) => {
                    let spawn_pos = task.target_pos.unwrap_or(WorldPosition::ORIGIN);
                    Some(ActiveAction::new(ActionKind::Toilet { spawn_pos }, TOILET_DURATION).with_effects(
                            Some(NeedEffect {
                                    need: Need::Bladder,
                                    amount: TOILET_RESTORE,
                            }),
                            None,
                    ))
                }
                _ => None,
            },
            TaskKind::Harvest => {
                let def_name = task.target_def_name_id?;
                let harvestable = self.catalog.get_def_by_id(def_name)?.harvestable.as_ref()?;
                Some(ActiveAction::new(
                        ActionKind::Harvest {
                            def_name,
                            destructive: harvestable.destructive,
                            yield_def_name: harvestable.yield_id,
                            count_min: harvestable.amount_min,
                            count_max: harvestable.amount_max,
                            has_pool: harvestable.total_pool.is_some(),
                        },
                        harvestable.duration,
                ))
            }
            TaskKind::Gather => {
                let def_name = task.target_def_name_id?;
                let source = task.target_pos?;
                Some(ActiveAction::new(ActionKind::Pickup { def_name, source }, GATHER_DURATION))
            }
            // Haul is a two-leg task: pick up at `haul_source` (chain_step
            // 0), then drop off at `related_entity` (chain_step 1).
            TaskKind::Haul if task.chain_step == 0 => {
                let def_name = task.haul_item?;
                let source = task.haul_source?;
                Some(ActiveAction::new(ActionKind::Pickup { def_name, source }, HAUL_LEG_DURATION))
            }
            TaskKind::Haul => {
                let def_name = task.haul_item?;
                let destination = task.related_entity?;
                Some(ActiveAction::new(
                        ActionKind::DropOff {
                            def_name,
                            qty: 1,
                            destination,
                        },
                        HAUL_LEG_DURATION,
                ))
            }
            TaskKind::Craft => {
                let recipe = task.target_def_name_id?;
                let station = task.related_entity?;
                let work_amount = self.recipes.get_by_id(recipe).map(|r| r.work_amount).unwrap_or(1.0);
                Some(ActiveAction::new(ActionKind::Craft { recipe, station }, work_amount))
            }
            TaskKind::PlacePackaged => {
                let entity = task.related_entity?;
                Some(ActiveAction::new(
                        ActionKind::DropOff {
                            def_name: task.target_def_name_id.unwrap_or(DefNameId::INVALID),
                            qty: 1,
                            destination: entity,
                        },
                        PLACE_PACKAGED_DURATION,
                ))
            }
            TaskKind::Wander => None,
        }
    }

    fn resolve(&self, task: &mut Task, action: &mut Action, inventory: Option<&Inventory>, dt: f32) -> Resolution {
        if !matches!(
            task.kind,
            TaskKind::FulfillNeed | TaskKind::Gather | TaskKind::Craft | TaskKind::Haul | TaskKind::Harvest | TaskKind::PlacePackaged
        ) {
            return Resolution::NotOurs;
        }

        if action.0.is_none() {
            match self.construct_action(task, inventory) {
                Some(constructed) => action.0 = Some(constructed),
                None => return Resolution::NotOurs,
            }
        }

        let active = action.0.as_mut().expect("just constructed or already present");

        if active.state == ActionState::Starting {
            active.state = ActionState::InProgress;
        }
        active.elapsed += dt;

        if active.elapsed >= active.duration {
            active.state = ActionState::Complete;
            Resolution::Complete {
                kind: active.kind.clone(),
                primary: active.primary_effect,
                side: active.side_effect,
            }
        } else {
            Resolution::InProgress
        }
    }

    fn apply_completion(&mut self, world: &mut World, entity: EntityId, kind: ActionKind) {
        match kind {
            ActionKind::Eat { .. } | ActionKind::Drink { .. } | ActionKind::Sleep { .. } => {}
            ActionKind::Toilet { spawn_pos } => {
                if let Some(def_name) = self.catalog.get_def_name_id("BioPile") {
                    self.callbacks.spawn_entity(world, def_name, spawn_pos);
                }
            }
            ActionKind::Harvest {
                def_name,
                destructive,
                yield_def_name,
                count_min,
                count_max,
                has_pool,
            } => {
                let pos = world.get_component::<Position>(entity).map(|p| p.0).unwrap_or(WorldPosition::ORIGIN);
                let coord = pos.chunk();

                let amount = if count_max > count_min {
                    self.rng.gen_range(count_min, count_max + 1)
                } else {
                    count_min
                };

                if let Some(mut inv) = world.get_component_mut::<Inventory>(entity) {
                    inv.add_to_backpack(yield_def_name, amount);
                }

                let mut executor = self.executor.borrow_mut();
                let exhausted = has_pool && executor.decrement_resource_count(coord, pos, def_name);

                if destructive || exhausted {
                    executor.remove_entity(coord, pos, def_name);
                } else {
                    let regrowth = self
                        .catalog
                        .get_def_by_id(def_name)
                        .and_then(|d| d.harvestable.as_ref())
                        .map(|h| h.regrowth_seconds)
                        .unwrap_or(0.0);
                    executor.set_entity_cooldown(coord, pos, def_name, regrowth);
                }
                drop(executor);

                let goal_id = world.get_component::<Task>(entity).and_then(|t| t.related_goal);
                if let Some(id) = goal_id {
                    self.goals.borrow_mut().record_delivery(id, amount);
                }
            }
            ActionKind::Pickup { def_name, source: _ } => {
                if let Some(mut inv) = world.get_component_mut::<Inventory>(entity) {
                    inv.add_to_backpack(def_name, 1);
                }
                if let Some(mut task) = world.get_component_mut::<Task>(entity) {
                    task.chain_step = 1;
                    task.state = TaskState::Moving;
                }
            }
            ActionKind::DropOff { def_name, qty, destination } => {
                let moved = world
                    .get_component_mut::<Inventory>(entity)
                    .map(|mut inv| inv.remove_from_backpack(def_name, qty))
                    .unwrap_or(0);

                if let Some(mut dest_inv) = world.get_component_mut::<Inventory>(destination) {
                    dest_inv.add_to_backpack(def_name, moved.max(1));
                } else if let Some(mut packaged) = world.get_component_mut::<Packaged>(destination) {
                    packaged.being_carried = false;
                    packaged.target_pos = None;
                }

                let goal_id = self.goals.borrow().goal_for_destination(destination).map(|g| g.id);
                if let Some(id) = goal_id {
                    self.goals.borrow_mut().record_delivery(id, moved.max(1));
                }
            }
            ActionKind::Craft { recipe, station } => {
                if let Some(label) = self.recipes.get_by_id(recipe).map(|r| r.label.clone()) {
                    self.callbacks.item_crafted(&label);
                }
                if let Some(mut queue) = world.get_component_mut::<WorkQueue>(station) {
                    queue.complete_one();
                }
            }
        }
    }
}

impl System for ActionSystem {
    fn priority(&self) -> u32 {
        350
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        let mut completions: Vec<(EntityId, ActionKind, Option<NeedEffect>, Option<NeedEffect>)> = Vec::new();
        let mut clears: Vec<EntityId> = Vec::new();

        world.view5::<Position, Task, Action, NeedsComponent, Memory>(
            |entity, _pos, task, action, _needs, _memory| {
                if !matches!(task.state, TaskState::Arrived | TaskState::Acting) {
                    return;
                }

                let inventory = world.get_component::<Inventory>(entity);
                match self.resolve(task, action, inventory.as_deref(), dt) {
                    Resolution::NotOurs => clears.push(entity),
                    Resolution::InProgress => task.state = TaskState::Acting,
                    Resolution::Complete { kind, primary, side } => completions.push((entity, kind, primary, side)),
                }
            },
        );

        for entity in clears {
            if let Some(mut task) = world.get_component_mut::<Task>(entity) {
                *task = Task::idle();
            }
            if let Some(mut action) = world.get_component_mut::<Action>(entity) {
                action.0 = None;
            }
        }

        for (entity, kind, primary, side) in completions {
            if let Some(mut needs) = world.get_component_mut::<NeedsComponent>(entity) {
                if let Some(effect) = primary {
                    needs.apply(effect.need, effect.amount);
                }
                if let Some(effect) = side {
                    needs.apply(effect.need, effect.amount);
                }
            }

            self.apply_completion(world, entity, kind);

            // `apply_completion`'s Pickup branch advances a Haul to its
            // second leg rather than finishing the task outright.
            let still_hauling = world
                .get_component::<Task>(entity)
                .map(|t| t.kind == TaskKind::Haul && t.chain_step == 1 && t.state == TaskState::Moving)
                .unwrap_or(false);
            if still_hauling {
                if let Some(mut action) = world.get_component_mut::<Action>(entity) {
                    action.0 = None;
                }
                continue;
            }

            if let Some(mut task) = world.get_component_mut::<Task>(entity) {
                *task = Task::idle();
            }
            if let Some(mut action) = world.get_component_mut::<Action>(entity) {
                action.0 = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assets::{AssetDefinitionBuilder, ItemProperties};
    use placement::PlacementContext;

    use super::*;

    struct NoopCallbacks;

    impl WorldCallbacks for NoopCallbacks {
        fn spawn_entity(&mut self, world: &mut World, _def_name: DefNameId, _pos: WorldPosition) -> EntityId {
            world.create_entity()
        }
    }

    fn make_catalog() -> Arc<AssetCatalog> {
        let mut berry = AssetDefinitionBuilder::new("Berry");
        berry.capabilities |= Capability::Edible;
        berry.item = Some(ItemProperties {
                stack_size: 10,
                edible_nutrition: Some(0.5),
                edible_quality: None,
        });
        Arc::new(AssetCatalog::build(vec![berry]))
    }

    fn make_system(catalog: Arc<AssetCatalog>) -> ActionSystem {
        let recipes = Arc::new(RecipeCatalog::build(vec![], &catalog));
        let context = Arc::new(PlacementContext::new(catalog.clone(), 42));
        ActionSystem::new(
            catalog,
            recipes,
            Rc::new(RefCell::new(GoalRegistry::new())),
            Rc::new(RefCell::new(GlobalTaskRegistry::new())),
            Rc::new(RefCell::new(PlacementExecutor::new(context))),
            Box::new(NoopCallbacks),
            7,
        )
    }

    fn spawn_arrived(world: &mut World, task: Task) -> EntityId {
        let e = world.create_entity();
        world.add_component(e, Position(WorldPosition::ORIGIN));
        world.add_component(e, task);
        world.add_component(e, Action::default());
        world.add_component(e, NeedsComponent::default());
        world.add_component(e, Memory::new(20.0));
        e
    }

    #[test]
    fn eat_restores_hunger_after_duration() {
        let catalog = make_catalog();
        let berry_id = catalog.get_def_name_id("Berry").unwrap();
        let mut world = World::new();

        let mut task = Task::idle();
        task.kind = TaskKind::FulfillNeed;
        task.need_to_fulfill = Some(Need::Hunger);
        task.target_def_name_id = Some(berry_id);
        task.state = TaskState::Arrived;
        let e = spawn_arrived(&mut world, task);
        world.get_component_mut::<NeedsComponent>(e).unwrap().get_mut(Need::Hunger).value = 10.0;

        let mut system = make_system(catalog);
        system.update(&mut world, EAT_DURATION / 2.0);
        assert_eq!(world.get_component::<Task>(e).unwrap().state, TaskState::Acting);

        system.update(&mut world, EAT_DURATION);

        let needs = world.get_component::<NeedsComponent>(e).unwrap();
        assert!(needs.get(Need::Hunger).value > 10.0);
        assert_eq!(world.get_component::<Task>(e).unwrap().state, TaskState::Complete);
        assert!(world.get_component::<Action>(e).unwrap().0.is_none());
    }

    #[test]
    fn eats_from_backpack_before_memory_target() {
        let catalog = make_catalog();
        let berry_id = catalog.get_def_name_id("Berry").unwrap();
        let mut world = World::new();

        let mut task = Task::idle();
        task.kind = TaskKind::FulfillNeed;
        task.need_to_fulfill = Some(Need::Hunger);
        task.target_def_name_id = None;
        task.state = TaskState::Arrived;
        let e = spawn_arrived(&mut world, task);

        let mut inv = Inventory::new(4, 10);
        inv.add_to_backpack(berry_id, 1);
        world.add_component(e, inv);

        let mut system = make_system(catalog);
        system.update(&mut world, EAT_DURATION);

        let action = world.get_component::<Action>(e);
        assert!(action.is_none() || action.unwrap().0.is_none());
    }

    #[test]
    fn irrelevant_task_kind_is_cleared() {
        let catalog = make_catalog();
        let mut world = World::new();
        let mut task = Task::idle();
        task.kind = TaskKind::Wander;
        task.state = TaskState::Arrived;
        let e = spawn_arrived(&mut world, task);

        let mut system = make_system(catalog);
        system.update(&mut world, 1.0 / 60.0);

        assert_eq!(world.get_component::<Task>(e).unwrap().state, TaskState::Complete);
        assert!(world.get_component::<Action>(e).unwrap().0.is_none());
    }

    #[test]
    fn harvest_adds_yield_to_inventory_and_removes_destructive_entity() {
        let mut builder = AssetDefinitionBuilder::new("BerryBush");
        builder.capabilities |= Capability::Harvestable;
        builder.harvestable = Some(assets::HarvestableCapability {
                yield_def_name: "Berry".to_owned(),
                yield_id: DefNameId::new(1),
                amount_min: 2,
                amount_max: 2,
                duration: 1.0,
                destructive: true,
                regrowth_seconds: 0.0,
                total_pool: None,
        });
        let catalog = Arc::new(AssetCatalog::build(vec![builder]));
        let bush_id = catalog.get_def_name_id("BerryBush").unwrap();

        let mut world = World::new();
        let mut task = Task::idle();
        task.kind = TaskKind::Harvest;
        task.target_def_name_id = Some(bush_id);
        task.target_pos = Some(WorldPosition::ORIGIN);
        task.state = TaskState::Arrived;
        let e = spawn_arrived(&mut world, task);
        world.add_component(e, Inventory::new(4, 10));

        let mut system = make_system(catalog);
        system.update(&mut world, 1.0);

        let inv = world.get_component::<Inventory>(e).unwrap();
        assert_eq!(inv.backpack_count(DefNameId::new(1)), 2);
    }
}
