use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use common::*;

use assets::{AssetCatalog, Capability, DefNameId};
use ecs::{EntityId, System, World};
use unit::WorldPosition;

use crate::action_system::WorldCallbacks;
use crate::components::{
    stow_or_keep_in_hand, DecisionTrace, EvaluatedOption, Inventory, Memory, MovementTarget,
    NeedsComponent, OptionStatus, Position, Task, TaskState,
};
use crate::goal::{GoalRegistry, GoalStatus, GoalTask};
use crate::kinds::{Need, TaskKind};
use crate::task_registry::GlobalTaskRegistry;
use crate::time::GameTime;

const WALK_SPEED: f32 = 1.4;
const WANDER_RADIUS_MIN: f32 = 3.0;
const WANDER_RADIUS_MAX: f32 = 10.0;
const WANDER_SCORE: f32 = 10.0;
const CHAIN_CONTINUITY_BONUS: f32 = 20.0;

const CRITICAL_SCORE_BASE: f32 = 300.0;
const ACTIONABLE_SCORE_BASE: f32 = 100.0;
const GATHER_FOOD_SCORE: f32 = 50.0;
const CRAFT_SCORE: f32 = 40.0;
const GATHER_FOR_CRAFT_SCORE: f32 = 35.0;

/// Task kinds whose next step (carrying a harvested resource, a haul item, a
/// packaged delivery) needs a free hand.
const HAND_REQUIRING_KINDS: [TaskKind; 4] = [TaskKind::Harvest, TaskKind::Haul, TaskKind::Gather, TaskKind::PlacePackaged];

fn capability_for_need(need: Need) -> Option<Capability> {
    match need {
        Need::Hunger => Some(Capability::Edible),
        Need::Thirst => Some(Capability::Drinkable),
        Need::Energy => Some(Capability::Sleepable),
        Need::Bladder => Some(Capability::Toilet),
        _ => None,
    }
}

/// What claiming the winning option actually requires from the shared
/// registries. Kept separate from [`EvaluatedOption`], which is UI-facing
/// and carries no registry handles - the claim itself only happens once,
/// for whichever option wins the scoring pass.
#[derive(Clone)]
enum Claim {
    None,
    /// Claim `goal.id` in the goal registry. `start_chain_step` only matters
    /// for a Haul: 0 if the item still needs picking up, 1 if the colonist
    /// is already carrying it and can walk straight to the drop-off.
    Goal { goal: GoalTask, start_chain_step: u32 },
    /// Claim (or first-discover) an ad-hoc sighting in the global task
    /// registry - a harvestable a colonist noticed on its own, not backed
    /// by any goal.
    Discovery { target_pos: WorldPosition, target_def_name: DefNameId },
}

/// Picks each colonist's next [`Task`] by scoring candidate options - one
/// per actionable need, one per claimable goal-registry task, one for a
/// nearby unclaimed discovery, and a wander fallback that's never
/// unavailable - then keeps the losers around in a [`DecisionTrace`] for UI
/// inspection.
pub struct AIDecisionSystem {
    /// Consulted only by the hand-check (point 7), for a held item's
    /// `hands_required`.
    catalog: Arc<AssetCatalog>,
    goals: Rc<RefCell<GoalRegistry>>,
    tasks: Rc<RefCell<GlobalTaskRegistry>>,
    time: Rc<RefCell<GameTime>>,
    reevaluation_period: f32,
    rng: SmallRng,
    callbacks: Box<dyn WorldCallbacks>,
}

impl AIDecisionSystem {
    pub fn new(
        catalog: Arc<AssetCatalog>,
        goals: Rc<RefCell<GoalRegistry>>,
        tasks: Rc<RefCell<GlobalTaskRegistry>>,
        time: Rc<RefCell<GameTime>>,
        reevaluation_period: f32,
        seed: u64,
        callbacks: Box<dyn WorldCallbacks>,
    ) -> Self {
        Self {
            catalog,
            goals,
            tasks,
            time,
            reevaluation_period,
            rng: SmallRng::seed_from_u64(seed),
            callbacks,
        }
    }

    fn find_in_inventory(&self, inventory: Option<&Inventory>, cap: Capability) -> Option<DefNameId> {
        let inv = inventory?;
        inv.left_hand
            .into_iter()
            .chain(inv.right_hand)
            .chain(inv.backpack.keys().copied())
            .find(|&def| self.catalog.has_capability(def, cap))
    }

    /// Hunger/Thirst/Energy/Bladder. A carried item is preferred over a
    /// remembered source (mirrors [`crate::action_system::ActionSystem::eat_nutrition`]'s
    /// own inventory-first lookup); Energy and Bladder additionally fall
    /// back to the colonist's own position when nothing is known at all.
    fn evaluate_need_option(&self, pos: WorldPosition, needs: &NeedsComponent, memory: &Memory, inventory: Option<&Inventory>, need: Need) -> (EvaluatedOption, Claim) {
        let state = needs.get(need);
        let cap = capability_for_need(need);

        if !state.is_seeking() {
            return (
                EvaluatedOption {
                    task_type: TaskKind::FulfillNeed,
                    need_type: Some(need),
                    need_value: state.value,
                    threshold: state.seek_threshold,
                    status: OptionStatus::Satisfied,
                    target_pos: None,
                    target_def_name_id: None,
                    distance: 0.0,
                    score: 0.0,
                    reason: format!("{:?} not yet below threshold", need),
                },
                Claim::None,
            );
        }

        let score = if state.is_critical() {
            CRITICAL_SCORE_BASE + (state.critical_threshold - state.value)
        } else {
            ACTIONABLE_SCORE_BASE + (state.seek_threshold - state.value)
        };

        if let Some(def) = cap.and_then(|c| self.find_in_inventory(inventory, c)) {
            return (
                EvaluatedOption {
                    task_type: TaskKind::FulfillNeed,
                    need_type: Some(need),
                    need_value: state.value,
                    threshold: state.seek_threshold,
                    status: OptionStatus::Available,
                    target_pos: Some(pos),
                    target_def_name_id: Some(def),
                    distance: 0.0,
                    score,
                    reason: format!("{:?} satisfied from carried inventory", need),
                },
                Claim::None,
            );
        }

        if let Some(entry) = cap.and_then(|c| memory.nearest_with_capability(pos, c)) {
            let distance = pos.distance(entry.pos);
            return (
                EvaluatedOption {
                    task_type: TaskKind::FulfillNeed,
                    need_type: Some(need),
                    need_value: state.value,
                    threshold: state.seek_threshold,
                    status: OptionStatus::Available,
                    target_pos: Some(entry.pos),
                    target_def_name_id: Some(entry.def_name_id),
                    distance,
                    score,
                    reason: format!("{:?} critical={} at distance {:.1}", need, state.is_critical(), distance),
                },
                Claim::None,
            );
        }

        if matches!(need, Need::Energy | Need::Bladder) {
            return (
                EvaluatedOption {
                    task_type: TaskKind::FulfillNeed,
                    need_type: Some(need),
                    need_value: state.value,
                    threshold: state.seek_threshold,
                    status: OptionStatus::Available,
                    target_pos: Some(pos),
                    target_def_name_id: None,
                    distance: 0.0,
                    score,
                    reason: format!("{:?} ground fallback, nothing remembered", need),
                },
                Claim::None,
            );
        }

        (
            EvaluatedOption {
                task_type: TaskKind::FulfillNeed,
                need_type: Some(need),
                need_value: state.value,
                threshold: state.seek_threshold,
                status: OptionStatus::NoSource,
                target_pos: None,
                target_def_name_id: None,
                distance: 0.0,
                score: -1.0,
                reason: format!("{:?} seeking but nothing known to fulfil it", need),
            },
            Claim::None,
        )
    }

    /// A continuity bonus for a goal-registry option that continues the
    /// same multi-leg chain as the colonist's current task, so it doesn't
    /// abandon a harvest-then-haul mid-way for an equally-scored
    /// alternative. Only applies once the current task's already made
    /// progress on that chain (`chain_step > 0`).
    fn chain_bonus(&self, current: &Task, goal_chain_id: Option<u64>) -> f32 {
        if current.chain_id.is_some() && current.chain_step > 0 && current.chain_id == goal_chain_id {
            CHAIN_CONTINUITY_BONUS
        } else {
            0.0
        }
    }

    /// An ad-hoc harvestable a colonist has simply noticed nearby - not
    /// backed by any crafting/storage goal. Scored as opportunistic
    /// foraging work.
    fn evaluate_harvest_discovery_option(&self, pos: WorldPosition, memory: &Memory) -> Option<(EvaluatedOption, Claim)> {
        memory
            .known_with_capability(Capability::Harvestable)
            .map(|entry| (entry, pos.distance(entry.pos)))
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(entry, distance)| {
                (
                    EvaluatedOption {
                        task_type: TaskKind::Harvest,
                        need_type: None,
                        need_value: 0.0,
                        threshold: 0.0,
                        status: OptionStatus::Available,
                        target_pos: Some(entry.pos),
                        target_def_name_id: Some(entry.def_name_id),
                        distance,
                        score: GATHER_FOOD_SCORE,
                        reason: "known harvestable in range".to_owned(),
                    },
                    Claim::Discovery { target_pos: entry.pos, target_def_name: entry.def_name_id },
                )
            })
    }

    fn next_available_goal(&self, kind: TaskKind) -> Option<GoalTask> {
        self.goals
            .borrow()
            .goals_by_type(kind)
            .find(|g| g.status == GoalStatus::Available && g.assigned_to.is_none())
            .cloned()
    }

    fn evaluate_craft_option(&self, pos: WorldPosition, current: &Task) -> Option<(EvaluatedOption, Claim)> {
        let goal = self.next_available_goal(TaskKind::Craft)?;
        let distance = goal.destination_pos.map(|d| pos.distance(d)).unwrap_or(0.0);
        let score = CRAFT_SCORE + self.chain_bonus(current, goal.chain_id);

        Some((
            EvaluatedOption {
                task_type: TaskKind::Craft,
                need_type: None,
                need_value: 0.0,
                threshold: 0.0,
                status: OptionStatus::Available,
                target_pos: goal.destination_pos,
                target_def_name_id: goal.item_def_name,
                distance,
                score,
                reason: "crafting station has pending work".to_owned(),
            },
            Claim::Goal { goal, start_chain_step: 0 },
        ))
    }

    /// A goal-backed Harvest, spawned as a sibling of a Haul to supply a
    /// crafting station with an input that must first be gathered. Distinct
    /// from [`Self::evaluate_harvest_discovery_option`]'s ad-hoc sightings.
    fn evaluate_harvest_goal_option(&self, pos: WorldPosition, memory: &Memory, current: &Task) -> Option<(EvaluatedOption, Claim)> {
        let goal = self.next_available_goal(TaskKind::Harvest)?;
        let def_name = goal.item_def_name?;
        let entry = memory.nearest_with_def_name(pos, def_name)?;
        let distance = pos.distance(entry.pos);
        let score = GATHER_FOR_CRAFT_SCORE + self.chain_bonus(current, goal.chain_id);

        Some((
            EvaluatedOption {
                task_type: TaskKind::Harvest,
                need_type: None,
                need_value: 0.0,
                threshold: 0.0,
                status: OptionStatus::Available,
                target_pos: Some(entry.pos),
                target_def_name_id: Some(def_name),
                distance,
                score,
                reason: "harvest goal feeding a craft chain".to_owned(),
            },
            Claim::Goal { goal, start_chain_step: 0 },
        ))
    }

    fn evaluate_haul_option(&self, pos: WorldPosition, memory: &Memory, inventory: Option<&Inventory>, current: &Task) -> Option<(EvaluatedOption, Claim)> {
        let goal = self.next_available_goal(TaskKind::Haul)?;
        let item = goal.item_def_name?;

        let already_carried = inventory.map(|inv| inv.backpack_count(item) > 0).unwrap_or(false);
        let (target_pos, distance, start_chain_step) = if already_carried {
            let dest = goal.destination_pos.unwrap_or(pos);
            (dest, pos.distance(dest), 1)
        } else if let Some(entry) = memory.nearest_with_def_name(pos, item) {
            (entry.pos, pos.distance(entry.pos), 0)
        } else {
            return None;
        };

        let score = GATHER_FOR_CRAFT_SCORE + self.chain_bonus(current, goal.chain_id);

        Some((
            EvaluatedOption {
                task_type: TaskKind::Haul,
                need_type: None,
                need_value: 0.0,
                threshold: 0.0,
                status: OptionStatus::Available,
                target_pos: Some(target_pos),
                target_def_name_id: Some(item),
                distance,
                score,
                reason: "haul goal pending delivery".to_owned(),
            },
            Claim::Goal { goal, start_chain_step },
        ))
    }

    fn evaluate_place_packaged_option(&self, pos: WorldPosition, current: &Task) -> Option<(EvaluatedOption, Claim)> {
        let goal = self.next_available_goal(TaskKind::PlacePackaged)?;
        let distance = goal.destination_pos.map(|d| pos.distance(d)).unwrap_or(0.0);
        let score = GATHER_FOR_CRAFT_SCORE + self.chain_bonus(current, goal.chain_id);

        Some((
            EvaluatedOption {
                task_type: TaskKind::PlacePackaged,
                need_type: None,
                need_value: 0.0,
                threshold: 0.0,
                status: OptionStatus::Available,
                target_pos: goal.destination_pos,
                target_def_name_id: None,
                distance,
                score,
                reason: "packaged item awaiting placement".to_owned(),
            },
            Claim::Goal { goal, start_chain_step: 0 },
        ))
    }

    fn wander_option(&mut self, pos: WorldPosition) -> EvaluatedOption {
        let angle: f32 = self.rng.gen_range(0.0, TAU);
        let radius: f32 = self.rng.gen_range(WANDER_RADIUS_MIN, WANDER_RADIUS_MAX);
        let target = pos + (angle.cos() * radius, angle.sin() * radius);

        EvaluatedOption {
            task_type: TaskKind::Wander,
            need_type: None,
            need_value: 0.0,
            threshold: 0.0,
            status: OptionStatus::Available,
            target_pos: Some(target),
            target_def_name_id: None,
            distance: radius,
            score: WANDER_SCORE,
            reason: "nothing better to do".to_owned(),
        }
    }

    /// If the colonist has no free hand, stows a one-handed held item into
    /// the backpack, or drops a two-handed one via the drop-item world
    /// callback (reusing `spawn_entity` - dropping an item in the world and
    /// spawning one are the same operation from the host's perspective).
    fn ensure_free_hand(&mut self, world: &mut World, entity: EntityId) {
        let held = match world.get_component::<Inventory>(entity) {
            Some(inventory) if !inventory.has_free_hand() => inventory.left_hand.or(inventory.right_hand),
            _ => return,
        };
        let held = match held {
            Some(def_name) => def_name,
            None => return,
        };

        let hands_required = self.catalog.get_def_by_id(held).map(|d| d.hands_required).unwrap_or(1);

        if hands_required >= 2 {
            if let Some(mut inventory) = world.get_component_mut::<Inventory>(entity) {
                inventory.free_hand_holding(held);
            }
            let pos = world.get_component::<Position>(entity).map(|p| p.0).unwrap_or(WorldPosition::ORIGIN);
            self.callbacks.spawn_entity(world, held, pos);
        } else if let Some(mut inventory) = world.get_component_mut::<Inventory>(entity) {
            stow_or_keep_in_hand(&mut inventory, held);
        }
    }

    /// Mirrors the winning option into `task`, claiming it in whichever
    /// registry backs it (point 1), and sets `movement` so the colonist
    /// either starts walking or, if it's already at the target, arrives
    /// this frame.
    fn apply_option(&self, pos: WorldPosition, entity: EntityId, task: &mut Task, movement: &mut MovementTarget, option: &EvaluatedOption, claim: &Claim) {
        task.kind = option.task_type;
        task.need_to_fulfill = option.need_type;
        task.target_pos = option.target_pos;
        task.target_def_name_id = option.target_def_name_id;
        task.reason = option.reason.clone();
        task.time_since_evaluation = 0.0;
        task.related_entity = None;
        task.related_goal = None;
        task.haul_item = None;
        task.haul_source = None;
        task.haul_target = None;
        task.chain_id = None;
        task.chain_step = 0;

        match claim {
            Claim::None => {}
            Claim::Goal { goal, start_chain_step } => {
                if self.goals.borrow_mut().claim(goal.id, entity) {
                    task.related_goal = Some(goal.id);
                    task.related_entity = goal.destination;
                    task.chain_id = goal.chain_id;
                    if option.task_type == TaskKind::Haul {
                        task.haul_item = goal.item_def_name;
                        task.haul_target = goal.destination_pos;
                        task.chain_step = *start_chain_step;
                        task.haul_source = if *start_chain_step == 0 { option.target_pos } else { None };
                    }
                }
            }
            Claim::Discovery { target_pos, target_def_name } => {
                self.tasks.borrow_mut().claim(option.task_type, *target_pos, *target_def_name, entity, Instant::now());
            }
        }

        match option.target_pos {
            // ground fallback / already-at-target: arrive this frame rather
            // than wait a tick for movement to notice we're already there.
            Some(target) if target == pos => {
                movement.active = false;
                task.state = TaskState::Arrived;
            }
            Some(target) => {
                *movement = MovementTarget::new(target, WALK_SPEED);
                task.state = TaskState::Moving;
            }
            None => {
                movement.active = false;
                task.state = TaskState::Arrived;
            }
        }
    }
}

impl System for AIDecisionSystem {
    fn priority(&self) -> u32 {
        60
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        let mut traced: Vec<(EntityId, Vec<EvaluatedOption>, Option<TaskKind>)> = Vec::new();

        world.view5::<Position, NeedsComponent, Memory, Task, MovementTarget>(
            |entity, pos, needs, memory, task, movement| {
                task.time_since_evaluation += dt;

                let idle = task.state == TaskState::Complete;
                let arrived = task.state == TaskState::Arrived;
                let period_elapsed = task.time_since_evaluation >= self.reevaluation_period;
                let critical_elsewhere = Need::ACTIONABLE.iter().any(|&need| {
                        needs.get(need).is_critical() && task.need_to_fulfill != Some(need)
                });

                if !(idle || arrived || period_elapsed || critical_elsewhere) {
                    return;
                }

                // abandon whatever registry claim the current task held
                // before scoring a fresh set of options
                if let Some(goal_id) = task.related_goal.take() {
                    self.goals.borrow_mut().release_claim(goal_id, entity);
                }
                self.tasks.borrow_mut().unreserve(entity);

                let inventory = world.get_component::<Inventory>(entity);
                let inventory = inventory.as_deref();

                let mut options: Vec<(EvaluatedOption, Claim)> = Need::ACTIONABLE
                    .iter()
                    .map(|&need| self.evaluate_need_option(pos.0, needs, memory, inventory, need))
                    .collect();

                if let Some(opt) = self.evaluate_craft_option(pos.0, task) {
                    options.push(opt);
                }
                if let Some(opt) = self.evaluate_haul_option(pos.0, memory, inventory, task) {
                    options.push(opt);
                }
                if let Some(opt) = self.evaluate_harvest_goal_option(pos.0, memory, task) {
                    options.push(opt);
                }
                if let Some(opt) = self.evaluate_harvest_discovery_option(pos.0, memory) {
                    options.push(opt);
                }

                options.push((self.wander_option(pos.0), Claim::None));

                let best_index = options
                    .iter()
                    .enumerate()
                    .filter(|(_, (o, _))| matches!(o.status, OptionStatus::Available))
                    .max_by(|(_, (a, _)), (_, (b, _))| a.score.partial_cmp(&b.score).unwrap())
                    .map(|(i, _)| i);

                let mut selected_kind = None;
                if let Some(i) = best_index {
                    options[i].0.status = OptionStatus::Selected;
                    let (chosen, claim) = options[i].clone();
                    selected_kind = Some(chosen.task_type);
                    self.apply_option(pos.0, entity, task, movement, &chosen, &claim);
                }

                traced.push((entity, options.into_iter().map(|(o, _)| o).collect(), selected_kind));
            },
        );

        let game_seconds = self.time.borrow().total_game_seconds;
        for (entity, options, selected_kind) in traced {
            if matches!(selected_kind, Some(kind) if HAND_REQUIRING_KINDS.contains(&kind)) {
                self.ensure_free_hand(world, entity);
            }

            if let Some(mut trace) = world.get_component_mut::<DecisionTrace>(entity) {
                trace.summary = options
                    .iter()
                    .find(|o| matches!(o.status, OptionStatus::Selected))
                    .map(|o| o.reason.clone())
                    .unwrap_or_else(|| "no viable option".to_owned());
                trace.options = options;
                trace.last_eval_time = game_seconds;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Action, Colonist};
    use crate::goal::GoalOwner;

    struct NoopCallbacks;

    impl WorldCallbacks for NoopCallbacks {
        fn spawn_entity(&mut self, world: &mut World, _def_name: assets::DefNameId, _pos: WorldPosition) -> EntityId {
            world.create_entity()
        }
    }

    fn make_system() -> AIDecisionSystem {
        make_system_full(Arc::new(AssetCatalog::build(vec![])), Rc::new(RefCell::new(GoalRegistry::new())))
    }

    fn make_system_with_catalog(catalog: Arc<AssetCatalog>) -> AIDecisionSystem {
        make_system_full(catalog, Rc::new(RefCell::new(GoalRegistry::new())))
    }

    fn make_system_with_goals(goals: Rc<RefCell<GoalRegistry>>) -> AIDecisionSystem {
        make_system_full(Arc::new(AssetCatalog::build(vec![])), goals)
    }

    fn make_system_full(catalog: Arc<AssetCatalog>, goals: Rc<RefCell<GoalRegistry>>) -> AIDecisionSystem {
        AIDecisionSystem::new(
            catalog,
            goals,
            Rc::new(RefCell::new(GlobalTaskRegistry::new())),
            Rc::new(RefCell::new(GameTime::new(10))),
            5.0,
            42,
            Box::new(NoopCallbacks),
        )
    }

    fn spawn_colonist(world: &mut World, pos: WorldPosition, mut needs: NeedsComponent) -> EntityId {
        let e = world.create_entity();
        world.add_component(e, Colonist { name: "Test".to_owned() });
        world.add_component(e, Position(pos));
        needs.get_mut(Need::Hunger).value = needs.get(Need::Hunger).value;
        world.add_component(e, needs);
        world.add_component(e, Memory::new(50.0));
        world.add_component(e, Task::idle());
        world.add_component(e, MovementTarget::new(pos, WALK_SPEED));
        world.add_component(e, Action::default());
        e
    }

    #[test]
    fn picks_wander_when_nothing_else_available() {
        let mut world = World::new();
        let needs = NeedsComponent::default();
        let colonist = spawn_colonist(&mut world, WorldPosition::ORIGIN, needs);

        let mut system = make_system();
        system.update(&mut world, 1.0 / 60.0);

        let task = world.get_component::<Task>(colonist).unwrap();
        assert_eq!(task.kind, TaskKind::Wander);
    }

    #[test]
    fn starving_colonist_seeks_known_food() {
        let mut world = World::new();
        let mut needs = NeedsComponent::default();
        needs.get_mut(Need::Hunger).value = 5.0;
        let colonist = spawn_colonist(&mut world, WorldPosition::new(0.0, 0.0), needs);

        {
            let mut memory = world.get_component_mut::<Memory>(colonist).unwrap();
            memory.remember_world_entity(WorldPosition::new(3.0, 0.0), assets::DefNameId::new(1), [Capability::Edible]);
        }

        let mut system = make_system();
        system.update(&mut world, 1.0 / 60.0);

        let task = world.get_component::<Task>(colonist).unwrap();
        assert_eq!(task.kind, TaskKind::FulfillNeed);
        assert_eq!(task.need_to_fulfill, Some(Need::Hunger));
    }

    #[test]
    fn carried_food_is_eaten_with_ground_fallback() {
        let mut berry = assets::AssetDefinitionBuilder::new("Berry");
        berry.capabilities |= Capability::Edible;
        let catalog = Arc::new(AssetCatalog::build(vec![berry]));
        let berry_id = catalog.get_def_name_id("Berry").unwrap();

        let mut world = World::new();
        let mut needs = NeedsComponent::default();
        needs.get_mut(Need::Hunger).value = 5.0;
        let pos = WorldPosition::new(4.0, 4.0);
        let colonist = spawn_colonist(&mut world, pos, needs);

        let mut inv = Inventory::new(4, 10);
        inv.add_to_backpack(berry_id, 1);
        world.add_component(colonist, inv);
        // a further-away remembered berry bush must lose to the one already
        // in the backpack
        {
            let mut memory = world.get_component_mut::<Memory>(colonist).unwrap();
            memory.remember_world_entity(WorldPosition::new(40.0, 40.0), berry_id, [Capability::Edible]);
        }

        let mut system = make_system_with_catalog(catalog);
        system.update(&mut world, 1.0 / 60.0);

        let task = world.get_component::<Task>(colonist).unwrap();
        assert_eq!(task.kind, TaskKind::FulfillNeed);
        assert_eq!(task.need_to_fulfill, Some(Need::Hunger));
        assert_eq!(task.target_pos, Some(pos));
        assert_eq!(task.target_def_name_id, Some(berry_id));
        assert_eq!(task.state, TaskState::Arrived);
    }

    #[test]
    fn does_not_reevaluate_before_period_elapses() {
        let mut world = World::new();
        let needs = NeedsComponent::default();
        let colonist = spawn_colonist(&mut world, WorldPosition::ORIGIN, needs);
        world.get_component_mut::<Task>(colonist).unwrap().state = TaskState::Moving;

        let mut system = make_system();
        system.update(&mut world, 1.0);
        let reason_after_first = world.get_component::<Task>(colonist).unwrap().reason.clone();

        system.update(&mut world, 0.1);
        let reason_after_second = world.get_component::<Task>(colonist).unwrap().reason.clone();
        assert_eq!(reason_after_first, reason_after_second);
    }

    #[test]
    fn critical_need_interrupts_mid_task_early() {
        let mut world = World::new();
        let needs = NeedsComponent::default();
        let colonist = spawn_colonist(&mut world, WorldPosition::ORIGIN, needs);
        {
            let mut task = world.get_component_mut::<Task>(colonist).unwrap();
            task.state = TaskState::Moving;
            task.kind = TaskKind::Wander;
            task.need_to_fulfill = None;
        }

        let mut system = make_system();
        // first tick with a long period establishes the baseline wander task
        system.update(&mut world, 0.1);
        assert_eq!(world.get_component::<Task>(colonist).unwrap().kind, TaskKind::Wander);

        // hunger turns critical well before the 5s reevaluation period elapses
        world.get_component_mut::<NeedsComponent>(colonist).unwrap().get_mut(Need::Hunger).value = 1.0;
        {
            let mut memory = world.get_component_mut::<Memory>(colonist).unwrap();
            memory.remember_world_entity(WorldPosition::new(2.0, 0.0), assets::DefNameId::new(1), [Capability::Edible]);
        }

        system.update(&mut world, 0.1);
        let task = world.get_component::<Task>(colonist).unwrap();
        assert_eq!(task.kind, TaskKind::FulfillNeed);
        assert_eq!(task.need_to_fulfill, Some(Need::Hunger));
    }

    #[test]
    fn hand_check_stows_one_handed_item_before_a_haul() {
        let mut axe = assets::AssetDefinitionBuilder::new("Axe");
        axe.hands_required = 1;
        let catalog = Arc::new(AssetCatalog::build(vec![axe]));
        let axe_id = catalog.get_def_name_id("Axe").unwrap();

        let mut world = World::new();
        let needs = NeedsComponent::default();
        let colonist = spawn_colonist(&mut world, WorldPosition::ORIGIN, needs);
        world.add_component(colonist, Inventory::new(4, 10));
        world.get_component_mut::<Inventory>(colonist).unwrap().hold(axe_id);
        {
            let mut memory = world.get_component_mut::<Memory>(colonist).unwrap();
            memory.remember_world_entity(WorldPosition::new(2.0, 0.0), axe_id, [Capability::Harvestable]);
        }
        {
            let mut task = world.get_component_mut::<Task>(colonist).unwrap();
            task.kind = TaskKind::Haul;
        }

        let mut system = make_system_with_catalog(catalog);
        system.update(&mut world, 1.0 / 60.0);

        let inventory = world.get_component::<Inventory>(colonist).unwrap();
        assert_eq!(inventory.left_hand, None);
        assert_eq!(inventory.backpack_count(axe_id), 1);
    }

    #[test]
    fn hand_check_drops_a_two_handed_item_before_a_harvest() {
        let mut log = assets::AssetDefinitionBuilder::new("Log");
        log.hands_required = 2;
        let catalog = Arc::new(AssetCatalog::build(vec![log]));
        let log_id = catalog.get_def_name_id("Log").unwrap();

        let mut world = World::new();
        let needs = NeedsComponent::default();
        let colonist = spawn_colonist(&mut world, WorldPosition::ORIGIN, needs);
        world.add_component(colonist, Inventory::new(4, 10));
        world.get_component_mut::<Inventory>(colonist).unwrap().hold(log_id);
        {
            let mut memory = world.get_component_mut::<Memory>(colonist).unwrap();
            memory.remember_world_entity(WorldPosition::new(2.0, 0.0), log_id, [Capability::Harvestable]);
        }

        let mut system = make_system_with_catalog(catalog);
        system.update(&mut world, 1.0 / 60.0);

        let inventory = world.get_component::<Inventory>(colonist).unwrap();
        assert_eq!(inventory.left_hand, None);
        assert_eq!(inventory.backpack_count(log_id), 0);
    }

    #[test]
    fn claims_a_pending_haul_goal_into_task_fields() {
        let goals = Rc::new(RefCell::new(GoalRegistry::new()));
        let mut world = World::new();
        let station = world.create_entity();
        let item = assets::DefNameId::new(9);
        let goal_id = {
            let mut registry = goals.borrow_mut();
            registry.create_goal(TaskKind::Haul, GoalOwner::Storage, Some(station), Some(WorldPosition::new(5.0, 0.0)), Some(item), 1, None)
        };

        let needs = NeedsComponent::default();
        let colonist = spawn_colonist(&mut world, WorldPosition::ORIGIN, needs);
        {
            let mut memory = world.get_component_mut::<Memory>(colonist).unwrap();
            memory.remember_world_entity(WorldPosition::new(1.0, 0.0), item, []);
        }

        let mut system = make_system_with_goals(goals.clone());
        system.update(&mut world, 1.0 / 60.0);

        let task = world.get_component::<Task>(colonist).unwrap();
        assert_eq!(task.kind, TaskKind::Haul);
        assert_eq!(task.related_entity, Some(station));
        assert_eq!(task.related_goal, Some(goal_id));
        assert_eq!(task.haul_item, Some(item));
        assert_eq!(task.haul_source, Some(WorldPosition::new(1.0, 0.0)));
        assert_eq!(task.haul_target, Some(WorldPosition::new(5.0, 0.0)));

        let goal = goals.borrow().get(goal_id).unwrap().clone();
        assert_eq!(goal.status, GoalStatus::InProgress);
        assert_eq!(goal.assigned_to, Some(colonist));
    }

    #[test]
    fn chain_continuity_bonus_favors_continuing_haul_goal_over_a_fresh_craft() {
        let goals = Rc::new(RefCell::new(GoalRegistry::new()));
        let mut world = World::new();
        let station = world.create_entity();
        let item = assets::DefNameId::new(9);
        let haul_goal = {
            let mut registry = goals.borrow_mut();
            let id = registry.create_goal(TaskKind::Haul, GoalOwner::Crafting, Some(station), Some(WorldPosition::new(5.0, 0.0)), Some(item), 1, None);
            registry.set_chain_id(id, 77);
            registry.create_goal(TaskKind::Craft, GoalOwner::Crafting, Some(station), Some(WorldPosition::new(5.0, 0.0)), Some(item), 1, None);
            id
        };

        let needs = NeedsComponent::default();
        let colonist = spawn_colonist(&mut world, WorldPosition::ORIGIN, needs);
        {
            let mut memory = world.get_component_mut::<Memory>(colonist).unwrap();
            memory.remember_world_entity(WorldPosition::new(1.0, 0.0), item, []);
        }
        {
            let mut task = world.get_component_mut::<Task>(colonist).unwrap();
            task.chain_id = Some(77);
            task.chain_step = 1;
            task.state = TaskState::Arrived;
        }

        let mut system = make_system_with_goals(goals.clone());
        system.update(&mut world, 1.0 / 60.0);

        // without the bonus Craft's flat 40 would beat Haul's flat 35
        let task = world.get_component::<Task>(colonist).unwrap();
        assert_eq!(task.kind, TaskKind::Haul);
        assert_eq!(task.related_goal, Some(haul_goal));
    }

    #[test]
    fn abandoning_a_claimed_goal_releases_it_back_to_available() {
        let goals = Rc::new(RefCell::new(GoalRegistry::new()));
        let mut world = World::new();
        let station = world.create_entity();
        let item = assets::DefNameId::new(9);
        let goal_id = goals.borrow_mut().create_goal(TaskKind::Craft, GoalOwner::Crafting, Some(station), Some(WorldPosition::new(5.0, 0.0)), Some(item), 1, None);

        let mut needs = NeedsComponent::default();
        needs.get_mut(Need::Hunger).value = 100.0;
        let colonist = spawn_colonist(&mut world, WorldPosition::ORIGIN, needs);

        let mut system = make_system_with_goals(goals.clone());
        system.update(&mut world, 1.0 / 60.0);
        assert_eq!(world.get_component::<Task>(colonist).unwrap().kind, TaskKind::Craft);
        assert_eq!(goals.borrow().get(goal_id).unwrap().status, GoalStatus::InProgress);

        // hunger turns critical with a known food source, preempting the craft
        world.get_component_mut::<NeedsComponent>(colonist).unwrap().get_mut(Need::Hunger).value = 1.0;
        {
            let mut memory = world.get_component_mut::<Memory>(colonist).unwrap();
            memory.remember_world_entity(WorldPosition::new(2.0, 0.0), assets::DefNameId::new(1), [Capability::Edible]);
        }
        system.update(&mut world, 0.1);

        let task = world.get_component::<Task>(colonist).unwrap();
        assert_eq!(task.kind, TaskKind::FulfillNeed);
        assert_eq!(goals.borrow().get(goal_id).unwrap().status, GoalStatus::Available);
        assert!(goals.borrow().get(goal_id).unwrap().assigned_to.is_none());
    }
}
