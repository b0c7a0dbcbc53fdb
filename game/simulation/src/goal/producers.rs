use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use assets::{AssetCatalog, DefNameId, RecipeCatalog};
use ecs::{EntityId, System, World};

use crate::components::{Inventory, Packaged, Position, StorageConfiguration, WorkQueue};
use crate::goal::registry::{GoalOwner, GoalRegistry, GoalStatus};
use crate::kinds::TaskKind;

/// Throttles a goal producer to run only every `period` seconds rather than
/// every tick, per the configured `goal_producer_period`.
struct Throttle {
    period: f32,
    accumulated: f32,
}

impl Throttle {
    fn new(period: f32) -> Self {
        Self {
            period,
            accumulated: period,
        }
    }

    fn ready(&mut self, dt: f32) -> bool {
        self.accumulated += dt;
        if self.accumulated >= self.period {
            self.accumulated = 0.0;
            true
        } else {
            false
        }
    }
}

/// Reconciles storage containers' stock against their [`StorageConfiguration`]
/// rules, spawning or cancelling Haul goals as shortfalls appear or resolve.
///
/// A rule naming a specific defName is checked directly against the
/// backpack; a wildcard (category) rule sums every backpack entry whose
/// definition falls in that category and, if short, hauls a representative
/// defName from the catalog for that category.
pub struct StorageGoalSystem {
    goals: Rc<RefCell<GoalRegistry>>,
    catalog: Arc<AssetCatalog>,
    throttle: Throttle,
}

impl StorageGoalSystem {
    pub fn new(goals: Rc<RefCell<GoalRegistry>>, catalog: Arc<AssetCatalog>, period: f32) -> Self {
        Self {
            goals,
            catalog,
            throttle: Throttle::new(period),
        }
    }

    fn resolve_rule(&self, inventory: &Inventory, rule: &crate::components::StorageRule) -> Option<(DefNameId, u32)> {
        match rule.def_name {
            Some(def_name) => Some((def_name, inventory.backpack_count(def_name))),
            None => {
                let have: u32 = inventory
                    .backpack
                    .iter()
                    .filter(|(id, _)| {
                        self.catalog
                            .get_def_by_id(**id)
                            .map(|d| d.category == rule.category)
                            .unwrap_or(false)
                })
                    .map(|(_, qty)| *qty)
                    .sum();
                let representative = self
                    .catalog
                    .definitions()
                    .iter()
                    .find(|d| d.category == rule.category)
                    .map(|d| d.id)?;
                Some((representative, have))
            }
        }
    }
}

impl System for StorageGoalSystem {
    fn priority(&self) -> u32 {
        55
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        if !self.throttle.ready(dt) {
            return;
        }

        let mut goals = self.goals.borrow_mut();
        world.view3::<StorageConfiguration, Inventory, Position>(|entity, config, inventory, _pos| {
                for rule in &config.rules {
                    let (def_name, have) = match self.resolve_rule(inventory, rule) {
                        Some(resolved) => resolved,
                        None => continue, // nothing in the catalog satisfies this category
                    };

                    let existing = goals
                        .goal_for_destination(entity)
                        .filter(|g| g.item_def_name == Some(def_name))
                        .map(|g| g.id);

                    if have < rule.min_amount {
                        if existing.is_none() {
                            goals.create_goal(
                                TaskKind::Haul,
                                GoalOwner::Storage,
                                Some(entity),
                                None,
                                Some(def_name),
                                rule.min_amount - have,
                                None,
                            );
                        }
                    } else if let Some(id) = existing {
                        if goals.get(id).map(|g| g.status != GoalStatus::Complete).unwrap_or(false) {
                            goals.remove_goal_with_children(id);
                        }
                    }
                }
        });
    }
}

/// Reconciles crafting stations' [`WorkQueue`]s against a Blocked parent
/// Craft goal, hierarchy: each missing recipe input gets a Haul
/// child, and when the catalog knows of something harvestable that yields
/// that input, the Haul additionally `depends_on` a sibling Harvest goal
/// rather than starting `Available` immediately. Both legs of one input's
/// lineage share a `chain_id` so a single colonist prefers to see the
/// harvest through to its delivery.
pub struct CraftingGoalSystem {
    goals: Rc<RefCell<GoalRegistry>>,
    catalog: Arc<AssetCatalog>,
    recipes: Arc<RecipeCatalog>,
    throttle: Throttle,
    next_chain_id: u64,
}

impl CraftingGoalSystem {
    pub fn new(goals: Rc<RefCell<GoalRegistry>>, catalog: Arc<AssetCatalog>, recipes: Arc<RecipeCatalog>, period: f32) -> Self {
        Self {
            goals,
            catalog,
            recipes,
            throttle: Throttle::new(period),
            next_chain_id: 0,
        }
    }

    /// The defName of something in the catalog whose harvestable yield
    /// matches `input`, if any. Used to decide whether a Haul child needs a
    /// Harvest sibling feeding it, or can be satisfied straight from stock.
    fn harvest_source_for(&self, input: DefNameId) -> Option<DefNameId> {
        self.catalog
            .definitions()
            .iter()
            .find(|d| d.harvestable.as_ref().map(|h| h.yield_id == input).unwrap_or(false))
            .map(|d| d.id)
    }

    fn spawn_hierarchy(&mut self, goals: &mut GoalRegistry, station: EntityId, station_pos: unit::WorldPosition, job: &crate::components::WorkJob) {
        let parent = goals.create_goal(
            TaskKind::Craft,
            GoalOwner::Crafting,
            Some(station),
            Some(station_pos),
            Some(job.recipe_def_name),
            job.quantity - job.completed,
            None,
        );
        if let Some(task) = goals.get_mut(parent) {
            task.status = GoalStatus::Blocked;
        }

        let inputs = self
            .recipes
            .get_by_id(job.recipe_def_name)
            .map(|r| r.inputs.clone())
            .unwrap_or_default();

        if inputs.is_empty() {
            // nothing to gather - the parent stays Blocked until the assigned
            // colonist completes the work directly, same as any leaf goal.
            if let Some(task) = goals.get_mut(parent) {
                task.status = GoalStatus::Available;
            }
            return;
        }

        for input in inputs {
            self.next_chain_id += 1;
            let chain_id = self.next_chain_id;

            let haul = goals.create_goal(
                TaskKind::Haul,
                GoalOwner::Crafting,
                Some(station),
                Some(station_pos),
                Some(input.def_name_id),
                input.count,
                Some(parent),
            );
            goals.set_chain_id(haul, chain_id);

            if let Some(harvest_source) = self.harvest_source_for(input.def_name_id) {
                let harvest = goals.create_goal(
                    TaskKind::Harvest,
                    GoalOwner::Crafting,
                    None,
                    None,
                    Some(harvest_source),
                    input.count,
                    Some(parent),
                );
                goals.set_chain_id(harvest, chain_id);
                goals.set_dependency(haul, harvest);
                if let Some(task) = goals.get_mut(haul) {
                    task.status = GoalStatus::WaitingForItems;
                }
            }
        }
    }
}

impl System for CraftingGoalSystem {
    fn priority(&self) -> u32 {
        56
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        if !self.throttle.ready(dt) {
            return;
        }

        let mut goals = self.goals.borrow_mut();
        let mut pending: Vec<(EntityId, unit::WorldPosition, crate::components::WorkJob)> = Vec::new();
        let mut finished: Vec<EntityId> = Vec::new();

        world.view2::<WorkQueue, Position>(|entity, queue, pos| {
                let existing = goals
                    .goals_by_owner(GoalOwner::Crafting)
                    .find(|g| g.destination == Some(entity) && g.parent.is_none() && g.status != GoalStatus::Complete)
                    .map(|g| g.id);

                match queue.current() {
                    Some(job) => {
                        if existing.is_none() {
                            pending.push((entity, pos.0, *job));
                        }
                    }
                    None => {
                        if let Some(id) = existing {
                            finished.push(id);
                        }
                    }
                }
        });

        for (station, pos, job) in pending {
            self.spawn_hierarchy(&mut goals, station, pos, &job);
        }
        for id in finished {
            goals.remove_goal_with_children(id);
        }
    }
}

/// Ensures every crafted-but-unplaced [`Packaged`] entity has an active
/// PlacePackaged goal directing a colonist to carry it to its destination.
pub struct BuildGoalSystem {
    goals: Rc<RefCell<GoalRegistry>>,
    throttle: Throttle,
}

impl BuildGoalSystem {
    pub fn new(goals: Rc<RefCell<GoalRegistry>>, period: f32) -> Self {
        Self {
            goals,
            throttle: Throttle::new(period),
        }
    }
}

impl System for BuildGoalSystem {
    fn priority(&self) -> u32 {
        57
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        if !self.throttle.ready(dt) {
            return;
        }

        let mut goals = self.goals.borrow_mut();
        world.view2::<Packaged, Position>(|entity, packaged, _pos| {
                let existing = goals.goal_for_destination(entity).map(|g| g.id);

                if packaged.target_pos.is_some() && !packaged.being_carried {
                    if existing.is_none() {
                        goals.create_goal(
                            TaskKind::PlacePackaged,
                            GoalOwner::Build,
                            Some(entity),
                            packaged.target_pos,
                            None,
                            1,
                            None,
                        );
                    }
                } else if let Some(id) = existing {
                    goals.remove_goal_with_children(id);
                }
        });
    }
}

#[allow(unused)]
fn _assert_entity_is_copy(_: EntityId) {}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::components::{Priority, StorageRule};

    #[test]
    fn storage_shortfall_spawns_haul_goal() {
        let mut world = World::new();
        let container = world.create_entity();
        world.add_component(
            container,
            StorageConfiguration {
                rules: vec![StorageRule {
                        def_name: Some(DefNameId::new(1)),
                        category: assets::Category::None,
                        priority: Priority::Medium,
                        min_amount: 5,
                        max_amount: 10,
                }],
            },
        );
        world.add_component(container, Inventory::new(4, 99));
        world.add_component(container, Position(unit::WorldPosition::ORIGIN));

        let goals = Rc::new(RefCell::new(GoalRegistry::new()));
        let catalog = Arc::new(AssetCatalog::build(vec![]));
        let mut system = StorageGoalSystem::new(goals.clone(), catalog, 0.0);
        system.update(&mut world, 1.0);

        assert_eq!(goals.borrow().goals_by_owner(GoalOwner::Storage).count(), 1);
    }

    #[test]
    fn satisfied_rule_cancels_existing_goal() {
        let mut world = World::new();
        let container = world.create_entity();
        world.add_component(
            container,
            StorageConfiguration {
                rules: vec![StorageRule {
                        def_name: Some(DefNameId::new(1)),
                        category: assets::Category::None,
                        priority: Priority::Medium,
                        min_amount: 1,
                        max_amount: 10,
                }],
            },
        );
        let mut inv = Inventory::new(4, 99);
        inv.add_to_backpack(DefNameId::new(1), 1);
        world.add_component(container, inv);
        world.add_component(container, Position(unit::WorldPosition::ORIGIN));

        let goals = Rc::new(RefCell::new(GoalRegistry::new()));
        goals.borrow_mut().create_goal(
            TaskKind::Haul,
            GoalOwner::Storage,
            Some(container),
            None,
            Some(DefNameId::new(1)),
            1,
            None,
        );

        let catalog = Arc::new(AssetCatalog::build(vec![]));
        let mut system = StorageGoalSystem::new(goals.clone(), catalog, 0.0);
        system.update(&mut world, 1.0);

        assert_eq!(goals.borrow().goals_by_owner(GoalOwner::Storage).count(), 0);
        let _ = Instant::now();
    }

    #[test]
    fn wildcard_rule_hauls_a_representative_of_the_category() {
        use assets::AssetDefinitionBuilder;

        let mut food = AssetDefinitionBuilder::new("berries");
        food.category = assets::Category::Food;
        let catalog = Arc::new(AssetCatalog::build(vec![food]));
        let food_id = catalog.get_def_name_id("berries").unwrap();

        let mut world = World::new();
        let container = world.create_entity();
        world.add_component(
            container,
            StorageConfiguration {
                rules: vec![StorageRule {
                        def_name: None,
                        category: assets::Category::Food,
                        priority: Priority::Medium,
                        min_amount: 5,
                        max_amount: 10,
                }],
            },
        );
        world.add_component(container, Inventory::new(4, 99));
        world.add_component(container, Position(unit::WorldPosition::ORIGIN));

        let goals = Rc::new(RefCell::new(GoalRegistry::new()));
        let mut system = StorageGoalSystem::new(goals.clone(), catalog, 0.0);
        system.update(&mut world, 1.0);

        let created = goals.borrow().goals_by_owner(GoalOwner::Storage).next().unwrap().item_def_name;
        assert_eq!(created, Some(food_id));
    }

    fn build_crafting_catalogs() -> (Arc<AssetCatalog>, Arc<RecipeCatalog>, DefNameId, DefNameId) {
        use assets::{AssetDefinitionBuilder, HarvestableCapability, RecipeBuilder};

        // registration order below fixes ids: tree=1, wood=2, nails=3, workbench=4
        let mut tree = AssetDefinitionBuilder::new("tree");
        tree.harvestable = Some(HarvestableCapability {
            yield_def_name: "wood".to_owned(),
            yield_id: DefNameId::new(2),
            amount_min: 1,
            amount_max: 1,
            duration: 1.0,
            destructive: true,
            ..Default::default()
        });
        let mut wood = AssetDefinitionBuilder::new("wood");
        wood.category = assets::Category::RawMaterial;
        let mut nails = AssetDefinitionBuilder::new("nails");
        nails.category = assets::Category::RawMaterial;
        let mut workbench = AssetDefinitionBuilder::new("workbench");
        workbench.category = assets::Category::Furniture;

        let catalog = Arc::new(AssetCatalog::build(vec![tree, wood, nails, workbench]));
        let wood_id = catalog.get_def_name_id("wood").unwrap();
        let station_id = catalog.get_def_name_id("workbench").unwrap();

        let mut recipe = RecipeBuilder::new("chair");
        recipe.inputs = vec![("wood".to_owned(), 2), ("nails".to_owned(), 4)];
        recipe.outputs = vec![];
        recipe.station_def_name = Some("workbench".to_owned());
        let recipes = Arc::new(RecipeCatalog::build(vec![recipe], &catalog));

        (catalog, recipes, wood_id, station_id)
    }

    #[test]
    fn craft_goal_spawns_blocked_parent_with_haul_children() {
        let (catalog, recipes, wood_id, station_id) = build_crafting_catalogs();

        let mut world = World::new();
        let station = world.create_entity();
        world.add_component(
            station,
            WorkQueue {
                jobs: vec![crate::components::WorkJob::new(recipes.get("chair").unwrap().id, 1)],
                progress: 0.0,
            },
        );
        world.add_component(station, Position(unit::WorldPosition::ORIGIN));

        let goals = Rc::new(RefCell::new(GoalRegistry::new()));
        let mut system = CraftingGoalSystem::new(goals.clone(), catalog, recipes, 0.0);
        system.update(&mut world, 1.0);

        let goals = goals.borrow();
        let parent = goals
            .goals_by_owner(GoalOwner::Crafting)
            .find(|g| g.parent.is_none())
            .expect("parent craft goal");
        assert_eq!(parent.status, GoalStatus::Blocked);
        assert_eq!(parent.destination, Some(station));

        let hauls: Vec<_> = goals
            .goals_by_owner(GoalOwner::Crafting)
            .filter(|g| g.kind == TaskKind::Haul && g.parent == Some(parent.id))
            .collect();
        assert_eq!(hauls.len(), 2);

        let wood_haul = hauls.iter().find(|h| h.item_def_name == Some(wood_id)).unwrap();
        // wood is harvestable from a tree, so the haul waits on a sibling harvest
        assert_eq!(wood_haul.status, GoalStatus::WaitingForItems);
        assert!(wood_haul.depends_on.is_some());
        assert!(wood_haul.chain_id.is_some());

        let harvests: Vec<_> = goals
            .goals_by_owner(GoalOwner::Crafting)
            .filter(|g| g.kind == TaskKind::Harvest && g.parent == Some(parent.id))
            .collect();
        assert_eq!(harvests.len(), 1);
        assert_eq!(harvests[0].chain_id, wood_haul.chain_id);

        let _ = station_id;
    }

    #[test]
    fn delivering_both_hauls_unblocks_the_craft_goal() {
        let (catalog, recipes, _wood_id, _station_id) = build_crafting_catalogs();

        let mut world = World::new();
        let station = world.create_entity();
        world.add_component(
            station,
            WorkQueue {
                jobs: vec![crate::components::WorkJob::new(recipes.get("chair").unwrap().id, 1)],
                progress: 0.0,
            },
        );
        world.add_component(station, Position(unit::WorldPosition::ORIGIN));

        let goals = Rc::new(RefCell::new(GoalRegistry::new()));
        let mut system = CraftingGoalSystem::new(goals.clone(), catalog, recipes, 0.0);
        system.update(&mut world, 1.0);

        let (parent_id, harvest_id, haul_ids) = {
            let g = goals.borrow();
            let parent = g.goals_by_owner(GoalOwner::Crafting).find(|g| g.parent.is_none()).unwrap();
            let harvest = g
                .goals_by_owner(GoalOwner::Crafting)
                .find(|g| g.kind == TaskKind::Harvest)
                .unwrap();
            let hauls: Vec<_> = g
                .goals_by_owner(GoalOwner::Crafting)
                .filter(|g| g.kind == TaskKind::Haul)
                .map(|g| g.id)
                .collect();
            (parent.id, harvest.id, hauls)
        };

        // the harvest completing should unblock the haul that depends on it
        goals.borrow_mut().notify_goal_completed(harvest_id);
        for haul in &haul_ids {
            if goals.borrow().get(*haul).unwrap().depends_on == Some(harvest_id) {
                assert_eq!(goals.borrow().get(*haul).unwrap().status, GoalStatus::Available);
            }
        }

        // completing every child unblocks the parent
        goals.borrow_mut().notify_goal_completed(harvest_id);
        for haul in &haul_ids {
            goals.borrow_mut().notify_goal_completed(*haul);
        }
        assert_eq!(goals.borrow().get(parent_id).unwrap().status, GoalStatus::Available);
    }
}
