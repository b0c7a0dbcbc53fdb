use assets::DefNameId;
use ecs::EntityId;
use unit::WorldPosition;

use crate::goal::GoalId;
use crate::kinds::{Need, TaskKind};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TaskState {
    /// Just assigned, hasn't started moving yet
    Idle,
    Moving,
    Arrived,
    Acting,
    Complete,
}

/// A colonist's current undertaking, assigned by the decision evaluator
/// and driven through its states by [`crate::movement_system`] and
/// [`crate::action_system`].
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub kind: TaskKind,
    pub state: TaskState,
    pub target_pos: Option<WorldPosition>,
    pub need_to_fulfill: Option<Need>,
    /// Links a task back to the [`crate::goal::GoalId`] it was spawned for,
    /// so multi-step goals (haul-then-deliver) can chain.
    pub chain_id: Option<u64>,
    pub chain_step: u32,
    pub time_since_evaluation: f32,
    pub reason: String,
    pub haul_item: Option<DefNameId>,
    pub haul_source: Option<WorldPosition>,
    pub haul_target: Option<WorldPosition>,
    /// The defName the evaluator resolved this task's target entity to, e.g.
    /// which food item to eat. `None` for a ground-fallback Energy/Bladder
    /// task or a Wander.
    pub target_def_name_id: Option<DefNameId>,
    /// A task-kind-specific entity reference resolved at assignment time:
    /// a Haul's drop-off destination, a Craft's station, or a
    /// PlacePackaged's carried entity. `None` until whatever system
    /// assigns the goal sets it.
    pub related_entity: Option<EntityId>,
    /// The goal registry entry this task was claimed from, if any. Lets
    /// [`crate::action_system`] report completion (and partial progress,
    /// e.g. a harvest yield) back into [`crate::goal::GoalRegistry`] once
    /// the task finishes. `None` for need-fulfillment and discovery-only
    /// tasks that aren't backed by the goal registry.
    pub related_goal: Option<GoalId>,
}

impl Task {
    pub fn idle() -> Self {
        Self {
            kind: TaskKind::Wander,
            state: TaskState::Complete,
            target_pos: None,
            need_to_fulfill: None,
            chain_id: None,
            chain_step: 0,
            time_since_evaluation: f32::MAX,
            reason: String::new(),
            haul_item: None,
            haul_source: None,
            haul_target: None,
            target_def_name_id: None,
            related_entity: None,
            related_goal: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == TaskState::Complete
    }
}
