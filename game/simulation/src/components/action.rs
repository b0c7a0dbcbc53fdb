use assets::DefNameId;
use ecs::EntityId;
use unit::WorldPosition;

use crate::kinds::Need;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ActionState {
    Starting,
    InProgress,
    Complete,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NeedEffect {
    pub need: Need,
    pub amount: f32,
}

/// The concrete thing an in-progress action does once its duration elapses.
/// One variant per interaction the decision evaluator can pick.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionKind {
    Eat { nutrition: f32 },
    Drink { quality: f32 },
    Sleep { quality: f32 },
    Toilet { spawn_pos: WorldPosition },
    Harvest {
        def_name: DefNameId,
        destructive: bool,
        yield_def_name: DefNameId,
        count_min: u32,
        count_max: u32,
        has_pool: bool,
    },
    Pickup { def_name: DefNameId, source: WorldPosition },
    Craft { recipe: DefNameId, station: EntityId },
    DropOff { def_name: DefNameId, qty: u32, destination: EntityId },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActiveAction {
    pub kind: ActionKind,
    pub duration: f32,
    pub elapsed: f32,
    pub state: ActionState,
    pub primary_effect: Option<NeedEffect>,
    pub side_effect: Option<NeedEffect>,
}

impl ActiveAction {
    pub fn new(kind: ActionKind, duration: f32) -> Self {
        Self {
            kind,
            duration,
            elapsed: 0.0,
            state: ActionState::Starting,
            primary_effect: None,
            side_effect: None,
        }
    }

    pub fn with_effects(mut self, primary: Option<NeedEffect>, side: Option<NeedEffect>) -> Self {
        self.primary_effect = primary;
        self.side_effect = side;
        self
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }
}

/// Always present on a colonist entity so [`crate::action_system::ActionSystem`]
/// can drive a uniform view rather than add/remove the pool membership per
/// task transition. `None` means idle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Action(pub Option<ActiveAction>);
