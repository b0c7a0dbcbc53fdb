use common::*;

/// The kind of work a [`crate::goal::GoalTask`] or [`crate::components::Task`]
/// represents. Shared between the goal registry, the per-agent `Task`
/// component and the decision evaluator's traced options so a goal and the
/// task it spawns always agree on vocabulary.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum TaskKind {
    Haul,
    Craft,
    Harvest,
    PlacePackaged,
    Gather,
    FulfillNeed,
    Wander,
}

/// One of the eight tracked colonist needs. Only the first five currently
/// drive behaviour; the rest decay but have no consumer yet.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Need {
    Hunger,
    Thirst,
    Energy,
    Bladder,
    Digestion,
    Hygiene,
    Recreation,
    Temperature,
}

pub const NEED_COUNT: usize = 8;

impl Need {
    pub const ALL: [Need; NEED_COUNT] = [
        Need::Hunger,
        Need::Thirst,
        Need::Energy,
        Need::Bladder,
        Need::Digestion,
        Need::Hygiene,
        Need::Recreation,
        Need::Temperature,
    ];

    /// The needs the decision evaluator resolves a fulfilment target for.
    /// The rest decay passively with no behavioural hook yet.
    pub const ACTIONABLE: [Need; 4] = [Need::Hunger, Need::Thirst, Need::Energy, Need::Bladder];
}

slog_value_debug!(TaskKind);
slog_value_debug!(Need);
