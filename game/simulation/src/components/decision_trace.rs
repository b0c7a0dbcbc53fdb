use assets::DefNameId;
use unit::WorldPosition;

use crate::kinds::{Need, TaskKind};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum OptionStatus {
    Selected,
    Available,
    /// A need wants fulfilling but nothing known satisfies it
    NoSource,
    /// The need isn't pressing enough to consider right now
    Satisfied,
}

/// One candidate the decision evaluator weighed, kept around for UI
/// inspection rather than discarded after scoring.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluatedOption {
    pub task_type: TaskKind,
    pub need_type: Option<Need>,
    pub need_value: f32,
    pub threshold: f32,
    pub status: OptionStatus,
    pub target_pos: Option<WorldPosition>,
    pub target_def_name_id: Option<DefNameId>,
    pub distance: f32,
    pub score: f32,
    pub reason: String,
}

/// Attached on demand to a colonist entity the UI is inspecting; absent
/// otherwise so untouched colonists don't pay the bookkeeping cost.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecisionTrace {
    pub options: Vec<EvaluatedOption>,
    pub last_eval_time: f64,
    pub summary: String,
}
