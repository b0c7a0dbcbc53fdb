//! ECS component types.

mod action;
mod appearance;
mod colonist;
mod decision_trace;
mod inventory;
mod memory;
mod packaged;
mod storage_configuration;
mod task;
mod transform;
mod work_queue;

pub use action::{Action, ActionKind, ActionState, ActiveAction, NeedEffect};
pub use appearance::Appearance;
pub use colonist::{Colonist, NeedState, NeedsComponent};
pub use decision_trace::{DecisionTrace, EvaluatedOption, OptionStatus};
pub use inventory::{stow_or_keep_in_hand, HandOutcome, Inventory};
pub use memory::{world_entity_key, Memory, WorldMemoryEntry};
pub use packaged::Packaged;
pub use storage_configuration::{Priority, StorageConfiguration, StorageRule};
pub use task::{Task, TaskState};
pub use transform::{MovementTarget, Position, Rotation, Velocity};
pub use work_queue::{WorkJob, WorkQueue};
