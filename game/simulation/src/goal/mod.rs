//! Colony-wide goal tracking, independent of any one colonist's lifetime.

pub mod producers;
mod registry;

pub use producers::{BuildGoalSystem, CraftingGoalSystem, StorageGoalSystem};
pub use registry::{GoalId, GoalOwner, GoalRegistry, GoalStatus, GoalTask, ItemKey};
