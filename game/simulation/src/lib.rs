//! Colonist simulation: the ECS components and systems driving needs decay,
//! vision, goal production, decision-making, movement, and action resolution
//! for a colony of autonomous colonists.
//!
//! Owns no rendering or input state; hosts drive it by calling
//! [`ecs::World::update`] each tick and reading components back out
//! through [`ecs::World`] views.

pub mod components;
pub mod goal;

mod action_system;
mod decision;
mod kinds;
mod movement_system;
mod needs_decay;
mod render_extraction;
mod reservation_sweep;
mod selection;
mod task_registry;
mod time;
mod vision;

pub use action_system::{ActionSystem, WorldCallbacks};
pub use decision::AIDecisionSystem;
pub use kinds::{Need, TaskKind, NEED_COUNT};
pub use movement_system::{MovementSystem, PhysicsSystem};
pub use needs_decay::NeedsDecaySystem;
pub use render_extraction::{ExtractedDynamicEntity, ExtractedGhost, FrameExtractor, RenderExtract, RenderFrame};
pub use reservation_sweep::ReservationSweepSystem;
pub use selection::{PlaceOutcome, PlacementMode, PlacementState, Selection, WorldEntityLookup};
pub use task_registry::{DiscoveryTask, DiscoveryTaskId, GlobalTaskRegistry};
pub use time::{GameTime, Speed, TimeSystem};
pub use vision::VisionSystem;
