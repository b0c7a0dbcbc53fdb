//! Hand-rolled entity-component-system runtime.
//!
//! Entities are opaque generational handles ([`EntityId`]); components are
//! plain value types stored in per-type sparse sets ([`ComponentPool`]);
//! [`World`] owns every pool and runs registered [`System`]s in priority
//! order each tick.

pub use entity::EntityId;
pub use pool::ComponentPool;
pub use world::{System, World};

mod entity;
mod pool;
mod view;
mod world;
