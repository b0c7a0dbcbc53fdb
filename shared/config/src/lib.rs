//! Hot-reloadable RON configuration, watched on a background thread and
//! swapped under a mutex. See [`load::init`] / [`load::get`].

mod config;
mod load;

pub use config::{Config, Placement, Simulation, World};
pub use load::{get, init, load_time, ConfigError};
