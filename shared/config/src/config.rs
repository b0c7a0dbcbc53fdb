use serde::Deserialize;

#[derive(Deserialize)]
pub struct Config {
    pub world: World,
    pub placement: Placement,
    pub simulation: Simulation,
}

#[derive(Deserialize)]
pub struct World {
    pub random_seed: Option<u64>,
    pub load_radius: i32,
    pub unload_radius: i32,
    pub worker_threads: Option<usize>,
}

#[derive(Deserialize)]
pub struct Placement {
    /// Spatial index cell size in tiles.
    pub cell_size: f32,
    /// How many rings of neighbouring chunks a cross-chunk relationship query may reach.
    pub cross_chunk_rings: i32,
}

#[derive(Deserialize)]
pub struct Simulation {
    pub random_seed: Option<u64>,
    pub base_time_scale: f32,
    pub days_per_season: u32,
    pub decision_reevaluation_period: f32,
    pub reservation_timeout: f32,
    pub goal_producer_period: f32,
}
