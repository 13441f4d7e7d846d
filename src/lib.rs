use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::simulation::sequence_builder::SimulationPlan;
use crate::domain::simulation::simulation_config::SimulationConfig;
use crate::error::Result;

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Generates the full schedule of a run starting at `start_time`.
///
/// A `seed` makes the plan reproducible; without one the OS entropy source is used.
pub fn generate_simulation_plan(config: SimulationConfig, start_time: DateTime<Utc>, seed: Option<u64>) -> Result<SimulationPlan> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let plan = SimulationPlan::build(config, start_time, &mut rng)?;
    log::info!("Simulation plan generated: {} vehicles, {} events spanning {} ms.", config.vehicle_count, plan.len(), plan.last_delay_ms());

    Ok(plan)
}
