pub mod scheduler;
pub mod sequence_builder;
pub mod simulation_config;
pub mod vehicle_event;
