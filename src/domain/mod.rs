pub mod analytics;
pub mod clock;
pub mod http;
pub mod monitoring;
pub mod polling;
pub mod providers;
pub mod revenue;
pub mod simulation;
pub mod submission;
pub mod utils;
