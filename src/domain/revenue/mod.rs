pub mod revenue_client;
pub mod revenue_history;
