pub mod event_analytics;
