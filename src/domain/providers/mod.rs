pub mod parking_data;
pub mod vehicle_events;
