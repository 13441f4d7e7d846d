pub mod monitoring_client;
