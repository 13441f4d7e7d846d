pub mod config_dto;
pub mod garage_dto;
pub mod monitoring_dto;
pub mod revenue_dto;
pub mod webhook_dto;
