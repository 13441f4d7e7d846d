use serde::{Deserialize, Serialize};

use crate::domain::simulation::simulation_config::SimulationConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3003/api";

/// Root of the JSON configuration file. Every section is optional.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfigDto {
    pub api: ApiConfigDto,
    pub simulation: SimulationConfig,
    pub polling: PollingConfigDto,
    pub logging: LoggingConfigDto,
    pub statistics_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfigDto {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfigDto {
    fn default() -> Self {
        ApiConfigDto { base_url: DEFAULT_BASE_URL.to_string(), timeout_ms: 5_000 }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PollingConfigDto {
    pub parking_interval_ms: u64,
    pub revenue_interval_ms: u64,
    pub monitoring_interval_ms: u64,
    pub events_interval_ms: u64,
}

impl Default for PollingConfigDto {
    fn default() -> Self {
        PollingConfigDto { parking_interval_ms: 10_000, revenue_interval_ms: 30_000, monitoring_interval_ms: 30_000, events_interval_ms: 15_000 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogBackend {
    #[default]
    Fern,
    Tracing,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfigDto {
    pub backend: LogBackend,
    pub directory: String,
    pub file: String,
}

impl Default for LoggingConfigDto {
    fn default() -> Self {
        LoggingConfigDto { backend: LogBackend::Fern, directory: "logs".to_string(), file: "garage_analytics.log".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_yields_defaults() {
        let dto: AppConfigDto = serde_json::from_str("{}").unwrap();
        assert_eq!(dto, AppConfigDto::default());
        assert_eq!(dto.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(dto.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let json = r#"{
            "api": {"timeoutMs": 1500},
            "simulation": {"vehicleCount": 10, "durationMinutes": 5, "eventIntervalMs": 1000},
            "logging": {"backend": "tracing"}
        }"#;

        let dto: AppConfigDto = serde_json::from_str(json).unwrap();

        assert_eq!(dto.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(dto.api.timeout_ms, 1500);
        assert_eq!(dto.simulation.vehicle_count, 10);
        assert_eq!(dto.simulation.growth_rate, 0.15);
        assert_eq!(dto.logging.backend, LogBackend::Tracing);
        assert_eq!(dto.logging.directory, "logs");
        assert_eq!(dto.polling.parking_interval_ms, 10_000);
    }

    #[test]
    fn test_partial_simulation_section_keeps_field_defaults() {
        let dto: AppConfigDto = serde_json::from_str(r#"{"simulation": {"vehicleCount": 200}}"#).unwrap();

        assert_eq!(dto.simulation.vehicle_count, 200);
        assert_eq!(dto.simulation.duration_minutes, 120);
        assert_eq!(dto.simulation.event_interval_ms, 30_000);
        assert_eq!(dto.simulation.growth_rate, 0.15);
    }
}
