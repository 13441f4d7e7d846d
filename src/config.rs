use std::path::Path;
use std::time::Duration;

use crate::api::config_dto::{AppConfigDto, LoggingConfigDto};
use crate::domain::simulation::simulation_config::SimulationConfig;
use crate::error::{Error, Result};
use crate::loader::parser::parse_json_file;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingIntervals {
    pub parking: Duration,
    pub revenue: Duration,
    pub monitoring: Duration,
    pub events: Duration,
}

/// Command line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub vehicle_count: Option<u32>,
    pub duration_minutes: Option<u32>,
    pub event_interval_ms: Option<u64>,
    pub growth_rate: Option<f64>,
    pub statistics_file: Option<String>,
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub simulation: SimulationConfig,
    pub polling: PollingIntervals,
    pub logging: LoggingConfigDto,
    pub statistics_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // The defaults are known to be valid.
        Self::build(AppConfigDto::default())
    }
}

impl AppConfig {
    /// Reads the file when given, otherwise starts from the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let dto = match path {
            Some(path) => {
                log::info!("Loading configuration from '{}'.", path.display());
                parse_json_file::<AppConfigDto, _>(path)?
            }
            None => AppConfigDto::default(),
        };
        Self::from_dto(dto)
    }

    pub fn from_dto(dto: AppConfigDto) -> Result<Self> {
        let config = Self::build(dto);
        config.validate()?;
        Ok(config)
    }

    fn build(dto: AppConfigDto) -> Self {
        AppConfig {
            base_url: dto.api.base_url,
            timeout: Duration::from_millis(dto.api.timeout_ms),
            simulation: dto.simulation,
            polling: PollingIntervals {
                parking: Duration::from_millis(dto.polling.parking_interval_ms),
                revenue: Duration::from_millis(dto.polling.revenue_interval_ms),
                monitoring: Duration::from_millis(dto.polling.monitoring_interval_ms),
                events: Duration::from_millis(dto.polling.events_interval_ms),
            },
            logging: dto.logging,
            statistics_file: dto.statistics_file,
        }
    }

    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(v) = overrides.vehicle_count {
            self.simulation.vehicle_count = v;
        }
        if let Some(d) = overrides.duration_minutes {
            self.simulation.duration_minutes = d;
        }
        if let Some(i) = overrides.event_interval_ms {
            self.simulation.event_interval_ms = i;
        }
        if let Some(g) = overrides.growth_rate {
            self.simulation.growth_rate = g;
        }
        if overrides.statistics_file.is_some() {
            self.statistics_file = overrides.statistics_file;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!("api.baseUrl must be an http(s) URL, got '{}'", self.base_url)));
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("api.timeoutMs must be positive".to_string()));
        }
        for (name, period) in [
            ("polling.parkingIntervalMs", self.polling.parking),
            ("polling.revenueIntervalMs", self.polling.revenue),
            ("polling.monitoringIntervalMs", self.polling.monitoring),
            ("polling.eventsIntervalMs", self.polling.events),
        ] {
            if period.is_zero() {
                return Err(Error::InvalidConfig(format!("{} must be positive", name)));
            }
        }
        self.simulation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config_dto::DEFAULT_BASE_URL;
    use crate::loader::parser::parse_json_str;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::load(None).unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.polling.parking, Duration::from_secs(10));
        assert_eq!(config.polling.revenue, Duration::from_secs(30));
        assert_eq!(config.polling.events, Duration::from_secs(15));
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = ConfigOverrides {
            base_url: Some("http://garage.local:8080/api".to_string()),
            vehicle_count: Some(7),
            statistics_file: Some("stats.csv".to_string()),
            ..Default::default()
        };

        let config = AppConfig::default().apply(overrides).unwrap();

        assert_eq!(config.base_url, "http://garage.local:8080/api");
        assert_eq!(config.simulation.vehicle_count, 7);
        assert_eq!(config.simulation.duration_minutes, 120);
        assert_eq!(config.statistics_file.as_deref(), Some("stats.csv"));
    }

    #[test]
    fn test_zero_override_is_rejected() {
        let overrides = ConfigOverrides { event_interval_ms: Some(0), ..Default::default() };
        assert!(matches!(AppConfig::default().apply(overrides), Err(Error::InvalidSimulationConfig(_))));
    }

    #[test]
    fn test_invalid_file_values_are_rejected() {
        let dto: AppConfigDto = parse_json_str(r#"{"api": {"baseUrl": "localhost:3003"}}"#).unwrap();
        assert!(matches!(AppConfig::from_dto(dto), Err(Error::InvalidConfig(_))));

        let dto: AppConfigDto = parse_json_str(r#"{"polling": {"revenueIntervalMs": 0}}"#).unwrap();
        assert!(matches!(AppConfig::from_dto(dto), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_polling_periods_come_from_the_file() {
        let dto: AppConfigDto = parse_json_str(r#"{"polling": {"revenueIntervalMs": 45000, "eventsIntervalMs": 5000}}"#).unwrap();
        let config = AppConfig::from_dto(dto).unwrap();

        assert_eq!(config.polling.revenue, Duration::from_secs(45));
        assert_eq!(config.polling.events, Duration::from_secs(5));
        assert_eq!(config.polling.monitoring, Duration::from_secs(30));

        let dto: AppConfigDto = parse_json_str(r#"{"polling": {"eventsIntervalMs": 0}}"#).unwrap();
        assert!(matches!(AppConfig::from_dto(dto), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        assert!(matches!(AppConfig::load(Some(Path::new("/nonexistent/garage.json"))), Err(Error::IoError(_))));
    }
}
