use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest fleet whose plates still fit the `SIM` + 4 digit format.
pub const MAX_VEHICLE_COUNT: u32 = 9999;

/// Parameters of one bulk simulation run.
///
/// Use [`SimulationConfig::new`] (or [`SimulationConfig::validate`] after deserializing)
/// to make sure every field is positive before building a plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    pub vehicle_count: u32,
    pub duration_minutes: u32,
    pub event_interval_ms: u64,
    pub growth_rate: f64,
}

fn default_growth_rate() -> f64 {
    0.15
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig { vehicle_count: 50, duration_minutes: 120, event_interval_ms: 30_000, growth_rate: default_growth_rate() }
    }
}

impl SimulationConfig {
    pub fn new(vehicle_count: u32, duration_minutes: u32, event_interval_ms: u64) -> Result<Self> {
        let config = SimulationConfig { vehicle_count, duration_minutes, event_interval_ms, growth_rate: default_growth_rate() };
        config.validate()?;
        Ok(config)
    }

    pub fn with_growth_rate(mut self, growth_rate: f64) -> Result<Self> {
        self.growth_rate = growth_rate;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vehicle_count == 0 {
            return Err(Error::InvalidSimulationConfig("vehicleCount must be positive".to_string()));
        }
        if self.vehicle_count > MAX_VEHICLE_COUNT {
            return Err(Error::InvalidSimulationConfig(format!("vehicleCount must not exceed {}, got {}", MAX_VEHICLE_COUNT, self.vehicle_count)));
        }
        if self.duration_minutes == 0 {
            return Err(Error::InvalidSimulationConfig("durationMinutes must be positive".to_string()));
        }
        if self.event_interval_ms == 0 {
            return Err(Error::InvalidSimulationConfig("eventIntervalMs must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.growth_rate) {
            return Err(Error::InvalidSimulationConfig(format!("growthRate must be within [0, 1], got {}", self.growth_rate)));
        }
        Ok(())
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_minutes as u64 * 60_000
    }

    /// Delay of the last EXIT event, i.e. how long a full run takes.
    pub fn total_span_ms(&self) -> u64 {
        (self.vehicle_count as u64).saturating_sub(1).saturating_mul(self.event_interval_ms).saturating_add(self.duration_ms())
    }

    pub fn total_events(&self) -> usize {
        self.vehicle_count as usize * 3
    }
}

/// Canned scenarios offered by the load simulation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPreset {
    Conservative,
    Moderate,
    Aggressive,
}

impl SimulationPreset {
    pub fn config(&self) -> SimulationConfig {
        match self {
            SimulationPreset::Conservative => SimulationConfig { vehicle_count: 25, duration_minutes: 60, event_interval_ms: 60_000, growth_rate: 0.10 },
            SimulationPreset::Moderate => SimulationConfig { vehicle_count: 100, duration_minutes: 180, event_interval_ms: 30_000, growth_rate: 0.20 },
            SimulationPreset::Aggressive => SimulationConfig { vehicle_count: 200, duration_minutes: 240, event_interval_ms: 15_000, growth_rate: 0.30 },
        }
    }
}

impl FromStr for SimulationPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "conservative" => Ok(SimulationPreset::Conservative),
            "moderate" => Ok(SimulationPreset::Moderate),
            "aggressive" => Ok(SimulationPreset::Aggressive),
            _ => Err(Error::InvalidSimulationConfig(format!("unknown preset '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_fields() {
        assert!(matches!(SimulationConfig::new(0, 10, 1000), Err(Error::InvalidSimulationConfig(_))));
        assert!(matches!(SimulationConfig::new(1, 0, 1000), Err(Error::InvalidSimulationConfig(_))));
        assert!(matches!(SimulationConfig::new(1, 10, 0), Err(Error::InvalidSimulationConfig(_))));
        assert!(matches!(SimulationConfig::new(MAX_VEHICLE_COUNT + 1, 10, 1000), Err(Error::InvalidSimulationConfig(_))));
        assert!(SimulationConfig::new(1, 1, 1).is_ok());
    }

    #[test]
    fn test_growth_rate_bounds() {
        let config = SimulationConfig::new(5, 10, 1000).unwrap();
        assert!(config.with_growth_rate(1.5).is_err());
        assert!(config.with_growth_rate(-0.1).is_err());
        assert_eq!(config.with_growth_rate(0.3).unwrap().growth_rate, 0.3);
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in [SimulationPreset::Conservative, SimulationPreset::Moderate, SimulationPreset::Aggressive] {
            assert!(preset.config().validate().is_ok());
        }
        assert_eq!("Moderate".parse::<SimulationPreset>().unwrap().config().vehicle_count, 100);
        assert!("reckless".parse::<SimulationPreset>().is_err());
    }

    #[test]
    fn test_total_span() {
        let config = SimulationConfig::new(3, 10, 30_000).unwrap();
        assert_eq!(config.total_span_ms(), 2 * 30_000 + 600_000);
        assert_eq!(config.total_events(), 9);
    }

    #[test]
    fn test_total_span_saturates_on_huge_interval() {
        let config = SimulationConfig::new(MAX_VEHICLE_COUNT, 10, u64::MAX / 2).unwrap();
        assert_eq!(config.total_span_ms(), u64::MAX);
    }

    #[test]
    fn test_deserializes_camel_case_with_default_growth() {
        let config: SimulationConfig = serde_json::from_str(r#"{"vehicleCount": 4, "durationMinutes": 30, "eventIntervalMs": 10000}"#).unwrap();
        assert_eq!(config.vehicle_count, 4);
        assert_eq!(config.growth_rate, 0.15);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: SimulationConfig = serde_json::from_str(r#"{"vehicleCount": 200}"#).unwrap();
        assert_eq!(config.vehicle_count, 200);
        assert_eq!(config.duration_minutes, SimulationConfig::default().duration_minutes);
        assert_eq!(config.event_interval_ms, SimulationConfig::default().event_interval_ms);
    }
}
