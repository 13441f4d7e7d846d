use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use crate::domain::simulation::simulation_config::SimulationConfig;
use crate::domain::simulation::vehicle_event::{ScheduledEvent, VehicleEvent};
use crate::domain::utils::id::{LicensePlate, SectorId};
use crate::error::{Error, Result};

pub const SECTORS: [&str; 4] = ["A", "B", "C", "D"];

/// Garage entrance used as the centre of the simulated parking coordinates.
pub const BASE_LAT: f64 = -23.561684;
pub const BASE_LNG: f64 = -46.655981;
pub const COORDINATE_JITTER: f64 = 0.0005;

/// A vehicle parks between one and five minutes after entering.
pub const PARKED_OFFSET_MIN_MS: u64 = 60_000;
pub const PARKED_OFFSET_MAX_MS: u64 = 300_000;

pub fn license_plate_for(index: u64) -> LicensePlate {
    LicensePlate::new(format!("SIM{:04}", index + 1))
}

/// Enumerates the ENTRY, PARKED and EXIT events of every simulated vehicle, sorted by delay.
///
/// Pure apart from the supplied random source: the same config, start time and seed
/// always produce the same sequence. PARKED is clamped to land strictly before EXIT,
/// so `entry < parked < exit` holds even for one-minute stays.
pub fn build_sequence<R: Rng>(config: &SimulationConfig, start_time: DateTime<Utc>, rng: &mut R) -> Result<Vec<ScheduledEvent>> {
    config.validate()?;

    let duration_ms = config.duration_ms();
    let mut events = Vec::with_capacity(config.total_events());

    for index in 0..config.vehicle_count as u64 {
        let license_plate = license_plate_for(index);
        let sector = SectorId::new(*SECTORS.choose(rng).unwrap_or(&SECTORS[0]));

        let entry_delay = index.checked_mul(config.event_interval_ms).ok_or_else(|| span_overflow(config))?;
        let exit_delay = entry_delay.checked_add(duration_ms).ok_or_else(|| span_overflow(config))?;
        let parked_offset = rng.random_range(PARKED_OFFSET_MIN_MS..PARKED_OFFSET_MAX_MS);
        let parked_delay = entry_delay.saturating_add(parked_offset).min(exit_delay - 1);

        let lat = BASE_LAT + rng.random_range(-COORDINATE_JITTER..COORDINATE_JITTER);
        let lng = BASE_LNG + rng.random_range(-COORDINATE_JITTER..COORDINATE_JITTER);

        let entry_time = offset(start_time, entry_delay).ok_or_else(|| span_overflow(config))?;
        let exit_time = offset(start_time, exit_delay).ok_or_else(|| span_overflow(config))?;

        events.push(ScheduledEvent::new(VehicleEvent::entry(license_plate.clone(), sector.clone(), entry_time), entry_delay));
        events.push(ScheduledEvent::new(VehicleEvent::parked(license_plate.clone(), sector.clone(), lat, lng), parked_delay));
        events.push(ScheduledEvent::new(VehicleEvent::exit(license_plate, sector, exit_time), exit_delay));
    }

    // Stable: equal delays keep generation order.
    events.sort_by_key(|scheduled| scheduled.delay_ms);

    Ok(events)
}

fn offset(start_time: DateTime<Utc>, delay_ms: u64) -> Option<DateTime<Utc>> {
    let delta = TimeDelta::try_milliseconds(i64::try_from(delay_ms).ok()?)?;
    start_time.checked_add_signed(delta)
}

fn span_overflow(config: &SimulationConfig) -> Error {
    Error::InvalidSimulationConfig(format!(
        "schedule of {} vehicles every {} ms does not fit in the representable time range",
        config.vehicle_count, config.event_interval_ms
    ))
}

/// What a started run reports back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub total_events: usize,
    pub duration: u32,
    pub vehicle_count: u32,
}

/// A fully generated run: the configuration, its start time and the sorted schedule.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub config: Option<SimulationConfig>,
    pub start_time: DateTime<Utc>,
    pub events: Vec<ScheduledEvent>,
}

impl SimulationPlan {
    pub fn build<R: Rng>(config: SimulationConfig, start_time: DateTime<Utc>, rng: &mut R) -> Result<Self> {
        let events = build_sequence(&config, start_time, rng)?;
        Ok(SimulationPlan { config: Some(config), start_time, events })
    }

    /// A plan with no vehicles; scheduling it arms no timers.
    pub fn empty(start_time: DateTime<Utc>) -> Self {
        SimulationPlan { config: None, start_time, events: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last_delay_ms(&self) -> u64 {
        self.events.last().map(|scheduled| scheduled.delay_ms).unwrap_or(0)
    }

    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            total_events: self.events.len(),
            duration: self.config.map(|c| c.duration_minutes).unwrap_or(0),
            vehicle_count: self.config.map(|c| c.vehicle_count).unwrap_or(0),
        }
    }

    pub fn into_events(self) -> Vec<ScheduledEvent> {
        self.events
    }
}
