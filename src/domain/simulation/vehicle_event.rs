use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::utils::id::{LicensePlate, SectorId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Entry,
    Parked,
    Exit,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Entry => "ENTRY",
            EventType::Parked => "PARKED",
            EventType::Exit => "EXIT",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific data carried by a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventPayload {
    Entry { entry_time: DateTime<Utc> },
    Parked { lat: f64, lng: f64 },
    Exit { exit_time: DateTime<Utc> },
}

/// One step in a simulated vehicle's visit to the garage.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleEvent {
    pub license_plate: LicensePlate,
    pub sector: SectorId,
    pub payload: EventPayload,
}

impl VehicleEvent {
    pub fn entry(license_plate: LicensePlate, sector: SectorId, entry_time: DateTime<Utc>) -> Self {
        VehicleEvent { license_plate, sector, payload: EventPayload::Entry { entry_time } }
    }

    pub fn parked(license_plate: LicensePlate, sector: SectorId, lat: f64, lng: f64) -> Self {
        VehicleEvent { license_plate, sector, payload: EventPayload::Parked { lat, lng } }
    }

    pub fn exit(license_plate: LicensePlate, sector: SectorId, exit_time: DateTime<Utc>) -> Self {
        VehicleEvent { license_plate, sector, payload: EventPayload::Exit { exit_time } }
    }

    pub fn event_type(&self) -> EventType {
        match self.payload {
            EventPayload::Entry { .. } => EventType::Entry,
            EventPayload::Parked { .. } => EventType::Parked,
            EventPayload::Exit { .. } => EventType::Exit,
        }
    }
}

impl fmt::Display for VehicleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload {
            EventPayload::Entry { entry_time } => write!(f, "{} ENTRY  sector {} at {}", self.license_plate, self.sector, entry_time.to_rfc3339()),
            EventPayload::Parked { lat, lng } => write!(f, "{} PARKED sector {} at ({:.6}, {:.6})", self.license_plate, self.sector, lat, lng),
            EventPayload::Exit { exit_time } => write!(f, "{} EXIT   sector {} at {}", self.license_plate, self.sector, exit_time.to_rfc3339()),
        }
    }
}

/// A [`VehicleEvent`] together with its dispatch delay relative to the start of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    pub event: VehicleEvent,
    pub delay_ms: u64,
}

impl ScheduledEvent {
    pub fn new(event: VehicleEvent, delay_ms: u64) -> Self {
        ScheduledEvent { event, delay_ms }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn into_event(self) -> VehicleEvent {
        self.event
    }
}
