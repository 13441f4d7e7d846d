use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::domain::clock::clock::SharedClock;
use crate::domain::http::api_error::ApiError;
use crate::domain::revenue::revenue_history::round_cents;
use crate::domain::simulation::sequence_builder::SECTORS;
use crate::domain::simulation::vehicle_event::EventType;
use crate::domain::utils::id::{LicensePlate, SectorId};

pub const RECENT_EVENT_COUNT: usize = 20;

const EVENT_TYPES: [EventType; 3] = [EventType::Entry, EventType::Exit, EventType::Parked];
const LOOKBACK_MS: i64 = 2 * 3_600_000;
const AMOUNT_MIN: f64 = 5.0;
const AMOUNT_MAX: f64 = 55.0;
const STAY_MINUTES_MIN: u32 = 30;
const STAY_MINUTES_MAX: u32 = 210;

/// One entry of the recent activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEvent {
    pub id: u32,
    pub license_plate: LicensePlate,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub sector: SectorId,
    pub amount: f64,
    /// Length of the stay in minutes, when known.
    pub duration_minutes: Option<u32>,
}

#[async_trait]
pub trait VehicleEventsProvider: std::fmt::Debug + Send + Sync {
    async fn recent_events(&self) -> Result<Vec<RecentEvent>, ApiError>;
}

pub type SharedVehicleEventsProvider = Arc<dyn VehicleEventsProvider>;

/// Random activity feed: plates `ABC0001..`, timestamps within the last two hours,
/// stays of 30 to 210 minutes.
#[derive(Debug)]
pub struct SyntheticEventsProvider {
    rng: Mutex<StdRng>,
    clock: SharedClock,
    count: usize,
}

impl SyntheticEventsProvider {
    pub fn new(clock: SharedClock) -> Self {
        SyntheticEventsProvider { rng: Mutex::new(StdRng::from_os_rng()), clock, count: RECENT_EVENT_COUNT }
    }

    pub fn seeded(seed: u64, clock: SharedClock) -> Self {
        SyntheticEventsProvider { rng: Mutex::new(StdRng::seed_from_u64(seed)), clock, count: RECENT_EVENT_COUNT }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn generate(&self) -> Vec<RecentEvent> {
        let now = self.clock.now();
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        (1..=self.count as u32)
            .map(|id| {
                let age = TimeDelta::milliseconds(rng.random_range(0..LOOKBACK_MS));
                RecentEvent {
                    id,
                    license_plate: LicensePlate::new(format!("ABC{:04}", id)),
                    event_type: *EVENT_TYPES.choose(&mut *rng).unwrap_or(&EventType::Entry),
                    timestamp: now.checked_sub_signed(age).unwrap_or(now),
                    sector: SectorId::new(*SECTORS.choose(&mut *rng).unwrap_or(&SECTORS[0])),
                    amount: round_cents(rng.random_range(AMOUNT_MIN..AMOUNT_MAX)),
                    duration_minutes: Some(rng.random_range(STAY_MINUTES_MIN..STAY_MINUTES_MAX)),
                }
            })
            .collect()
    }
}

#[async_trait]
impl VehicleEventsProvider for SyntheticEventsProvider {
    async fn recent_events(&self) -> Result<Vec<RecentEvent>, ApiError> {
        Ok(self.generate())
    }
}
