use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::api::garage_dto::SectorDto;
use crate::domain::clock::clock::SharedClock;
use crate::domain::http::api_client::ApiClient;
use crate::domain::http::api_error::ApiError;
use crate::domain::http::endpoint::ApiEndpoint;
use crate::domain::simulation::sequence_builder::SECTORS;

pub const SYNTHETIC_SECTOR_CAPACITY: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorOccupancy {
    pub name: String,
    pub total_spots: u32,
    pub occupied_spots: u32,
    pub occupancy_percent: u32,
}

/// Current occupancy of the whole garage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSnapshot {
    pub total_spots: u32,
    pub occupied_spots: u32,
    pub sectors: Vec<SectorOccupancy>,
    pub generated_at: DateTime<Utc>,
}

impl ParkingSnapshot {
    /// Aggregates the per-sector answer of the backend.
    pub fn from_sectors(sectors: &[SectorDto], generated_at: DateTime<Utc>) -> Self {
        let sectors: Vec<SectorOccupancy> = sectors
            .iter()
            .map(|dto| SectorOccupancy {
                name: dto.sector.clone(),
                total_spots: dto.max_capacity,
                occupied_spots: dto.occupied_spots,
                occupancy_percent: (dto.occupancy_rate * 100.0).round().clamp(0.0, 100.0) as u32,
            })
            .collect();

        ParkingSnapshot {
            total_spots: sectors.iter().map(|s| s.total_spots).sum(),
            occupied_spots: sectors.iter().map(|s| s.occupied_spots).sum(),
            sectors,
            generated_at,
        }
    }

    pub fn available_spots(&self) -> u32 {
        self.total_spots.saturating_sub(self.occupied_spots)
    }

    pub fn occupancy_rate(&self) -> f64 {
        if self.total_spots == 0 { 0.0 } else { self.occupied_spots as f64 / self.total_spots as f64 }
    }
}

#[async_trait]
pub trait ParkingDataProvider: std::fmt::Debug + Send + Sync {
    async fn snapshot(&self) -> Result<ParkingSnapshot, ApiError>;
}

pub type SharedParkingDataProvider = Arc<dyn ParkingDataProvider>;

/// Reads `GET /garage/sectors`.
#[derive(Debug, Clone)]
pub struct RemoteParkingProvider {
    client: ApiClient,
    clock: SharedClock,
}

impl RemoteParkingProvider {
    pub fn new(client: ApiClient, clock: SharedClock) -> Self {
        RemoteParkingProvider { client, clock }
    }
}

#[async_trait]
impl ParkingDataProvider for RemoteParkingProvider {
    async fn snapshot(&self) -> Result<ParkingSnapshot, ApiError> {
        let sectors: Vec<SectorDto> = self.client.get_json(ApiEndpoint::GarageSectors).await?;
        Ok(ParkingSnapshot::from_sectors(&sectors, self.clock.now()))
    }
}

/// Random occupancy for demos and for when the backend is down.
///
/// Sector figures and the garage totals are drawn independently, so they need not add up.
#[derive(Debug)]
pub struct SyntheticParkingProvider {
    rng: Mutex<StdRng>,
    clock: SharedClock,
}

impl SyntheticParkingProvider {
    pub fn new(clock: SharedClock) -> Self {
        SyntheticParkingProvider { rng: Mutex::new(StdRng::from_os_rng()), clock }
    }

    pub fn seeded(seed: u64, clock: SharedClock) -> Self {
        SyntheticParkingProvider { rng: Mutex::new(StdRng::seed_from_u64(seed)), clock }
    }

    pub fn generate(&self) -> ParkingSnapshot {
        let total_spots = SYNTHETIC_SECTOR_CAPACITY * SECTORS.len() as u32;
        let generated_at = self.clock.now();

        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let sectors = SECTORS
            .iter()
            .map(|name| SectorOccupancy {
                name: name.to_string(),
                total_spots: SYNTHETIC_SECTOR_CAPACITY,
                occupied_spots: rng.random_range(10..SYNTHETIC_SECTOR_CAPACITY),
                occupancy_percent: rng.random_range(0..100),
            })
            .collect();

        ParkingSnapshot { total_spots, occupied_spots: rng.random_range(50..total_spots), sectors, generated_at }
    }
}

#[async_trait]
impl ParkingDataProvider for SyntheticParkingProvider {
    async fn snapshot(&self) -> Result<ParkingSnapshot, ApiError> {
        Ok(self.generate())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSourcePolicy {
    RemoteOnly,
    SyntheticOnly,
    /// Use the backend, and synthetic data only while it is unreachable or failing with 5xx.
    #[default]
    SyntheticWhenUnavailable,
}

impl std::str::FromStr for DataSourcePolicy {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "remote" | "remote-only" => Ok(DataSourcePolicy::RemoteOnly),
            "synthetic" | "synthetic-only" => Ok(DataSourcePolicy::SyntheticOnly),
            "fallback" | "synthetic-when-unavailable" => Ok(DataSourcePolicy::SyntheticWhenUnavailable),
            other => Err(crate::error::Error::InvalidConfig(format!("unknown data source policy '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Remote,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedSnapshot {
    pub origin: DataOrigin,
    pub snapshot: ParkingSnapshot,
}

/// Picks between the backend and the synthetic provider according to a policy.
#[derive(Debug, Clone)]
pub struct ParkingDataSource {
    remote: SharedParkingDataProvider,
    synthetic: SharedParkingDataProvider,
    policy: DataSourcePolicy,
}

impl ParkingDataSource {
    pub fn new(remote: SharedParkingDataProvider, synthetic: SharedParkingDataProvider, policy: DataSourcePolicy) -> Self {
        ParkingDataSource { remote, synthetic, policy }
    }

    pub fn policy(&self) -> DataSourcePolicy {
        self.policy
    }

    pub async fn fetch(&self) -> Result<TaggedSnapshot, ApiError> {
        match self.policy {
            DataSourcePolicy::SyntheticOnly => self.fetch_synthetic().await,
            DataSourcePolicy::RemoteOnly => self.fetch_remote().await,
            DataSourcePolicy::SyntheticWhenUnavailable => match self.fetch_remote().await {
                Err(e) if e.is_unavailable() => {
                    log::warn!("Parking data unavailable ({}). Serving synthetic occupancy.", e);
                    self.fetch_synthetic().await
                }
                other => other,
            },
        }
    }

    async fn fetch_remote(&self) -> Result<TaggedSnapshot, ApiError> {
        let snapshot = self.remote.snapshot().await?;
        Ok(TaggedSnapshot { origin: DataOrigin::Remote, snapshot })
    }

    async fn fetch_synthetic(&self) -> Result<TaggedSnapshot, ApiError> {
        let snapshot = self.synthetic.snapshot().await?;
        Ok(TaggedSnapshot { origin: DataOrigin::Synthetic, snapshot })
    }
}
