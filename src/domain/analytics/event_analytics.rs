use serde::Serialize;

use crate::domain::http::api_error::ApiError;
use crate::domain::providers::parking_data::{DataOrigin, ParkingDataSource, ParkingSnapshot};
use crate::domain::providers::vehicle_events::{RecentEvent, SharedVehicleEventsProvider};
use crate::domain::simulation::vehicle_event::EventType;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorOccupancyShare {
    pub name: String,
    /// Occupied over total spots, in percent. Zero for a sector without spots.
    pub occupancy_percent: f64,
}

/// Activity figures over the recent events feed plus occupancy per sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAnalytics {
    pub total_events: usize,
    pub entries: usize,
    pub exits: usize,
    pub parked: usize,
    /// Mean stay over the events that carry a duration; zero when none does.
    pub average_stay_minutes: f64,
    pub occupancy_by_sector: Vec<SectorOccupancyShare>,
}

impl EventAnalytics {
    pub fn summarize(events: &[RecentEvent], snapshot: &ParkingSnapshot) -> Self {
        let count = |kind: EventType| events.iter().filter(|e| e.event_type == kind).count();

        let stays: Vec<u32> = events.iter().filter_map(|e| e.duration_minutes).collect();
        let average_stay_minutes = if stays.is_empty() { 0.0 } else { stays.iter().map(|d| *d as f64).sum::<f64>() / stays.len() as f64 };

        let occupancy_by_sector = snapshot
            .sectors
            .iter()
            .map(|sector| SectorOccupancyShare {
                name: sector.name.clone(),
                occupancy_percent: if sector.total_spots == 0 { 0.0 } else { sector.occupied_spots as f64 / sector.total_spots as f64 * 100.0 },
            })
            .collect();

        EventAnalytics {
            total_events: events.len(),
            entries: count(EventType::Entry),
            exits: count(EventType::Exit),
            parked: count(EventType::Parked),
            average_stay_minutes,
            occupancy_by_sector,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    /// Where the sector occupancy came from.
    pub origin: DataOrigin,
    pub summary: EventAnalytics,
}

/// Joins the occupancy source and the events feed into one report.
#[derive(Debug, Clone)]
pub struct AnalyticsSource {
    parking: ParkingDataSource,
    events: SharedVehicleEventsProvider,
}

impl AnalyticsSource {
    pub fn new(parking: ParkingDataSource, events: SharedVehicleEventsProvider) -> Self {
        AnalyticsSource { parking, events }
    }

    pub async fn fetch(&self) -> Result<AnalyticsReport, ApiError> {
        let (tagged, events) = futures::try_join!(self.parking.fetch(), self.events.recent_events())?;

        log::debug!("Summarizing {} recent events against {} sectors.", events.len(), tagged.snapshot.sectors.len());
        Ok(AnalyticsReport { origin: tagged.origin, summary: EventAnalytics::summarize(&events, &tagged.snapshot) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use crate::domain::clock::clock::{FixedClock, SharedClock};
    use crate::domain::providers::parking_data::{DataSourcePolicy, ParkingDataProvider, SectorOccupancy, SyntheticParkingProvider};
    use crate::domain::providers::vehicle_events::{SyntheticEventsProvider, VehicleEventsProvider};
    use crate::domain::utils::id::{LicensePlate, SectorId};

    fn clock() -> SharedClock {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()))
    }

    fn event(id: u32, event_type: EventType, duration_minutes: Option<u32>) -> RecentEvent {
        RecentEvent {
            id,
            license_plate: LicensePlate::new(format!("ABC{:04}", id)),
            event_type,
            timestamp: clock().now(),
            sector: SectorId::new("A"),
            amount: 10.0,
            duration_minutes,
        }
    }

    fn snapshot(sectors: &[(&str, u32, u32)]) -> ParkingSnapshot {
        let sectors: Vec<SectorOccupancy> = sectors
            .iter()
            .map(|(name, total, occupied)| SectorOccupancy { name: name.to_string(), total_spots: *total, occupied_spots: *occupied, occupancy_percent: 0 })
            .collect();
        ParkingSnapshot { total_spots: 0, occupied_spots: 0, sectors, generated_at: clock().now() }
    }

    #[test]
    fn test_counts_and_average_stay() {
        let events = vec![
            event(1, EventType::Entry, Some(30)),
            event(2, EventType::Entry, Some(90)),
            event(3, EventType::Exit, Some(60)),
            event(4, EventType::Parked, None),
        ];

        let summary = EventAnalytics::summarize(&events, &snapshot(&[("A", 100, 25), ("B", 50, 50)]));

        assert_eq!(summary.total_events, 4);
        assert_eq!(summary.entries, 2);
        assert_eq!(summary.exits, 1);
        assert_eq!(summary.parked, 1);
        assert_eq!(summary.average_stay_minutes, 60.0);
        assert_eq!(summary.occupancy_by_sector[0], SectorOccupancyShare { name: "A".to_string(), occupancy_percent: 25.0 });
        assert_eq!(summary.occupancy_by_sector[1].occupancy_percent, 100.0);
    }

    #[test]
    fn test_empty_feed_and_empty_sector() {
        let summary = EventAnalytics::summarize(&[], &snapshot(&[("Z", 0, 0)]));

        assert_eq!(summary.total_events, 0);
        assert_eq!(summary.average_stay_minutes, 0.0);
        assert_eq!(summary.occupancy_by_sector[0].occupancy_percent, 0.0);
    }

    #[derive(Debug)]
    struct Unreachable;

    #[async_trait]
    impl ParkingDataProvider for Unreachable {
        async fn snapshot(&self) -> Result<ParkingSnapshot, ApiError> {
            Err(ApiError::ConnectionFailed { url: "http://localhost:3003/api/garage/sectors".into(), reason: "refused".into() })
        }
    }

    #[async_trait]
    impl VehicleEventsProvider for Unreachable {
        async fn recent_events(&self) -> Result<Vec<RecentEvent>, ApiError> {
            Err(ApiError::Timeout { url: "events".into() })
        }
    }

    fn parking(policy: DataSourcePolicy) -> ParkingDataSource {
        ParkingDataSource::new(Arc::new(Unreachable), Arc::new(SyntheticParkingProvider::seeded(5, clock())), policy)
    }

    #[tokio::test]
    async fn test_report_follows_parking_fallback() {
        let source = AnalyticsSource::new(parking(DataSourcePolicy::SyntheticWhenUnavailable), Arc::new(SyntheticEventsProvider::seeded(5, clock())));

        let report = source.fetch().await.unwrap();

        assert_eq!(report.origin, DataOrigin::Synthetic);
        assert_eq!(report.summary.total_events, 20);
        assert_eq!(report.summary.entries + report.summary.exits + report.summary.parked, 20);
        assert_eq!(report.summary.occupancy_by_sector.len(), 4);
        assert!((30.0..210.0).contains(&report.summary.average_stay_minutes));
    }

    #[tokio::test]
    async fn test_feed_failure_is_surfaced() {
        let source = AnalyticsSource::new(parking(DataSourcePolicy::SyntheticOnly), Arc::new(Unreachable));
        assert!(matches!(source.fetch().await, Err(ApiError::Timeout { .. })));
    }
}
