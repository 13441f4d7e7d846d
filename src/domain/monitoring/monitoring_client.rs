use serde::Serialize;

use crate::api::monitoring_dto::{HealthDto, MonitoringDashboardDto};
use crate::domain::http::api_client::ApiClient;
use crate::domain::http::api_error::ApiError;
use crate::domain::http::endpoint::ApiEndpoint;

/// Everything the monitoring view shows, fetched in one go.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringData {
    pub dashboard: MonitoringDashboardDto,
    pub health: HealthDto,
    pub detailed_health: HealthDto,
}

impl MonitoringData {
    pub fn is_healthy(&self) -> bool {
        is_up(&self.health.status) && is_up(&self.detailed_health.status)
    }

    /// `"occupied/total (rate)"`, or `None` when the dashboard has no parking section.
    pub fn occupancy_line(&self) -> Option<String> {
        self.dashboard
            .parking_status
            .as_ref()
            .map(|p| format!("{}/{} spots occupied ({}), {} available", p.occupied_spots, p.total_spots, p.occupancy_rate, p.available_spots))
    }
}

fn is_up(status: &str) -> bool {
    status.eq_ignore_ascii_case("UP")
}

#[derive(Debug, Clone)]
pub struct MonitoringClient {
    client: ApiClient,
}

impl MonitoringClient {
    pub fn new(client: ApiClient) -> Self {
        MonitoringClient { client }
    }

    /// Queries the dashboard and both health endpoints concurrently; the first failure wins.
    pub async fn fetch(&self) -> Result<MonitoringData, ApiError> {
        let (dashboard, health, detailed_health) = futures::try_join!(
            self.client.get_json::<MonitoringDashboardDto>(ApiEndpoint::MonitoringDashboard),
            self.client.get_json::<HealthDto>(ApiEndpoint::ActuatorHealth),
            self.client.get_json::<HealthDto>(ApiEndpoint::MonitoringHealth),
        )?;

        Ok(MonitoringData { dashboard, health, detailed_health })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(json_dashboard: &str, health: &str, detailed: &str) -> MonitoringData {
        MonitoringData {
            dashboard: serde_json::from_str(json_dashboard).unwrap(),
            health: serde_json::from_str(&format!(r#"{{"status": "{}"}}"#, health)).unwrap(),
            detailed_health: serde_json::from_str(&format!(r#"{{"status": "{}", "database": "UP"}}"#, detailed)).unwrap(),
        }
    }

    #[test]
    fn test_health_requires_both_endpoints_up() {
        assert!(data("{}", "UP", "up").is_healthy());
        assert!(!data("{}", "UP", "DOWN").is_healthy());
    }

    #[test]
    fn test_occupancy_line() {
        let with_parking = data(
            r#"{"parkingStatus": {"totalSpots": 400, "occupiedSpots": 100, "availableSpots": 300, "occupancyRate": "25.00%"}}"#,
            "UP",
            "UP",
        );

        assert_eq!(with_parking.occupancy_line().unwrap(), "100/400 spots occupied (25.00%), 300 available");
        assert_eq!(data("{}", "UP", "UP").occupancy_line(), None);
    }
}
