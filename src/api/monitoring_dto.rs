use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /monitoring/dashboard`. Fields the backend adds later end up in `extra`.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringDashboardDto {
    #[serde(default)]
    pub system_status: Option<SystemStatusDto>,
    #[serde(default)]
    pub parking_status: Option<ParkingStatusDto>,
    #[serde(default)]
    pub today_activity: Option<TodayActivityDto>,
    #[serde(default)]
    pub performance: Option<PerformanceDto>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatusDto {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub uptime: Option<Value>,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParkingStatusDto {
    pub total_spots: u32,
    pub occupied_spots: u32,
    pub available_spots: u32,
    /// Preformatted by the backend, e.g. `"42.50%"`.
    pub occupancy_rate: String,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodayActivityDto {
    pub entries: u64,
    pub exits: u64,
    pub revenue: f64,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDto {
    #[serde(default)]
    pub avg_response_time: Option<Value>,
    #[serde(default)]
    pub error_rate: Option<Value>,
    #[serde(default)]
    pub throughput: Option<Value>,
}

/// `GET /actuator/health` and `GET /monitoring/health`.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}
