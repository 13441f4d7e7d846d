use chrono::NaiveDate;

use crate::api::revenue_dto::{RevenueDto, RevenueRequestDto};
use crate::domain::clock::clock::SharedClock;
use crate::domain::http::api_client::ApiClient;
use crate::domain::http::api_error::ApiError;
use crate::domain::http::endpoint::ApiEndpoint;
use crate::domain::http::retry::RetryPolicy;

pub const DEFAULT_SECTOR: &str = "A";

/// Reads the daily revenue of one sector from `POST /revenue`.
#[derive(Debug, Clone)]
pub struct RevenueClient {
    client: ApiClient,
    clock: SharedClock,
    retry: RetryPolicy,
}

impl RevenueClient {
    pub fn new(client: ApiClient, clock: SharedClock) -> Self {
        RevenueClient { client, clock, retry: RetryPolicy::default() }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Builds the request body; missing date means today (UTC), missing sector means "A".
    pub fn request_for(&self, date: Option<NaiveDate>, sector: Option<&str>) -> RevenueRequestDto {
        RevenueRequestDto {
            date: date.unwrap_or_else(|| self.clock.now().date_naive()),
            sector: sector.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SECTOR).to_string(),
        }
    }

    pub async fn fetch(&self, date: Option<NaiveDate>, sector: Option<&str>) -> Result<RevenueDto, ApiError> {
        let request = self.request_for(date, sector);
        let label = format!("Revenue request for sector {} on {}", request.sector, request.date);

        self.retry.run(&label, || self.client.post_json::<_, RevenueDto>(ApiEndpoint::Revenue, &request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use crate::domain::clock::clock::FixedClock;

    fn client() -> RevenueClient {
        let api = ApiClient::new("http://localhost:3003/api", Duration::from_secs(1)).unwrap();
        RevenueClient::new(api, Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 6, 14, 23, 30, 0).unwrap())))
    }

    #[test]
    fn test_defaults_to_today_and_sector_a() {
        let request = client().request_for(None, None);

        assert_eq!(request.date, NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        assert_eq!(request.sector, "A");
    }

    #[test]
    fn test_explicit_values_win() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let request = client().request_for(Some(date), Some("C"));

        assert_eq!(request.date, date);
        assert_eq!(request.sector, "C");
    }
}
