use async_trait::async_trait;

use crate::api::webhook_dto::WebhookEventDto;
use crate::domain::http::api_client::ApiClient;
use crate::domain::http::endpoint::ApiEndpoint;
use crate::domain::simulation::vehicle_event::VehicleEvent;
use crate::domain::submission::event_submitter::{EventSubmitter, SubmissionReceipt};
use crate::error::Result;

/// Posts events to the garage backend's webhook.
#[derive(Debug, Clone)]
pub struct WebhookSubmitter {
    client: ApiClient,
}

impl WebhookSubmitter {
    pub fn new(client: ApiClient) -> Self {
        WebhookSubmitter { client }
    }
}

#[async_trait]
impl EventSubmitter for WebhookSubmitter {
    async fn submit(&self, event: &VehicleEvent) -> Result<SubmissionReceipt> {
        let body = WebhookEventDto::from(event);
        let (status, message) = self.client.post_json_for_text(ApiEndpoint::Webhook, &body).await?;

        Ok(SubmissionReceipt { status, message })
    }
}

/// Accepts every event without any network traffic. Selected explicitly with `--dry-run`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunSubmitter;

#[async_trait]
impl EventSubmitter for DryRunSubmitter {
    async fn submit(&self, event: &VehicleEvent) -> Result<SubmissionReceipt> {
        let body = WebhookEventDto::from(event);
        log::info!("[dry-run] {}", serde_json::to_string(&body)?);

        Ok(SubmissionReceipt { status: 200, message: "Event processed successfully".to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::utils::id::{LicensePlate, SectorId};

    #[tokio::test]
    async fn test_dry_run_accepts_everything() {
        let event = VehicleEvent::parked(LicensePlate::new("SIM0009"), SectorId::new("B"), -23.56, -46.65);

        let receipt = DryRunSubmitter.submit(&event).await.unwrap();

        assert_eq!(receipt.status, 200);
    }
}
