use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::simulation::vehicle_event::VehicleEvent;
use crate::error::Result;

/// What the backend answered for one accepted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub status: u16,
    pub message: String,
}

/// Delivers a single vehicle event somewhere. Implementations own transport, timeouts and encoding.
#[async_trait]
pub trait EventSubmitter: Debug + Send + Sync {
    async fn submit(&self, event: &VehicleEvent) -> Result<SubmissionReceipt>;
}

pub type SharedEventSubmitter = Arc<dyn EventSubmitter>;
