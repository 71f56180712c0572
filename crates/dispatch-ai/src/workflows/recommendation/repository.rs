use std::sync::Arc;

use async_trait::async_trait;

use super::domain::{ComplaintRecord, DriverId, DriverProfile, LiveTelemetry, OrderRecord};

/// Driver roster owned by the directory service.
#[async_trait]
pub trait DriverDirectory: Send + Sync {
    async fn active_drivers(&self) -> Result<Vec<DriverProfile>, RepositoryError>;
    async fn driver(&self, id: DriverId) -> Result<Option<DriverProfile>, RepositoryError>;
}

/// Order history store.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    async fn orders_for_driver(&self, id: DriverId) -> Result<Vec<OrderRecord>, RepositoryError>;
}

#[async_trait]
pub trait ComplaintRegistry: Send + Sync {
    async fn complaints_for_driver(
        &self,
        id: DriverId,
    ) -> Result<Vec<ComplaintRecord>, RepositoryError>;
}

/// Live location/load lookups; production adapters query the dispatch service.
#[async_trait]
pub trait LiveTelemetryProvider: Send + Sync {
    async fn telemetry(&self, id: DriverId) -> Result<LiveTelemetry, RepositoryError>;
}

/// Error enumeration for collaborator failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Bundle of injected collaborators handed to the ranker and insight service.
#[derive(Clone)]
pub struct FleetSources {
    pub directory: Arc<dyn DriverDirectory>,
    pub ledger: Arc<dyn OrderLedger>,
    pub complaints: Arc<dyn ComplaintRegistry>,
    pub telemetry: Arc<dyn LiveTelemetryProvider>,
}

impl FleetSources {
    pub fn new(
        directory: Arc<dyn DriverDirectory>,
        ledger: Arc<dyn OrderLedger>,
        complaints: Arc<dyn ComplaintRegistry>,
        telemetry: Arc<dyn LiveTelemetryProvider>,
    ) -> Self {
        Self {
            directory,
            ledger,
            complaints,
            telemetry,
        }
    }

    /// Convenience for stores that back all four collaborators at once.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: DriverDirectory + OrderLedger + ComplaintRegistry + LiveTelemetryProvider + 'static,
    {
        Self {
            directory: store.clone(),
            ledger: store.clone(),
            complaints: store.clone(),
            telemetry: store,
        }
    }
}
