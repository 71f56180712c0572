use dispatch_ai::config::RecommendationConfig;
use dispatch_ai::error::AppError;
use dispatch_ai::workflows::fleet::{FleetImporter, FleetStore};
use dispatch_ai::workflows::recommendation::{DriverRecommendationService, FleetSources};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the fleet export, or start from an empty roster when none is configured.
pub(crate) fn load_fleet(dir: Option<&Path>) -> Result<FleetStore, AppError> {
    match dir {
        Some(dir) => Ok(FleetImporter::from_dir(dir)?),
        None => {
            warn!("DISPATCH_FLEET_DIR not set; serving an empty fleet");
            Ok(FleetStore::new())
        }
    }
}

pub(crate) fn build_service(
    store: FleetStore,
    config: &RecommendationConfig,
) -> DriverRecommendationService {
    DriverRecommendationService::from_config(FleetSources::from_store(Arc::new(store)), config)
}
