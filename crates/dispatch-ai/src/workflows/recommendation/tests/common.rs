use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::recommendation::domain::{
    ComplaintRecord, DriverId, DriverProfile, DriverStatus, LiveTelemetry, OrderRecord,
    OrderStatus, PerformanceMetrics, PriorityLevel, VehicleType,
};
use crate::workflows::recommendation::evaluation::{MetricsCalculator, ScoringEngine};
use crate::workflows::recommendation::ranker::RecommendationSettings;
use crate::workflows::recommendation::repository::{
    ComplaintRegistry, DriverDirectory, FleetSources, LiveTelemetryProvider, OrderLedger,
    RepositoryError,
};
use crate::workflows::recommendation::service::DriverRecommendationService;

pub(super) fn driver(id: u64) -> DriverProfile {
    DriverProfile {
        id: DriverId(id),
        full_name: format!("Driver {id}"),
        status: DriverStatus::Active,
        vehicle_type: VehicleType::Motor,
        rating: Some(4.0),
        priority_level: PriorityLevel::Normal,
        priority_score: 50,
    }
}

pub(super) fn priority_driver(id: u64) -> DriverProfile {
    DriverProfile {
        rating: Some(4.8),
        priority_level: PriorityLevel::Priority,
        priority_score: 85,
        ..driver(id)
    }
}

/// `completed` rated orders followed by `cancelled` ones, ids offset by the driver id.
pub(super) fn history(
    driver_id: u64,
    completed: u32,
    cancelled: u32,
    rating: Option<u8>,
) -> Vec<OrderRecord> {
    let base = driver_id * 1_000;
    let completed_orders = (0..completed).map(|n| OrderRecord {
        id: base + u64::from(n),
        driver_id: Some(DriverId(driver_id)),
        status: OrderStatus::Completed,
        distance_km: 4.0,
        fare: 20_000.0,
        rating,
    });
    let cancelled_orders = (0..cancelled).map(|n| OrderRecord {
        id: base + 500 + u64::from(n),
        driver_id: Some(DriverId(driver_id)),
        status: OrderStatus::Cancelled,
        distance_km: 4.0,
        fare: 0.0,
        rating: None,
    });
    completed_orders.chain(cancelled_orders).collect()
}

pub(super) fn complaint(id: u64, driver_id: u64) -> ComplaintRecord {
    ComplaintRecord {
        id,
        order_id: driver_id * 1_000,
        driver_id: Some(DriverId(driver_id)),
    }
}

pub(super) fn near(distance_from_pickup_km: f64, current_workload: u32) -> LiveTelemetry {
    LiveTelemetry {
        distance_from_pickup_km,
        current_workload,
    }
}

pub(super) fn scenario_a_metrics() -> PerformanceMetrics {
    PerformanceMetrics {
        driver_id: DriverId(1),
        completion_rate: 95.0,
        average_rating: 4.8,
        response_time: 8.0,
        on_time_delivery_rate: 90.0,
        total_orders: 100,
        total_orders_completed: 95,
        cancellation_rate: 2.0,
        customer_complaint_rate: 0.0,
        revenue_generated: 1_900_000.0,
        distance_from_pickup: 1.5,
        current_workload: 0,
        priority_score: 85,
    }
}

pub(super) fn empty_metrics(driver_id: u64) -> PerformanceMetrics {
    PerformanceMetrics {
        driver_id: DriverId(driver_id),
        completion_rate: 0.0,
        average_rating: 0.0,
        response_time: 13.0,
        on_time_delivery_rate: 0.0,
        total_orders: 0,
        total_orders_completed: 0,
        cancellation_rate: 0.0,
        customer_complaint_rate: 0.0,
        revenue_generated: 0.0,
        distance_from_pickup: 0.0,
        current_workload: 0,
        priority_score: 50,
    }
}

pub(super) fn settings() -> RecommendationSettings {
    RecommendationSettings {
        max_concurrency: 4,
        driver_timeout: Duration::from_millis(200),
        request_deadline: Duration::from_secs(5),
    }
}

pub(super) fn build_service(fleet: &MemoryFleet) -> DriverRecommendationService {
    build_service_with(fleet, settings())
}

pub(super) fn build_service_with(
    fleet: &MemoryFleet,
    settings: RecommendationSettings,
) -> DriverRecommendationService {
    DriverRecommendationService::new(
        FleetSources::from_store(Arc::new(fleet.clone())),
        MetricsCalculator::deterministic(),
        ScoringEngine::default(),
        settings,
    )
}

/// Shared in-memory fleet with failure knobs for the ledger and directory.
#[derive(Default, Clone)]
pub(super) struct MemoryFleet {
    drivers: Arc<Mutex<BTreeMap<DriverId, DriverProfile>>>,
    orders: Arc<Mutex<HashMap<DriverId, Vec<OrderRecord>>>>,
    complaints: Arc<Mutex<HashMap<DriverId, Vec<ComplaintRecord>>>>,
    telemetry: Arc<Mutex<HashMap<DriverId, LiveTelemetry>>>,
    broken_ledgers: Arc<Mutex<HashSet<DriverId>>>,
    slow_ledgers: Arc<Mutex<HashMap<DriverId, Duration>>>,
    panicking_ledgers: Arc<Mutex<HashSet<DriverId>>>,
    directory_offline: Arc<AtomicBool>,
}

impl MemoryFleet {
    pub(super) fn add_driver(
        &self,
        driver: DriverProfile,
        orders: Vec<OrderRecord>,
        telemetry: LiveTelemetry,
    ) {
        let id = driver.id;
        self.drivers
            .lock()
            .expect("driver mutex poisoned")
            .insert(id, driver);
        self.orders
            .lock()
            .expect("order mutex poisoned")
            .insert(id, orders);
        self.telemetry
            .lock()
            .expect("telemetry mutex poisoned")
            .insert(id, telemetry);
    }

    pub(super) fn add_complaint(&self, complaint: ComplaintRecord) {
        if let Some(driver_id) = complaint.driver_id {
            self.complaints
                .lock()
                .expect("complaint mutex poisoned")
                .entry(driver_id)
                .or_default()
                .push(complaint);
        }
    }

    pub(super) fn forget_telemetry(&self, id: u64) {
        self.telemetry
            .lock()
            .expect("telemetry mutex poisoned")
            .remove(&DriverId(id));
    }

    pub(super) fn break_ledger(&self, id: u64) {
        self.broken_ledgers
            .lock()
            .expect("ledger mutex poisoned")
            .insert(DriverId(id));
    }

    pub(super) fn slow_ledger(&self, id: u64, delay: Duration) {
        self.slow_ledgers
            .lock()
            .expect("ledger mutex poisoned")
            .insert(DriverId(id), delay);
    }

    /// Ledger reads for `id` panic instead of returning.
    pub(super) fn crash_ledger(&self, id: u64) {
        self.panicking_ledgers
            .lock()
            .expect("ledger mutex poisoned")
            .insert(DriverId(id));
    }

    pub(super) fn take_directory_offline(&self) {
        self.directory_offline.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DriverDirectory for MemoryFleet {
    async fn active_drivers(&self) -> Result<Vec<DriverProfile>, RepositoryError> {
        if self.directory_offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("directory offline".to_string()));
        }
        let guard = self.drivers.lock().expect("driver mutex poisoned");
        Ok(guard
            .values()
            .filter(|driver| driver.is_active())
            .cloned()
            .collect())
    }

    async fn driver(&self, id: DriverId) -> Result<Option<DriverProfile>, RepositoryError> {
        if self.directory_offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("directory offline".to_string()));
        }
        let guard = self.drivers.lock().expect("driver mutex poisoned");
        Ok(guard.get(&id).cloned())
    }
}

#[async_trait]
impl OrderLedger for MemoryFleet {
    async fn orders_for_driver(&self, id: DriverId) -> Result<Vec<OrderRecord>, RepositoryError> {
        let delay = self
            .slow_ledgers
            .lock()
            .expect("ledger mutex poisoned")
            .get(&id)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let crashes = self
            .panicking_ledgers
            .lock()
            .expect("ledger mutex poisoned")
            .contains(&id);
        if crashes {
            panic!("ledger shard for driver {id} crashed");
        }

        let broken = self
            .broken_ledgers
            .lock()
            .expect("ledger mutex poisoned")
            .contains(&id);
        if broken {
            return Err(RepositoryError::Unavailable("ledger shard offline".to_string()));
        }

        let orders = self
            .orders
            .lock()
            .expect("order mutex poisoned")
            .get(&id)
            .cloned()
            .unwrap_or_default();
        Ok(orders)
    }
}

#[async_trait]
impl ComplaintRegistry for MemoryFleet {
    async fn complaints_for_driver(
        &self,
        id: DriverId,
    ) -> Result<Vec<ComplaintRecord>, RepositoryError> {
        let complaints = self
            .complaints
            .lock()
            .expect("complaint mutex poisoned")
            .get(&id)
            .cloned()
            .unwrap_or_default();
        Ok(complaints)
    }
}

#[async_trait]
impl LiveTelemetryProvider for MemoryFleet {
    async fn telemetry(&self, id: DriverId) -> Result<LiveTelemetry, RepositoryError> {
        let reading = self
            .telemetry
            .lock()
            .expect("telemetry mutex poisoned")
            .get(&id)
            .copied();
        reading.ok_or(RepositoryError::NotFound)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
