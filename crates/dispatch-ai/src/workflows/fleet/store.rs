use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use crate::workflows::recommendation::{
    ComplaintRecord, ComplaintRegistry, DriverDirectory, DriverId, DriverProfile, LiveTelemetry,
    LiveTelemetryProvider, OrderLedger, OrderRecord, RepositoryError,
};

/// In-memory fleet snapshot backing all four recommendation collaborators.
#[derive(Debug, Default, Clone)]
pub struct FleetStore {
    drivers: BTreeMap<DriverId, DriverProfile>,
    orders: HashMap<DriverId, Vec<OrderRecord>>,
    complaints: HashMap<DriverId, Vec<ComplaintRecord>>,
    telemetry: HashMap<DriverId, LiveTelemetry>,
    unassigned_orders: usize,
}

impl FleetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous profile when `driver.id` was already present.
    pub fn insert_driver(&mut self, driver: DriverProfile) -> Option<DriverProfile> {
        self.drivers.insert(driver.id, driver)
    }

    pub fn insert_order(&mut self, order: OrderRecord) {
        match order.driver_id {
            Some(driver_id) => self.orders.entry(driver_id).or_default().push(order),
            None => self.unassigned_orders += 1,
        }
    }

    /// Complaints without a driver cannot affect any score and are not kept.
    pub fn insert_complaint(&mut self, complaint: ComplaintRecord) {
        if let Some(driver_id) = complaint.driver_id {
            self.complaints.entry(driver_id).or_default().push(complaint);
        }
    }

    pub fn set_telemetry(
        &mut self,
        driver_id: DriverId,
        reading: LiveTelemetry,
    ) -> Option<LiveTelemetry> {
        self.telemetry.insert(driver_id, reading)
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn active_driver_count(&self) -> usize {
        self.drivers.values().filter(|driver| driver.is_active()).count()
    }

    pub fn order_count(&self) -> usize {
        self.orders.values().map(Vec::len).sum::<usize>() + self.unassigned_orders
    }

    pub fn complaint_count(&self) -> usize {
        self.complaints.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl DriverDirectory for FleetStore {
    async fn active_drivers(&self) -> Result<Vec<DriverProfile>, RepositoryError> {
        Ok(self
            .drivers
            .values()
            .filter(|driver| driver.is_active())
            .cloned()
            .collect())
    }

    async fn driver(&self, id: DriverId) -> Result<Option<DriverProfile>, RepositoryError> {
        Ok(self.drivers.get(&id).cloned())
    }
}

#[async_trait]
impl OrderLedger for FleetStore {
    async fn orders_for_driver(&self, id: DriverId) -> Result<Vec<OrderRecord>, RepositoryError> {
        Ok(self.orders.get(&id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ComplaintRegistry for FleetStore {
    async fn complaints_for_driver(
        &self,
        id: DriverId,
    ) -> Result<Vec<ComplaintRecord>, RepositoryError> {
        Ok(self.complaints.get(&id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl LiveTelemetryProvider for FleetStore {
    async fn telemetry(&self, id: DriverId) -> Result<LiveTelemetry, RepositoryError> {
        self.telemetry.get(&id).copied().ok_or_else(|| {
            RepositoryError::Unavailable(format!("no telemetry reading for driver {id}"))
        })
    }
}
