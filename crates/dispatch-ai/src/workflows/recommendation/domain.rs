use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for drivers registered in the directory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DriverId(pub u64);

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Active,
    Suspended,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Motor,
    Car,
    Pickup,
    Truck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Priority,
    Normal,
}

/// Directory entry for a driver. `rating` is the profile rating (0-5) kept by the directory,
/// not the per-order average derived from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverProfile {
    pub id: DriverId,
    pub full_name: String,
    pub status: DriverStatus,
    pub vehicle_type: VehicleType,
    pub rating: Option<f64>,
    pub priority_level: PriorityLevel,
    pub priority_score: u8,
}

impl DriverProfile {
    pub fn is_active(&self) -> bool {
        self.status == DriverStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Assigned,
    Pickup,
    Delivery,
    Completed,
    Cancelled,
}

/// Historical order entry from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: u64,
    pub driver_id: Option<DriverId>,
    pub status: OrderStatus,
    pub distance_km: f64,
    pub fare: f64,
    pub rating: Option<u8>,
}

/// Customer complaint attributed (possibly) to a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub id: u64,
    pub order_id: u64,
    pub driver_id: Option<DriverId>,
}

/// Live position and load reported by the dispatch/location service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveTelemetry {
    pub distance_from_pickup_km: f64,
    pub current_workload: u32,
}

impl LiveTelemetry {
    /// Order-independent reading used when comparing drivers outside a specific order.
    pub const NEUTRAL: LiveTelemetry = LiveTelemetry {
        distance_from_pickup_km: 0.0,
        current_workload: 0,
    };
}

/// Minimal description of the order being dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub distance_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
}

impl DeliveryRequest {
    pub fn with_distance(distance_km: f64) -> Self {
        Self {
            distance_km,
            pickup_address: None,
            delivery_address: None,
        }
    }
}

/// Bounded performance snapshot for one driver, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub driver_id: DriverId,
    pub completion_rate: f64,
    pub average_rating: f64,
    pub response_time: f64,
    pub on_time_delivery_rate: f64,
    pub total_orders: u32,
    pub total_orders_completed: u32,
    pub cancellation_rate: f64,
    pub customer_complaint_rate: f64,
    pub revenue_generated: f64,
    pub distance_from_pickup: f64,
    pub current_workload: u32,
    pub priority_score: u8,
}

/// Trust label attached to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }
}

/// One ranked candidate for an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub driver: DriverProfile,
    pub recommendation_score: f64,
    pub metrics: PerformanceMetrics,
    pub reasons: Vec<String>,
    pub estimated_delivery_time: u32,
    pub confidence_level: ConfidenceLevel,
}
