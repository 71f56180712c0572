use super::super::domain::{DriverProfile, PerformanceMetrics, PriorityLevel, VehicleType};

pub const MAX_REASONS: usize = 3;
pub const FALLBACK_REASON: &str = "active and available";

/// Justification rules in evaluation order. When more than [`MAX_REASONS`] match, the
/// earliest ones win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonRule {
    HighCompletion,
    ExcellentRating,
    FastResponse,
    ReliablyOnTime,
    NearPickup,
    LowWorkload,
    PriorityDriver,
    ExperiencedMotorCourier,
}

impl ReasonRule {
    pub const ORDERED: [ReasonRule; 8] = [
        ReasonRule::HighCompletion,
        ReasonRule::ExcellentRating,
        ReasonRule::FastResponse,
        ReasonRule::ReliablyOnTime,
        ReasonRule::NearPickup,
        ReasonRule::LowWorkload,
        ReasonRule::PriorityDriver,
        ReasonRule::ExperiencedMotorCourier,
    ];

    pub fn applies(self, metrics: &PerformanceMetrics, driver: &DriverProfile) -> bool {
        match self {
            ReasonRule::HighCompletion => metrics.completion_rate >= 90.0,
            ReasonRule::ExcellentRating => metrics.average_rating >= 4.5,
            ReasonRule::FastResponse => metrics.response_time <= 10.0,
            ReasonRule::ReliablyOnTime => metrics.on_time_delivery_rate >= 85.0,
            ReasonRule::NearPickup => metrics.distance_from_pickup <= 2.0,
            ReasonRule::LowWorkload => metrics.current_workload <= 1,
            ReasonRule::PriorityDriver => driver.priority_level == PriorityLevel::Priority,
            ReasonRule::ExperiencedMotorCourier => {
                driver.vehicle_type == VehicleType::Motor && metrics.total_orders_completed >= 50
            }
        }
    }

    pub fn describe(self, metrics: &PerformanceMetrics) -> String {
        match self {
            ReasonRule::HighCompletion => {
                format!("very high completion rate ({:.1}%)", metrics.completion_rate)
            }
            ReasonRule::ExcellentRating => format!(
                "excellent customer rating ({:.1}/5.0)",
                metrics.average_rating
            ),
            ReasonRule::FastResponse => {
                format!("very fast response ({:.0} min)", metrics.response_time)
            }
            ReasonRule::ReliablyOnTime => {
                format!("reliably on-time ({:.1}%)", metrics.on_time_delivery_rate)
            }
            ReasonRule::NearPickup => format!(
                "very close to pickup ({:.1} km)",
                metrics.distance_from_pickup
            ),
            ReasonRule::LowWorkload => "low current workload, can focus on this order".to_string(),
            ReasonRule::PriorityDriver => "proven priority driver".to_string(),
            ReasonRule::ExperiencedMotorCourier => {
                "experienced motor courier for fast delivery".to_string()
            }
        }
    }
}

/// Between one and [`MAX_REASONS`] human-readable reasons for recommending `driver`.
pub fn generate_reasons(metrics: &PerformanceMetrics, driver: &DriverProfile) -> Vec<String> {
    let mut reasons: Vec<String> = ReasonRule::ORDERED
        .iter()
        .filter(|rule| rule.applies(metrics, driver))
        .take(MAX_REASONS)
        .map(|rule| rule.describe(metrics))
        .collect();

    if reasons.is_empty() {
        reasons.push(FALLBACK_REASON.to_string());
    }

    reasons
}
