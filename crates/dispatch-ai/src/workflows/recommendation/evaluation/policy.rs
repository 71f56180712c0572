use super::super::domain::{ConfidenceLevel, PerformanceMetrics};

const MINUTES_PER_KM: f64 = 10.0;
const MIN_DELIVERY_MINUTES: f64 = 15.0;

pub fn classify_confidence(metrics: &PerformanceMetrics) -> ConfidenceLevel {
    if metrics.total_orders_completed >= 20 && metrics.average_rating >= 4.0 {
        ConfidenceLevel::High
    } else if metrics.total_orders_completed >= 5 && metrics.average_rating >= 3.5 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

/// Estimated minutes from assignment to drop-off. Adjustments stack multiplicatively; the
/// result never drops below 15 minutes.
pub fn estimate_delivery_minutes(metrics: &PerformanceMetrics, distance_km: f64) -> u32 {
    let distance = if distance_km.is_finite() {
        distance_km.max(0.0)
    } else {
        0.0
    };
    let mut minutes = distance * MINUTES_PER_KM;

    if metrics.on_time_delivery_rate >= 90.0 {
        minutes *= 0.9;
    }
    if metrics.response_time <= 5.0 {
        minutes *= 0.95;
    }
    if metrics.current_workload >= 3 {
        minutes *= 1.2;
    }

    // `as` saturates for absurd distances.
    minutes.round().max(MIN_DELIVERY_MINUTES) as u32
}
