use std::fmt;
use std::sync::Arc;

use rand::Rng;

use super::super::domain::{
    ComplaintRecord, DriverProfile, LiveTelemetry, OrderRecord, OrderStatus, PerformanceMetrics,
    PriorityLevel,
};

const BASE_RESPONSE_MINUTES: f64 = 15.0;
const MIN_RESPONSE_MINUTES: f64 = 5.0;
const UNRATED_RESPONSE_OFFSET: f64 = 5.0;
const PRIORITY_RESPONSE_BONUS: f64 = 5.0;

const ON_TIME_BASELINE: f64 = 70.0;
const ON_TIME_EXPERIENCE_CAP: f64 = 20.0;
const ON_TIME_CEILING: f64 = 95.0;
/// Upper bound (exclusive) of the jitter added to the on-time baseline.
pub const ON_TIME_JITTER_SPAN: f64 = 10.0;

/// Source of the bounded noise added to the on-time delivery heuristic.
pub trait OnTimeJitter: Send + Sync + fmt::Debug {
    fn sample(&self) -> f64;
}

/// Deterministic source; always zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoJitter;

impl OnTimeJitter for NoJitter {
    fn sample(&self) -> f64 {
        0.0
    }
}

/// Uniform noise in `[0, ON_TIME_JITTER_SPAN)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformJitter;

impl OnTimeJitter for UniformJitter {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..ON_TIME_JITTER_SPAN)
    }
}

/// Derives a [`PerformanceMetrics`] snapshot from one driver's history.
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    jitter: Arc<dyn OnTimeJitter>,
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::deterministic()
    }
}

impl MetricsCalculator {
    pub fn deterministic() -> Self {
        Self {
            jitter: Arc::new(NoJitter),
        }
    }

    pub fn with_jitter(jitter: Arc<dyn OnTimeJitter>) -> Self {
        Self { jitter }
    }

    /// Records attributed to other drivers are ignored, so callers may pass unfiltered slices.
    pub fn calculate(
        &self,
        driver: &DriverProfile,
        orders: &[OrderRecord],
        complaints: &[ComplaintRecord],
        telemetry: LiveTelemetry,
    ) -> PerformanceMetrics {
        let own_orders: Vec<&OrderRecord> = orders
            .iter()
            .filter(|order| order.driver_id == Some(driver.id))
            .collect();
        let total = own_orders.len() as u32;

        let completed: Vec<&OrderRecord> = own_orders
            .iter()
            .copied()
            .filter(|order| order.status == OrderStatus::Completed)
            .collect();
        let completed_count = completed.len() as u32;

        let cancelled_count = own_orders
            .iter()
            .filter(|order| order.status == OrderStatus::Cancelled)
            .count() as u32;

        let complaint_count = complaints
            .iter()
            .filter(|complaint| complaint.driver_id == Some(driver.id))
            .count() as u32;

        let ratings: Vec<f64> = completed
            .iter()
            .filter_map(|order| order.rating)
            .filter(|rating| *rating > 0)
            .map(f64::from)
            .collect();
        let average_rating = if ratings.is_empty() {
            0.0
        } else {
            (ratings.iter().sum::<f64>() / ratings.len() as f64).clamp(0.0, 5.0)
        };

        let revenue_generated = completed
            .iter()
            .map(|order| order.fare)
            .filter(|fare| fare.is_finite())
            .sum::<f64>();

        PerformanceMetrics {
            driver_id: driver.id,
            completion_rate: percentage(completed_count, total),
            average_rating,
            response_time: response_time(driver),
            on_time_delivery_rate: self.on_time_rate(completed_count),
            total_orders: total,
            total_orders_completed: completed_count,
            cancellation_rate: percentage(cancelled_count, total),
            customer_complaint_rate: percentage(complaint_count, total),
            revenue_generated,
            distance_from_pickup: telemetry.distance_from_pickup_km,
            current_workload: telemetry.current_workload,
            priority_score: driver.priority_score.min(100),
        }
    }

    fn on_time_rate(&self, completed_count: u32) -> f64 {
        if completed_count == 0 {
            return 0.0;
        }

        let experience = (completed_count as f64 * 2.0).min(ON_TIME_EXPERIENCE_CAP);
        let jitter = self.jitter.sample();
        let jitter = if jitter.is_finite() {
            jitter.clamp(0.0, ON_TIME_JITTER_SPAN)
        } else {
            0.0
        };

        (ON_TIME_BASELINE + experience + jitter).min(ON_TIME_CEILING)
    }
}

/// Ratio in percent, 0 for an empty denominator and capped at 100.
fn percentage(part: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 100.0).min(100.0)
}

fn response_time(driver: &DriverProfile) -> f64 {
    let rating_offset = driver
        .rating
        .filter(|rating| rating.is_finite())
        .map(|rating| (5.0 - rating.clamp(0.0, 5.0)) * 2.0)
        .unwrap_or(UNRATED_RESPONSE_OFFSET);
    let priority_bonus = match driver.priority_level {
        PriorityLevel::Priority => PRIORITY_RESPONSE_BONUS,
        PriorityLevel::Normal => 0.0,
    };

    (BASE_RESPONSE_MINUTES - rating_offset - priority_bonus).max(MIN_RESPONSE_MINUTES)
}
