use super::common::*;

use crate::workflows::recommendation::domain::{ConfidenceLevel, PriorityLevel, VehicleType};
use crate::workflows::recommendation::evaluation::{
    classify_confidence, estimate_delivery_minutes, generate_reasons, ScoreFactor,
    ScoringEngine, FALLBACK_REASON, MAX_REASONS,
};

#[test]
fn scenario_a_clamps_to_the_ceiling() {
    let engine = ScoringEngine::default();
    let metrics = scenario_a_metrics();

    let breakdown = engine.breakdown(&metrics);

    assert_eq!(engine.score(&metrics), 100.0);
    assert_eq!(breakdown.total, 100.0);
    assert!((breakdown.raw_total - 102.75).abs() < 0.5, "{}", breakdown.raw_total);
    assert_eq!(breakdown.weights_version, "v1");
    assert_eq!(breakdown.components.len(), 8);
    assert_eq!(
        breakdown.components.last().map(|component| component.factor),
        Some(ScoreFactor::PriorityBonus)
    );
}

#[test]
fn priority_bonus_requires_score_above_threshold() {
    let engine = ScoringEngine::default();
    let mut metrics = scenario_a_metrics();
    metrics.priority_score = 80;

    let breakdown = engine.breakdown(&metrics);

    assert_eq!(breakdown.components.len(), 7);
    assert!((breakdown.raw_total - 92.75).abs() < 1e-6);
    assert!((engine.score(&metrics) - 92.75).abs() < 1e-6);
}

#[test]
fn score_stays_within_bounds_at_extremes() {
    let engine = ScoringEngine::default();

    let mut worst = empty_metrics(1);
    worst.response_time = 240.0;
    worst.cancellation_rate = 100.0;
    worst.distance_from_pickup = 50.0;
    worst.current_workload = 12;
    assert_eq!(engine.score(&worst), 0.0);

    let mut best = scenario_a_metrics();
    best.completion_rate = 100.0;
    best.average_rating = 5.0;
    best.response_time = 5.0;
    best.on_time_delivery_rate = 95.0;
    best.cancellation_rate = 0.0;
    best.distance_from_pickup = 0.0;
    best.priority_score = 100;
    assert_eq!(engine.score(&best), 100.0);

    let mut broken = empty_metrics(1);
    broken.completion_rate = f64::NAN;
    assert_eq!(engine.score(&broken), 0.0);
}

#[test]
fn reasons_follow_rule_order_and_cap() {
    let driver = priority_driver(1);
    let reasons = generate_reasons(&scenario_a_metrics(), &driver);

    assert_eq!(reasons.len(), MAX_REASONS);
    assert_eq!(reasons[0], "very high completion rate (95.0%)");
    assert_eq!(reasons[1], "excellent customer rating (4.8/5.0)");
    assert_eq!(reasons[2], "very fast response (8 min)");
}

#[test]
fn experienced_motor_courier_needs_fifty_completions() {
    let mut metrics = empty_metrics(5);
    metrics.response_time = 13.0;
    metrics.distance_from_pickup = 4.0;
    metrics.current_workload = 2;
    metrics.total_orders_completed = 50;

    let courier = driver(5);
    assert_eq!(
        generate_reasons(&metrics, &courier),
        vec!["experienced motor courier for fast delivery".to_string()]
    );

    let mut car = driver(5);
    car.vehicle_type = VehicleType::Car;
    assert_eq!(
        generate_reasons(&metrics, &car),
        vec![FALLBACK_REASON.to_string()]
    );
}

#[test]
fn scenario_d_falls_back_to_single_reason() {
    let mut metrics = empty_metrics(4);
    metrics.distance_from_pickup = 5.0;
    metrics.current_workload = 3;

    let reasons = generate_reasons(&metrics, &driver(4));

    assert_eq!(reasons, vec![FALLBACK_REASON.to_string()]);
    assert_eq!(classify_confidence(&metrics), ConfidenceLevel::Low);
}

#[test]
fn confidence_tiers_follow_sample_size_and_rating() {
    let mut metrics = empty_metrics(1);

    metrics.total_orders_completed = 20;
    metrics.average_rating = 4.0;
    assert_eq!(classify_confidence(&metrics), ConfidenceLevel::High);

    metrics.average_rating = 3.9;
    assert_eq!(classify_confidence(&metrics), ConfidenceLevel::Medium);

    metrics.total_orders_completed = 5;
    metrics.average_rating = 3.5;
    assert_eq!(classify_confidence(&metrics), ConfidenceLevel::Medium);

    metrics.average_rating = 3.4;
    assert_eq!(classify_confidence(&metrics), ConfidenceLevel::Low);

    metrics.total_orders_completed = 4;
    metrics.average_rating = 5.0;
    assert_eq!(classify_confidence(&metrics), ConfidenceLevel::Low);
}

#[test]
fn delivery_estimate_composes_multipliers_and_floor() {
    let mut metrics = empty_metrics(1);
    assert_eq!(estimate_delivery_minutes(&metrics, 0.0), 15);
    assert_eq!(estimate_delivery_minutes(&metrics, 1.2), 15);
    assert_eq!(estimate_delivery_minutes(&metrics, 4.0), 40);

    metrics.on_time_delivery_rate = 92.0;
    assert_eq!(estimate_delivery_minutes(&metrics, 4.0), 36);

    metrics.response_time = 5.0;
    assert_eq!(estimate_delivery_minutes(&metrics, 4.0), 34);

    metrics.current_workload = 3;
    assert_eq!(estimate_delivery_minutes(&metrics, 4.0), 41);

    assert_eq!(estimate_delivery_minutes(&metrics, f64::NAN), 15);
}

#[test]
fn priority_level_shortens_response_time() {
    let calculator =
        crate::workflows::recommendation::evaluation::MetricsCalculator::deterministic();
    let mut profile = driver(8);
    let normal = calculator.calculate(&profile, &[], &[], near(0.0, 0));

    profile.priority_level = PriorityLevel::Priority;
    let priority = calculator.calculate(&profile, &[], &[], near(0.0, 0));

    assert_eq!(normal.response_time - priority.response_time, 5.0);
}
