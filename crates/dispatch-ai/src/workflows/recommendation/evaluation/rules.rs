use super::super::domain::PerformanceMetrics;
use super::weights::ScoringWeights;
use super::{ScoreComponent, ScoreFactor};

/// Linear falloff from 100 at zero to 0 at `ceiling`, floored at 0.
fn inverse_score(value: f64, ceiling: f64) -> f64 {
    (100.0 - (value / ceiling) * 100.0).max(0.0)
}

pub(crate) fn score_metrics(
    metrics: &PerformanceMetrics,
    weights: &ScoringWeights,
) -> (Vec<ScoreComponent>, f64) {
    let mut components = Vec::with_capacity(8);
    let mut raw_total = 0.0;

    let mut push = |factor: ScoreFactor, score: f64, notes: String| {
        raw_total += score;
        components.push(ScoreComponent {
            factor,
            score,
            notes,
        });
    };

    push(
        ScoreFactor::CompletionRate,
        metrics.completion_rate * weights.completion_rate,
        format!("completion rate {:.1}%", metrics.completion_rate),
    );

    let rating_pct = metrics.average_rating / 5.0 * 100.0;
    push(
        ScoreFactor::AverageRating,
        rating_pct * weights.average_rating,
        format!("average rating {:.2}/5.0", metrics.average_rating),
    );

    let response_score =
        inverse_score(metrics.response_time, weights.response_time_ceiling_minutes);
    push(
        ScoreFactor::ResponseTime,
        response_score * weights.response_time,
        format!(
            "response {:.0} min scores {:.1}",
            metrics.response_time, response_score
        ),
    );

    push(
        ScoreFactor::OnTimeDelivery,
        metrics.on_time_delivery_rate * weights.on_time_delivery,
        format!("on-time delivery {:.1}%", metrics.on_time_delivery_rate),
    );

    let cancellation_score = (100.0 - metrics.cancellation_rate).max(0.0);
    push(
        ScoreFactor::Cancellation,
        cancellation_score * weights.cancellation,
        format!("cancellation rate {:.1}%", metrics.cancellation_rate),
    );

    let distance_score = inverse_score(metrics.distance_from_pickup, weights.proximity_ceiling_km);
    push(
        ScoreFactor::Proximity,
        distance_score * weights.proximity,
        format!("{:.1} km from pickup", metrics.distance_from_pickup),
    );

    let workload_score = inverse_score(metrics.current_workload as f64, weights.workload_ceiling);
    push(
        ScoreFactor::Workload,
        workload_score * weights.workload,
        format!("{} active order(s)", metrics.current_workload),
    );

    if metrics.priority_score > weights.priority_bonus_threshold {
        push(
            ScoreFactor::PriorityBonus,
            weights.priority_bonus,
            format!(
                "priority score {} above {}",
                metrics.priority_score, weights.priority_bonus_threshold
            ),
        );
    }

    (components, raw_total)
}

/// Clamp into the published [0, 100] range; NaN collapses to 0.
pub(crate) fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    }
}
