mod metrics;
mod policy;
mod reasons;
mod rules;
mod weights;

pub use metrics::{MetricsCalculator, NoJitter, OnTimeJitter, UniformJitter};
pub use policy::{classify_confidence, estimate_delivery_minutes};
pub use reasons::{generate_reasons, FALLBACK_REASON, MAX_REASONS};
pub use weights::ScoringWeights;

use super::domain::PerformanceMetrics;
use serde::Serialize;

/// Stateless scorer that applies a weight table to a metrics snapshot.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Composite recommendation score in `[0, 100]`.
    pub fn score(&self, metrics: &PerformanceMetrics) -> f64 {
        let (_, raw_total) = rules::score_metrics(metrics, &self.weights);
        rules::clamp_score(raw_total)
    }

    pub fn breakdown(&self, metrics: &PerformanceMetrics) -> ScoreBreakdown {
        let (components, raw_total) = rules::score_metrics(metrics, &self.weights);

        ScoreBreakdown {
            weights_version: self.weights.version,
            total: rules::clamp_score(raw_total),
            raw_total,
            components,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    CompletionRate,
    AverageRating,
    ResponseTime,
    OnTimeDelivery,
    Cancellation,
    Proximity,
    Workload,
    PriorityBonus,
}

/// Weighted contribution of one factor, kept so a ranking can be audited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub score: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub weights_version: &'static str,
    pub total: f64,
    pub raw_total: f64,
    pub components: Vec<ScoreComponent>,
}
