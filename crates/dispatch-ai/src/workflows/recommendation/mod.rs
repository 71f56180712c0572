//! Driver recommendation: metrics derivation, weighted scoring, explanation, ranking and
//! fleet-wide performance insights.

pub mod domain;
pub(crate) mod evaluation;
pub mod insights;
pub mod ranker;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ComplaintRecord, ConfidenceLevel, DeliveryRequest, DriverId, DriverProfile, DriverStatus,
    LiveTelemetry, OrderRecord, OrderStatus, PerformanceMetrics, PriorityLevel,
    RecommendationResult, VehicleType,
};
pub use evaluation::{
    classify_confidence, estimate_delivery_minutes, generate_reasons, MetricsCalculator,
    NoJitter, OnTimeJitter, ScoreBreakdown, ScoreComponent, ScoreFactor, ScoringEngine,
    ScoringWeights, UniformJitter, FALLBACK_REASON, MAX_REASONS,
};
pub use insights::{
    generate_insights, DriverInsightReport, FleetLeaderboard, FleetRanking, FleetStanding,
    InsightSummary, PerformanceInsightService, RankingSort,
};
pub use ranker::{
    CandidateFailure, CandidateOutcome, Ranker, RecommendationSettings, ScoringContext,
};
pub use repository::{
    ComplaintRegistry, DriverDirectory, FleetSources, LiveTelemetryProvider, OrderLedger,
    RepositoryError,
};
pub use router::recommendation_router;
pub use service::{DriverRecommendationService, RecommendationError};
