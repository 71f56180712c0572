use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::domain::{DeliveryRequest, DriverId, RecommendationResult};
use super::evaluation::{MetricsCalculator, ScoringEngine, UniformJitter};
use super::insights::{
    clamp_ranking_limit, DriverInsightReport, FleetLeaderboard, PerformanceInsightService,
    RankingSort,
};
use super::ranker::{
    clamp_max_recommendations, CandidateFailure, Ranker, RecommendationSettings,
};
use super::repository::{FleetSources, RepositoryError};
use crate::config::RecommendationConfig;

/// Error enumeration surfaced by [`DriverRecommendationService`].
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("driver {0} not found")]
    DriverNotFound(DriverId),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("driver directory unavailable: {0}")]
    Directory(#[source] RepositoryError),
    #[error("could not evaluate driver {driver_id}: {source}")]
    Candidate {
        driver_id: DriverId,
        #[source]
        source: CandidateFailure,
    },
    #[error("request deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
    #[error("request cancelled")]
    Cancelled,
}

impl From<&RecommendationConfig> for RecommendationSettings {
    fn from(config: &RecommendationConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            driver_timeout: config.driver_timeout,
            request_deadline: config.request_deadline,
        }
    }
}

/// Entry point used by the API layer: ranking, insights and leaderboards over one fleet.
pub struct DriverRecommendationService {
    ranker: Arc<Ranker>,
    insights: PerformanceInsightService,
}

impl DriverRecommendationService {
    pub fn new(
        sources: FleetSources,
        calculator: MetricsCalculator,
        engine: ScoringEngine,
        settings: RecommendationSettings,
    ) -> Self {
        let ranker = Arc::new(Ranker::new(sources, calculator, engine, settings));
        let insights = PerformanceInsightService::new(Arc::clone(&ranker));

        Self { ranker, insights }
    }

    /// Build from runtime configuration, enabling on-time jitter when configured.
    pub fn from_config(sources: FleetSources, config: &RecommendationConfig) -> Self {
        let calculator = if config.on_time_jitter {
            MetricsCalculator::with_jitter(Arc::new(UniformJitter))
        } else {
            MetricsCalculator::deterministic()
        };

        Self::new(
            sources,
            calculator,
            ScoringEngine::default(),
            RecommendationSettings::from(config),
        )
    }

    pub fn settings(&self) -> &RecommendationSettings {
        self.ranker.settings()
    }

    pub fn engine(&self) -> &ScoringEngine {
        self.ranker.engine()
    }

    /// Rank drivers for `request` under the configured deadline. `max_recommendations` is
    /// clamped into `[1, 50]`.
    pub async fn recommend_drivers(
        &self,
        request: &DeliveryRequest,
        max_recommendations: i64,
    ) -> Result<Vec<RecommendationResult>, RecommendationError> {
        let cancel = CancellationToken::new();
        self.recommend_drivers_with(
            request,
            max_recommendations,
            self.settings().request_deadline,
            &cancel,
        )
        .await
    }

    /// Same as [`Self::recommend_drivers`] with a caller-owned deadline and cancellation token.
    pub async fn recommend_drivers_with(
        &self,
        request: &DeliveryRequest,
        max_recommendations: i64,
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<RecommendationResult>, RecommendationError> {
        let limit = clamp_max_recommendations(max_recommendations);
        self.ranker.recommend(request, limit, deadline, cancel).await
    }

    pub async fn driver_insights(
        &self,
        driver_id: DriverId,
    ) -> Result<DriverInsightReport, RecommendationError> {
        let cancel = CancellationToken::new();
        self.insights
            .driver_insights(driver_id, self.settings().request_deadline, &cancel)
            .await
    }

    pub async fn performance_ranking(
        &self,
        sort_by: RankingSort,
        limit: i64,
    ) -> Result<FleetLeaderboard, RecommendationError> {
        let cancel = CancellationToken::new();
        self.insights
            .performance_ranking(
                sort_by,
                clamp_ranking_limit(limit),
                self.settings().request_deadline,
                &cancel,
            )
            .await
    }
}
