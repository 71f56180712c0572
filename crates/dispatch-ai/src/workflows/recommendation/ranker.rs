use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::domain::{
    DeliveryRequest, DriverProfile, LiveTelemetry, PerformanceMetrics, RecommendationResult,
};
use super::evaluation::{
    classify_confidence, estimate_delivery_minutes, generate_reasons, MetricsCalculator,
    ScoringEngine,
};
use super::repository::{FleetSources, RepositoryError};
use super::service::RecommendationError;

pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 5;
pub const MAX_RECOMMENDATIONS_LIMIT: usize = 50;

/// Clamp a caller-supplied result count into `[1, MAX_RECOMMENDATIONS_LIMIT]`.
pub fn clamp_max_recommendations(requested: i64) -> usize {
    let clamped = requested.clamp(1, MAX_RECOMMENDATIONS_LIMIT as i64) as usize;
    if clamped as i64 != requested {
        debug!(requested, clamped, "max_recommendations clamped");
    }
    clamped
}

/// Resource limits for one ranker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationSettings {
    /// Concurrent per-driver ledger reads across all requests served by this ranker.
    pub max_concurrency: usize,
    pub driver_timeout: Duration,
    pub request_deadline: Duration,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            driver_timeout: Duration::from_millis(2_000),
            request_deadline: Duration::from_millis(10_000),
        }
    }
}

/// Where the live signals for a candidate come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringContext {
    /// Query the telemetry provider for the order being dispatched.
    Live,
    /// Use [`LiveTelemetry::NEUTRAL`] so drivers compare independently of any order.
    Neutral,
}

/// Why a single driver dropped out of a batch. Never escalated to a batch error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CandidateFailure {
    #[error("order ledger: {0}")]
    Ledger(RepositoryError),
    #[error("complaint registry: {0}")]
    Complaints(RepositoryError),
    #[error("telemetry: {0}")]
    Telemetry(RepositoryError),
    #[error("invalid telemetry reading: {0}")]
    InvalidTelemetry(String),
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("worker failed: {0}")]
    Panicked(String),
}

/// Per-driver result of a fan-out, kept explicit so callers decide how to treat failures.
#[derive(Debug, Clone)]
pub struct CandidateOutcome {
    pub driver: DriverProfile,
    pub result: Result<RecommendationResult, CandidateFailure>,
}

impl CandidateOutcome {
    /// Score used for fleet comparisons; failed drivers rank at the bottom with 0.
    pub fn comparison_score(&self) -> f64 {
        self.result
            .as_ref()
            .map(|recommendation| recommendation.recommendation_score)
            .unwrap_or(0.0)
    }
}

/// Scores and orders the active pool for an order.
pub struct Ranker {
    sources: FleetSources,
    calculator: Arc<MetricsCalculator>,
    engine: Arc<ScoringEngine>,
    permits: Arc<Semaphore>,
    settings: RecommendationSettings,
}

impl Ranker {
    pub fn new(
        sources: FleetSources,
        calculator: MetricsCalculator,
        engine: ScoringEngine,
        settings: RecommendationSettings,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_concurrency.max(1)));

        Self {
            sources,
            calculator: Arc::new(calculator),
            engine: Arc::new(engine),
            permits,
            settings,
        }
    }

    pub fn sources(&self) -> &FleetSources {
        &self.sources
    }

    pub fn settings(&self) -> &RecommendationSettings {
        &self.settings
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Rank the active pool for `request`, returning at most `max_recommendations` results.
    ///
    /// Drivers whose computation fails or exceeds the per-driver timeout are logged and left
    /// out. Cancellation or an expired `deadline` aborts in-flight work and discards it.
    pub async fn recommend(
        &self,
        request: &DeliveryRequest,
        max_recommendations: usize,
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<RecommendationResult>, RecommendationError> {
        validate_request(request)?;
        let limit = max_recommendations.clamp(1, MAX_RECOMMENDATIONS_LIMIT);

        let outcomes = self
            .guarded(
                deadline,
                cancel,
                self.score_active_pool(ScoringContext::Live, request.distance_km),
            )
            .await?;

        let candidates = outcomes.len();
        let mut results = successful(outcomes);
        sort_recommendations(&mut results);
        results.truncate(limit);

        info!(
            candidates,
            returned = results.len(),
            distance_km = request.distance_km,
            "driver recommendations ranked"
        );

        Ok(results)
    }

    /// Run `work` until it finishes, `cancel` fires or `deadline` elapses. Dropping `work`
    /// on the losing branches aborts any tasks it spawned. A deadline past the end of the
    /// clock never fires.
    pub(crate) async fn guarded<T, F>(
        &self,
        deadline: Duration,
        cancel: &CancellationToken,
        work: F,
    ) -> Result<T, RecommendationError>
    where
        F: Future<Output = Result<T, RecommendationError>>,
    {
        let expires_at = tokio::time::Instant::now().checked_add(deadline);
        let expiry = async move {
            match expires_at {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("recommendation request cancelled; discarding partial results");
                Err(RecommendationError::Cancelled)
            }
            _ = expiry => {
                warn!(?deadline, "recommendation deadline exceeded; discarding partial results");
                Err(RecommendationError::DeadlineExceeded(deadline))
            }
            result = work => result,
        }
    }

    /// Fetch the active pool and evaluate every driver in it.
    pub(crate) async fn score_active_pool(
        &self,
        context: ScoringContext,
        distance_km: f64,
    ) -> Result<Vec<CandidateOutcome>, RecommendationError> {
        let drivers: Vec<DriverProfile> = self
            .sources
            .directory
            .active_drivers()
            .await
            .map_err(RecommendationError::Directory)?
            .into_iter()
            .filter(DriverProfile::is_active)
            .collect();

        Ok(self.fan_out(drivers, context, distance_km).await)
    }

    /// Evaluate `drivers` concurrently, bounded by the shared permit pool.
    pub(crate) async fn fan_out(
        &self,
        drivers: Vec<DriverProfile>,
        context: ScoringContext,
        distance_km: f64,
    ) -> Vec<CandidateOutcome> {
        let mut workers = JoinSet::new();
        let mut in_flight = HashMap::with_capacity(drivers.len());

        for driver in drivers {
            let sources = self.sources.clone();
            let calculator = Arc::clone(&self.calculator);
            let engine = Arc::clone(&self.engine);
            let permits = Arc::clone(&self.permits);
            let timeout = self.settings.driver_timeout;
            let profile = driver.clone();

            let handle = workers.spawn(async move {
                // The semaphore is never closed, so acquisition only waits.
                let _permit = permits.acquire_owned().await.ok();
                let evaluation = evaluate_candidate(
                    &sources,
                    &calculator,
                    &engine,
                    &driver,
                    context,
                    distance_km,
                );
                let result = match tokio::time::timeout(timeout, evaluation).await {
                    Ok(result) => result,
                    Err(_) => Err(CandidateFailure::TimedOut(timeout)),
                };
                CandidateOutcome { driver, result }
            });
            in_flight.insert(handle.id(), profile);
        }

        let mut outcomes = Vec::with_capacity(in_flight.len());
        while let Some(joined) = workers.join_next_with_id().await {
            match joined {
                Ok((id, outcome)) => {
                    in_flight.remove(&id);
                    outcomes.push(outcome);
                }
                Err(err) => {
                    let Some(driver) = in_flight.remove(&err.id()) else {
                        warn!(error = %err, "unknown candidate worker failed");
                        continue;
                    };
                    warn!(driver_id = %driver.id, error = %err, "candidate worker did not complete");
                    outcomes.push(CandidateOutcome {
                        driver,
                        result: Err(CandidateFailure::Panicked(err.to_string())),
                    });
                }
            }
        }
        outcomes
    }

    /// Evaluate one driver without the per-driver timeout.
    pub(crate) async fn evaluate(
        &self,
        driver: &DriverProfile,
        context: ScoringContext,
        distance_km: f64,
    ) -> Result<RecommendationResult, CandidateFailure> {
        evaluate_candidate(
            &self.sources,
            &self.calculator,
            &self.engine,
            driver,
            context,
            distance_km,
        )
        .await
    }
}

fn validate_request(request: &DeliveryRequest) -> Result<(), RecommendationError> {
    if !request.distance_km.is_finite() || request.distance_km < 0.0 {
        return Err(RecommendationError::InvalidRequest(format!(
            "distance must be a non-negative number of kilometres, got {}",
            request.distance_km
        )));
    }
    Ok(())
}

async fn evaluate_candidate(
    sources: &FleetSources,
    calculator: &MetricsCalculator,
    engine: &ScoringEngine,
    driver: &DriverProfile,
    context: ScoringContext,
    distance_km: f64,
) -> Result<RecommendationResult, CandidateFailure> {
    let (orders, complaints) = tokio::try_join!(
        async {
            sources
                .ledger
                .orders_for_driver(driver.id)
                .await
                .map_err(CandidateFailure::Ledger)
        },
        async {
            sources
                .complaints
                .complaints_for_driver(driver.id)
                .await
                .map_err(CandidateFailure::Complaints)
        },
    )?;

    let telemetry = match context {
        ScoringContext::Live => {
            let reading = sources
                .telemetry
                .telemetry(driver.id)
                .await
                .map_err(CandidateFailure::Telemetry)?;
            validate_telemetry(reading)?
        }
        ScoringContext::Neutral => LiveTelemetry::NEUTRAL,
    };

    let metrics = calculator.calculate(driver, &orders, &complaints, telemetry);
    Ok(assemble_recommendation(
        driver.clone(),
        metrics,
        engine,
        distance_km,
    ))
}

fn validate_telemetry(reading: LiveTelemetry) -> Result<LiveTelemetry, CandidateFailure> {
    if !reading.distance_from_pickup_km.is_finite() || reading.distance_from_pickup_km < 0.0 {
        return Err(CandidateFailure::InvalidTelemetry(format!(
            "distance from pickup {}",
            reading.distance_from_pickup_km
        )));
    }
    Ok(reading)
}

/// Score, explain and estimate one candidate from an already computed snapshot.
pub fn assemble_recommendation(
    driver: DriverProfile,
    metrics: PerformanceMetrics,
    engine: &ScoringEngine,
    distance_km: f64,
) -> RecommendationResult {
    let recommendation_score = engine.score(&metrics);
    let reasons = generate_reasons(&metrics, &driver);
    let confidence_level = classify_confidence(&metrics);
    let estimated_delivery_time = estimate_delivery_minutes(&metrics, distance_km);

    RecommendationResult {
        driver,
        recommendation_score,
        metrics,
        reasons,
        estimated_delivery_time,
        confidence_level,
    }
}

/// Keep the successful outcomes, logging every excluded driver.
pub(crate) fn successful(outcomes: Vec<CandidateOutcome>) -> Vec<RecommendationResult> {
    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome.result {
            Ok(recommendation) => Some(recommendation),
            Err(failure) => {
                warn!(
                    driver_id = %outcome.driver.id,
                    error = %failure,
                    "driver excluded from recommendations"
                );
                None
            }
        })
        .collect()
}

/// Score descending; exact ties fall back to ascending driver id.
pub fn sort_recommendations(results: &mut [RecommendationResult]) {
    results.sort_by(|a, b| {
        b.recommendation_score
            .total_cmp(&a.recommendation_score)
            .then_with(|| a.driver.id.cmp(&b.driver.id))
    });
}
