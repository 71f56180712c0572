use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::domain::{ConfidenceLevel, DriverId, DriverProfile, PerformanceMetrics};
use super::evaluation::ScoreBreakdown;
use super::ranker::{CandidateOutcome, Ranker, ScoringContext};
use super::repository::RepositoryError;
use super::service::RecommendationError;

pub const DEFAULT_RANKING_LIMIT: usize = 10;
pub const MAX_RANKING_LIMIT: usize = 50;
const TOP_INSIGHTS_PER_STANDING: usize = 2;

/// Clamp a leaderboard size into `[1, MAX_RANKING_LIMIT]`.
pub fn clamp_ranking_limit(requested: i64) -> usize {
    let clamped = requested.clamp(1, MAX_RANKING_LIMIT as i64) as usize;
    if clamped as i64 != requested {
        debug!(requested, clamped, "ranking limit clamped");
    }
    clamped
}

/// Where a driver stands among the active fleet under neutral scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetRanking {
    pub position: u32,
    pub total_drivers: u32,
    pub percentile: u8,
}

impl FleetRanking {
    fn new(position: usize, total_drivers: usize) -> Self {
        let total = total_drivers.max(1);
        let position = position.clamp(1, total);
        let percentile = ((total - position + 1) as f64 / total as f64 * 100.0).round();

        Self {
            position: u32::try_from(position).unwrap_or(u32::MAX),
            total_drivers: u32::try_from(total).unwrap_or(u32::MAX),
            percentile: percentile.clamp(0.0, 100.0) as u8,
        }
    }
}

/// Diagnostic report for a single driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverInsightReport {
    pub driver: DriverProfile,
    pub metrics: PerformanceMetrics,
    pub score: f64,
    pub confidence_level: ConfidenceLevel,
    pub score_breakdown: ScoreBreakdown,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub ranking: FleetRanking,
}

/// Observations about a metrics snapshot and the coaching that follows from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsightSummary {
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

impl InsightSummary {
    fn note(&mut self, insight: &str) {
        self.insights.push(insight.to_string());
    }

    fn advise(&mut self, insight: &str, recommendation: &str) {
        self.note(insight);
        self.recommendations.push(recommendation.to_string());
    }
}

pub fn generate_insights(metrics: &PerformanceMetrics, confidence: ConfidenceLevel) -> InsightSummary {
    let mut summary = InsightSummary::default();

    if metrics.completion_rate >= 95.0 {
        summary.note("outstanding completion rate");
    } else if metrics.completion_rate <= 70.0 {
        summary.advise(
            "completion rate needs improvement",
            "focus on clear communication with customers",
        );
    }

    // An average of 0 means no rated orders, not a poor rating, so it gets no coaching.
    if metrics.average_rating <= 0.0 {
        summary.note("no customer ratings yet");
    } else if metrics.average_rating >= 4.5 {
        summary.note("customer rating is excellent");
    } else if metrics.average_rating <= 3.5 {
        summary.advise(
            "service quality needs improvement",
            "improve friendliness and professionalism",
        );
    }

    if metrics.response_time <= 5.0 {
        summary.note("excellent response time");
    } else if metrics.response_time >= 20.0 {
        summary.advise(
            "response time is too slow",
            "enable notifications and check the app regularly",
        );
    }

    if metrics.on_time_delivery_rate >= 85.0 {
        summary.note("reliably on-time deliveries");
    }

    if metrics.cancellation_rate > 10.0 {
        summary.advise(
            "cancellation rate is high",
            "only accept orders you can complete",
        );
    }

    if metrics.customer_complaint_rate > 5.0 {
        summary.advise(
            "complaint rate is above fleet expectations",
            "review complaint feedback with dispatch",
        );
    }

    if confidence == ConfidenceLevel::Low {
        summary.advise(
            "limited track record, recommendations carry low confidence",
            "complete more orders to build a track record",
        );
    }

    summary
}

/// Leaderboard ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingSort {
    #[default]
    Score,
    CompletionRate,
    Rating,
}

impl RankingSort {
    pub const fn as_str(self) -> &'static str {
        match self {
            RankingSort::Score => "score",
            RankingSort::CompletionRate => "completion_rate",
            RankingSort::Rating => "rating",
        }
    }
}

impl fmt::Display for RankingSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingSort {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "score" => Ok(RankingSort::Score),
            "completion_rate" | "completion-rate" => Ok(RankingSort::CompletionRate),
            "rating" => Ok(RankingSort::Rating),
            other => Err(format!(
                "unknown sort '{other}' (expected score, completion_rate or rating)"
            )),
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetStanding {
    pub driver: DriverProfile,
    pub metrics: PerformanceMetrics,
    pub score: f64,
    pub ranking: FleetRanking,
    pub top_insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetLeaderboard {
    pub rankings: Vec<FleetStanding>,
    pub sort_by: RankingSort,
    /// Drivers that could be scored, before truncation.
    pub total_drivers: usize,
}

/// Single-driver diagnostics and fleet leaderboards, scored under the neutral context.
pub struct PerformanceInsightService {
    ranker: Arc<Ranker>,
}

impl PerformanceInsightService {
    pub fn new(ranker: Arc<Ranker>) -> Self {
        Self { ranker }
    }

    pub async fn driver_insights(
        &self,
        driver_id: DriverId,
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> Result<DriverInsightReport, RecommendationError> {
        self.ranker
            .guarded(deadline, cancel, self.build_report(driver_id))
            .await
    }

    pub async fn performance_ranking(
        &self,
        sort_by: RankingSort,
        limit: usize,
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> Result<FleetLeaderboard, RecommendationError> {
        let fleet = self
            .ranker
            .guarded(
                deadline,
                cancel,
                self.ranker.score_active_pool(ScoringContext::Neutral, 0.0),
            )
            .await?;
        let limit = limit.clamp(1, MAX_RANKING_LIMIT);

        let mut standings = Vec::with_capacity(fleet.len());
        for outcome in &fleet {
            match &outcome.result {
                Ok(result) => {
                    let summary = generate_insights(&result.metrics, result.confidence_level);
                    standings.push(FleetStanding {
                        driver: result.driver.clone(),
                        metrics: result.metrics.clone(),
                        score: result.recommendation_score,
                        ranking: fleet_ranking(
                            outcome.driver.id,
                            result.recommendation_score,
                            &fleet,
                        ),
                        top_insights: summary
                            .insights
                            .into_iter()
                            .take(TOP_INSIGHTS_PER_STANDING)
                            .collect(),
                    });
                }
                Err(failure) => warn!(
                    driver_id = %outcome.driver.id,
                    error = %failure,
                    "driver left off performance ranking"
                ),
            }
        }

        sort_standings(&mut standings, sort_by);
        let total_drivers = standings.len();
        standings.truncate(limit);

        info!(
            total_drivers,
            returned = standings.len(),
            sort_by = %sort_by,
            "performance ranking built"
        );

        Ok(FleetLeaderboard {
            rankings: standings,
            sort_by,
            total_drivers,
        })
    }

    async fn build_report(
        &self,
        driver_id: DriverId,
    ) -> Result<DriverInsightReport, RecommendationError> {
        let driver = self
            .ranker
            .sources()
            .directory
            .driver(driver_id)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => RecommendationError::DriverNotFound(driver_id),
                other => RecommendationError::Directory(other),
            })?
            .ok_or(RecommendationError::DriverNotFound(driver_id))?;

        let fleet = self
            .ranker
            .score_active_pool(ScoringContext::Neutral, 0.0)
            .await?;

        let subject = match fleet.iter().find(|outcome| outcome.driver.id == driver_id) {
            Some(outcome) => outcome.result.clone(),
            None => {
                self.ranker
                    .evaluate(&driver, ScoringContext::Neutral, 0.0)
                    .await
            }
        }
        .map_err(|source| RecommendationError::Candidate { driver_id, source })?;

        let ranking = fleet_ranking(driver_id, subject.recommendation_score, &fleet);
        let summary = generate_insights(&subject.metrics, subject.confidence_level);
        let score_breakdown = self.ranker.engine().breakdown(&subject.metrics);

        info!(
            %driver_id,
            position = ranking.position,
            total_drivers = ranking.total_drivers,
            "driver insights generated"
        );

        Ok(DriverInsightReport {
            driver,
            metrics: subject.metrics,
            score: subject.recommendation_score,
            confidence_level: subject.confidence_level,
            score_breakdown,
            insights: summary.insights,
            recommendations: summary.recommendations,
            ranking,
        })
    }
}

/// Descending score, then ascending id.
fn standing_order(score: f64, id: DriverId, other_score: f64, other_id: DriverId) -> Ordering {
    other_score.total_cmp(&score).then_with(|| id.cmp(&other_id))
}

/// Rank `subject_id` against every active driver in `fleet`. Failed evaluations count as 0.
pub fn fleet_ranking(
    subject_id: DriverId,
    subject_score: f64,
    fleet: &[CandidateOutcome],
) -> FleetRanking {
    let mut in_pool = false;
    let mut ahead = 0usize;

    for outcome in fleet {
        if outcome.driver.id == subject_id {
            in_pool = true;
            continue;
        }
        let ordering = standing_order(
            outcome.comparison_score(),
            outcome.driver.id,
            subject_score,
            subject_id,
        );
        if ordering == Ordering::Less {
            ahead += 1;
        }
    }

    let total = fleet.len() + usize::from(!in_pool);
    FleetRanking::new(ahead + 1, total)
}

fn sort_standings(standings: &mut [FleetStanding], sort_by: RankingSort) {
    standings.sort_by(|a, b| {
        let key = |standing: &FleetStanding| match sort_by {
            RankingSort::Score => standing.score,
            RankingSort::CompletionRate => standing.metrics.completion_rate,
            RankingSort::Rating => standing.metrics.average_rating,
        };
        standing_order(key(a), a.driver.id, key(b), b.driver.id)
    });
}
