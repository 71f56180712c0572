use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{DeliveryRequest, DriverId, RecommendationResult};
use super::insights::{RankingSort, DEFAULT_RANKING_LIMIT};
use super::ranker::DEFAULT_MAX_RECOMMENDATIONS;
use super::service::{DriverRecommendationService, RecommendationError};

/// Body accepted by the recommendation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequestBody {
    pub distance: f64,
    #[serde(default)]
    pub pickup_address: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: i64,
}

fn default_max_recommendations() -> i64 {
    DEFAULT_MAX_RECOMMENDATIONS as i64
}

impl RecommendationRequestBody {
    fn delivery_request(&self) -> DeliveryRequest {
        DeliveryRequest {
            distance_km: self.distance,
            pickup_address: self.pickup_address.clone(),
            delivery_address: self.delivery_address.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<RecommendationResult>,
    pub total_recommendations: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    pub limit: Option<i64>,
    pub sort_by: Option<RankingSort>,
}

/// Router builder exposing recommendation, insight and leaderboard endpoints.
pub fn recommendation_router(service: Arc<DriverRecommendationService>) -> Router {
    Router::new()
        .route("/api/v1/driver-recommendations", post(recommend_handler))
        .route(
            "/api/v1/drivers/performance-ranking",
            get(ranking_handler),
        )
        .route(
            "/api/v1/drivers/:driver_id/performance-insights",
            get(insights_handler),
        )
        .with_state(service)
}

pub(crate) async fn recommend_handler(
    State(service): State<Arc<DriverRecommendationService>>,
    axum::Json(body): axum::Json<RecommendationRequestBody>,
) -> Response {
    let request = body.delivery_request();
    match service
        .recommend_drivers(&request, body.max_recommendations)
        .await
    {
        Ok(recommendations) => {
            let payload = RecommendationResponse {
                total_recommendations: recommendations.len(),
                recommendations,
                generated_at: Utc::now(),
            };
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn insights_handler(
    State(service): State<Arc<DriverRecommendationService>>,
    Path(driver_id): Path<u64>,
) -> Response {
    match service.driver_insights(DriverId(driver_id)).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn ranking_handler(
    State(service): State<Arc<DriverRecommendationService>>,
    Query(query): Query<RankingQuery>,
) -> Response {
    let sort_by = query.sort_by.unwrap_or_default();
    let limit = query.limit.unwrap_or(DEFAULT_RANKING_LIMIT as i64);

    match service.performance_ranking(sort_by, limit).await {
        Ok(leaderboard) => (StatusCode::OK, axum::Json(leaderboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn status_for(error: &RecommendationError) -> StatusCode {
    match error {
        RecommendationError::DriverNotFound(_) => StatusCode::NOT_FOUND,
        RecommendationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        RecommendationError::Directory(_) => StatusCode::SERVICE_UNAVAILABLE,
        RecommendationError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        RecommendationError::Candidate { .. } | RecommendationError::Cancelled => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: RecommendationError) -> Response {
    let status = status_for(&error);
    let payload = match &error {
        RecommendationError::DriverNotFound(driver_id) => json!({
            "error": error.to_string(),
            "driver_id": driver_id,
        }),
        _ => json!({
            "error": error.to_string(),
        }),
    };
    (status, axum::Json(payload)).into_response()
}
