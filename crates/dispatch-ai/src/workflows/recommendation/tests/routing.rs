use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;

use crate::workflows::recommendation::recommendation_router;
use crate::workflows::recommendation::router::{
    insights_handler, recommend_handler, RecommendationRequestBody,
};

fn fleet() -> MemoryFleet {
    let fleet = MemoryFleet::default();
    fleet.add_driver(priority_driver(1), history(1, 20, 0, Some(5)), near(1.0, 0));
    fleet.add_driver(driver(2), history(2, 5, 5, Some(4)), near(6.0, 2));
    fleet.add_driver(driver(3), Vec::new(), near(0.5, 0));
    fleet
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn recommendation_route_returns_ranked_payload() {
    let router = recommendation_router(Arc::new(build_service(&fleet())));

    let response = router
        .oneshot(post_json(
            "/api/v1/driver-recommendations",
            json!({
                "distance": 3.0,
                "pickup_address": "Jl. Sudirman 1",
                "max_recommendations": 2
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_recommendations"], json!(2));
    assert!(payload["generated_at"].is_string());

    let recommendations = payload["recommendations"].as_array().expect("array");
    assert_eq!(recommendations[0]["driver"]["id"], json!(1));
    assert_eq!(recommendations[0]["recommendation_score"], json!(100.0));
    assert_eq!(recommendations[0]["confidence_level"], json!("high"));
    assert_eq!(recommendations[1]["driver"]["id"], json!(2));
    assert_eq!(recommendations[1]["estimated_delivery_time"], json!(30));
}

#[tokio::test]
async fn recommend_handler_defaults_to_five_results() {
    let service = Arc::new(build_service(&fleet()));
    let body: RecommendationRequestBody =
        serde_json::from_value(json!({ "distance": 1.0 })).expect("body parses");
    assert_eq!(body.max_recommendations, 5);

    let response = recommend_handler(State(service), axum::Json(body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_recommendations"], json!(3));
}

#[tokio::test]
async fn negative_distance_is_a_bad_request() {
    let router = recommendation_router(Arc::new(build_service(&fleet())));

    let response = router
        .oneshot(post_json(
            "/api/v1/driver-recommendations",
            json!({ "distance": -4.0 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("distance"));
}

#[tokio::test]
async fn directory_outage_maps_to_service_unavailable() {
    let fleet = fleet();
    fleet.take_directory_offline();
    let router = recommendation_router(Arc::new(build_service(&fleet)));

    let response = router
        .oneshot(post_json(
            "/api/v1/driver-recommendations",
            json!({ "distance": 2.0 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn insights_route_returns_report() {
    let router = recommendation_router(Arc::new(build_service(&fleet())));

    let response = router
        .oneshot(
            Request::get("/api/v1/drivers/2/performance-insights")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["driver"]["id"], json!(2));
    assert_eq!(payload["ranking"]["position"], json!(2));
    assert_eq!(payload["ranking"]["total_drivers"], json!(3));
    assert!(payload["insights"].as_array().is_some());
}

#[tokio::test]
async fn insights_handler_returns_not_found_for_unknown_driver() {
    let service = Arc::new(build_service(&fleet()));

    let response = insights_handler(State(service), Path(404)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["driver_id"], json!(404));
}

#[tokio::test]
async fn ranking_route_honours_query_parameters() {
    let router = recommendation_router(Arc::new(build_service(&fleet())));

    let response = router
        .oneshot(
            Request::get("/api/v1/drivers/performance-ranking?sort_by=rating&limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["sort_by"], json!("rating"));
    assert_eq!(payload["total_drivers"], json!(3));
    let rankings = payload["rankings"].as_array().expect("array");
    assert_eq!(rankings.len(), 2);
    assert_eq!(rankings[0]["driver"]["id"], json!(1));
    assert_eq!(rankings[0]["ranking"]["percentile"], json!(100));
}

#[tokio::test]
async fn ranking_route_rejects_unknown_sort() {
    let router = recommendation_router(Arc::new(build_service(&fleet())));

    let response = router
        .oneshot(
            Request::get("/api/v1/drivers/performance-ranking?sort_by=speed")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
