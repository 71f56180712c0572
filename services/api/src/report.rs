use crate::infra::{build_service, load_fleet};
use clap::Args;
use dispatch_ai::config::AppConfig;
use dispatch_ai::error::AppError;
use dispatch_ai::telemetry;
use dispatch_ai::workflows::recommendation::{
    DeliveryRequest, DriverId, DriverInsightReport, DriverRecommendationService,
    FleetLeaderboard, RankingSort, RecommendationResult,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Directory containing drivers.csv, orders.csv, complaints.csv and telemetry.csv
    #[arg(long)]
    pub(crate) fleet: PathBuf,
    /// Delivery distance in kilometres
    #[arg(long)]
    pub(crate) distance: f64,
    /// Maximum number of drivers to list (clamped to 1-50)
    #[arg(long, default_value_t = 5)]
    pub(crate) max: i64,
    /// Print the raw JSON payload instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct InsightsArgs {
    /// Directory containing the fleet export
    #[arg(long)]
    pub(crate) fleet: PathBuf,
    /// Driver id to report on
    #[arg(long)]
    pub(crate) driver: u64,
    /// Print the raw JSON payload instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RankingArgs {
    /// Directory containing the fleet export
    #[arg(long)]
    pub(crate) fleet: PathBuf,
    /// Leaderboard order: score, completion_rate or rating
    #[arg(long, default_value_t = RankingSort::Score)]
    pub(crate) sort_by: RankingSort,
    /// Number of drivers to list (clamped to 1-50)
    #[arg(long, default_value_t = 10)]
    pub(crate) limit: i64,
    /// Print the raw JSON payload instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

fn service_for(fleet: PathBuf) -> Result<DriverRecommendationService, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;
    let store = load_fleet(Some(fleet.as_path()))?;
    Ok(build_service(store, &config.recommendation))
}

pub(crate) async fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let service = service_for(args.fleet)?;
    let request = DeliveryRequest::with_distance(args.distance);
    let results = service.recommend_drivers(&request, args.max).await?;

    if args.json {
        return print_json(&results);
    }

    println!(
        "Driver recommendations for a {:.1} km delivery",
        args.distance
    );
    if results.is_empty() {
        println!("  no active drivers could be ranked");
        return Ok(());
    }
    for (index, result) in results.iter().enumerate() {
        render_recommendation(index + 1, result);
    }

    Ok(())
}

pub(crate) async fn run_insights(args: InsightsArgs) -> Result<(), AppError> {
    let service = service_for(args.fleet)?;
    let report = service.driver_insights(DriverId(args.driver)).await?;

    if args.json {
        return print_json(&report);
    }

    render_insights(&report);
    Ok(())
}

pub(crate) async fn run_ranking(args: RankingArgs) -> Result<(), AppError> {
    let service = service_for(args.fleet)?;
    let leaderboard = service.performance_ranking(args.sort_by, args.limit).await?;

    if args.json {
        return print_json(&leaderboard);
    }

    render_leaderboard(&leaderboard);
    Ok(())
}

fn print_json<T: Serialize>(payload: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(payload).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

fn render_recommendation(rank: usize, result: &RecommendationResult) {
    println!(
        "{:>2}. {} (#{}, {:?})  score {:.1}  confidence {}  ETA {} min",
        rank,
        result.driver.full_name,
        result.driver.id,
        result.driver.vehicle_type,
        result.recommendation_score,
        result.confidence_level.label(),
        result.estimated_delivery_time
    );
    for reason in &result.reasons {
        println!("      - {reason}");
    }
}

fn render_insights(report: &DriverInsightReport) {
    let metrics = &report.metrics;
    println!(
        "Performance report for {} (#{})",
        report.driver.full_name, report.driver.id
    );
    println!(
        "  Fleet position: {} of {} ({}th percentile)",
        report.ranking.position, report.ranking.total_drivers, report.ranking.percentile
    );
    println!(
        "  Score: {:.1} | Confidence: {}",
        report.score,
        report.confidence_level.label()
    );
    println!(
        "  Orders: {} total, {} completed ({:.1}%), cancellations {:.1}%, complaints {:.1}%",
        metrics.total_orders,
        metrics.total_orders_completed,
        metrics.completion_rate,
        metrics.cancellation_rate,
        metrics.customer_complaint_rate
    );
    println!(
        "  Rating {:.2}/5.0 | Response {:.0} min | On-time {:.1}% | Revenue {:.0}",
        metrics.average_rating,
        metrics.response_time,
        metrics.on_time_delivery_rate,
        metrics.revenue_generated
    );

    println!("\nScore breakdown ({})", report.score_breakdown.weights_version);
    for component in &report.score_breakdown.components {
        println!("  {:>6.2}  {}", component.score, component.notes);
    }
    if report.score_breakdown.raw_total != report.score_breakdown.total {
        println!(
            "  raw total {:.2} clamped to {:.1}",
            report.score_breakdown.raw_total, report.score_breakdown.total
        );
    }

    println!("\nInsights");
    if report.insights.is_empty() {
        println!("  - nothing notable yet");
    }
    for insight in &report.insights {
        println!("  - {insight}");
    }

    if !report.recommendations.is_empty() {
        println!("\nRecommended actions");
        for recommendation in &report.recommendations {
            println!("  - {recommendation}");
        }
    }
}

fn render_leaderboard(leaderboard: &FleetLeaderboard) {
    println!(
        "Fleet ranking by {} ({} of {} drivers)",
        leaderboard.sort_by,
        leaderboard.rankings.len(),
        leaderboard.total_drivers
    );
    for (index, standing) in leaderboard.rankings.iter().enumerate() {
        let highlights = if standing.top_insights.is_empty() {
            "-".to_string()
        } else {
            standing.top_insights.join("; ")
        };
        println!(
            "{:>3}. {:<24} score {:>5.1} (#{} overall)  completion {:>5.1}%  rating {:.2}  [{}]",
            index + 1,
            standing.driver.full_name,
            standing.score,
            standing.ranking.position,
            standing.metrics.completion_rate,
            standing.metrics.average_rating,
            highlights
        );
    }
}
