use crate::report::{
    run_insights, run_ranking, run_recommend, InsightsArgs, RankingArgs, RecommendArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dispatch_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Dispatch AI",
    about = "Rank delivery drivers for incoming orders and report on fleet performance",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank the active drivers in a fleet export for one delivery
    Recommend(RecommendArgs),
    /// Print a performance report for a single driver
    Insights(InsightsArgs),
    /// Print the fleet performance leaderboard
    Ranking(RankingArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Recommend(args) => run_recommend(args).await,
        Command::Insights(args) => run_insights(args).await,
        Command::Ranking(args) => run_ranking(args).await,
    }
}
