//! Command-line entry point for repo-export.

use clap::Parser;
use repo_export::{Config, ExportSummary, SortKey, SortOrder, config::token_from_env, run};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repo-export")]
#[command(version)]
#[command(about = "Export GitHub repository search results to CSV")]
#[command(
    long_about = "Searches GitHub for repositories matching a language filter and writes \
their metadata (stars, forks, contributor count, issue count, timestamps, ...) to a CSV \
file, one row per repository.\n\nReads the access token from the GITHUB_ACCESS_TOKEN \
environment variable."
)]
struct Cli {
    /// Language filter for the repository search (e.g. "rust", "go")
    language: String,

    /// Sort key for search results
    #[arg(short, long, value_enum, default_value_t = SortKey::Stars)]
    sort: SortKey,

    /// Sort direction for search results
    #[arg(short, long, value_enum, default_value_t = SortOrder::Desc)]
    order: SortOrder,

    /// Maximum number of repositories to export
    #[arg(short, long, default_value_t = 100)]
    limit: usize,

    /// Output directory
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Output file name
    #[arg(short, long, default_value = "repositories.csv")]
    file_name: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(summary) => {
            println!(
                "exported {} of {} matching repositories to {}",
                summary.rows_written,
                summary
                    .total_matches
                    .map_or_else(|| "?".to_string(), |t| t.to_string()),
                summary.path.display()
            );
        }
        Err(e) => {
            error!("export failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn execute(cli: Cli) -> repo_export::Result<ExportSummary> {
    let token = token_from_env()?;

    let mut config = Config::new(token, cli.language)
        .with_sort(cli.sort)
        .with_order(cli.order)
        .with_limit(cli.limit);
    config.output_dir = cli.output_dir;
    config.file_name = cli.file_name;

    run(&config).await
}
