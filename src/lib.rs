//! # repo-export
//!
//! Export GitHub repository search results to CSV.
//!
//! One linear pipeline: authenticate → query → paginate → extract
//! fields → write rows. Queries the repository-search endpoint for
//! repositories matching a language filter, extracts 11 metadata
//! fields per repository (one of which, the contributor count, costs a
//! secondary request), and writes one CSV row per repository plus a
//! header row. Fully sequential — one request in flight at a time, no
//! caching, no retries.
//!
//! ## Quick Start
//!
//! ```no_run
//! use repo_export::{Config, run};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let token = repo_export::config::token_from_env()?;
//!     let config = Config::new(token, "rust").with_limit(50);
//!
//!     let summary = run(&config).await?;
//!     println!("wrote {} rows to {}", summary.rows_written, summary.path.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Metadata extraction and CSV writing
pub mod export;
/// GitHub REST API client
pub mod github;

pub use config::{Config, SortKey, SortOrder};
pub use error::{Error, Result};
pub use export::{CSV_HEADER, RepoMetadata};
pub use github::{GithubClient, Repo, SearchResults};

use std::path::PathBuf;
use tracing::info;

/// Outcome of a completed export run.
#[derive(Clone, Debug)]
pub struct ExportSummary {
    /// Number of data rows written (excludes the header)
    pub rows_written: u64,

    /// Destination file
    pub path: PathBuf,

    /// Total repositories matching the query, as reported by the API.
    /// `None` when no page was ever fetched (`limit` of zero).
    pub total_matches: Option<u64>,
}

/// Runs the full export pipeline for the given configuration.
///
/// Validates the configuration, then searches for repositories
/// matching `language:<config.language>` sorted per `config.sort` /
/// `config.order`, and writes up to `config.limit` of them to
/// `config.output_path()`.
///
/// # Errors
///
/// Returns [`Error::Config`] before any network activity if the
/// configuration is invalid; otherwise propagates the first
/// remote-service or I/O error, aborting the run.
pub async fn run(config: &Config) -> Result<ExportSummary> {
    config.validate()?;

    info!(
        language = %config.language,
        sort = %config.sort,
        order = %config.order,
        limit = config.limit,
        "starting export"
    );

    let client = GithubClient::new(config)?;
    let mut results = client.search_repositories(&config.language, config.sort, config.order);

    let path = config.output_path();
    let rows_written = export::export_csv(&client, &mut results, config.limit, &path).await?;

    Ok(ExportSummary {
        rows_written,
        path,
        total_matches: results.total_count(),
    })
}
