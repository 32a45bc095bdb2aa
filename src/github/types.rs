//! Wire types for the GitHub REST API
//!
//! Only the fields the exporter reads are modeled; everything else in
//! the response bodies is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One repository record as returned by the search endpoint.
///
/// Read-only: records are owned by the remote API and never mutated
/// locally.
#[derive(Clone, Debug, Deserialize)]
pub struct Repo {
    /// Unique `owner/name` identifier
    pub full_name: String,

    /// Web URL of the repository
    pub html_url: String,

    /// Star count
    pub stargazers_count: u64,

    /// Fork count
    pub forks_count: u64,

    /// Open issue count
    pub open_issues_count: u64,

    /// Repository description (null for repositories without one)
    pub description: Option<String>,

    /// Whether the repository is archived
    pub archived: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last-update timestamp
    pub updated_at: DateTime<Utc>,

    /// Last-push timestamp (null for repositories never pushed to)
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Response envelope of `GET /search/repositories`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// Total number of repositories matching the query
    pub total_count: u64,

    /// True when the query timed out server-side and results are partial
    #[serde(default)]
    pub incomplete_results: bool,

    /// The repositories on this page, in the requested sort order
    pub items: Vec<Repo>,
}

/// Error body returned by the API on non-success responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable error message (e.g., "Bad credentials")
    pub message: String,
}
