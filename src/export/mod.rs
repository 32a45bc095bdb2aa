//! Metadata extraction and CSV export
//!
//! [`RepoMetadata`] is the fixed-shape row type: its field declaration
//! order is the column order, so the header and every row are
//! guaranteed consistent at compile time rather than by convention.
//! [`export_csv`] drives the pipeline — it consumes the lazy search
//! sequence, extracts one row per repository, and writes the file.

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::error::Result;
use crate::github::{GithubClient, Repo, SearchResults};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Column names of the CSV header row, in output order.
///
/// Must match the field declaration order of [`RepoMetadata`]; the
/// `test_header_matches_row_shape` test keeps the two in sync.
pub const CSV_HEADER: [&str; 11] = [
    "full_name",
    "html_url",
    "stargazers_count",
    "forks_count",
    "collaborators",
    "open_issues_count",
    "description",
    "archived",
    "created_at",
    "updated_at",
    "pushed_at",
];

/// One exported row: the 11 metadata fields of a repository.
///
/// Created fresh per record by [`extract_metadata`] and consumed
/// immediately by the writer. `description` and `pushed_at` serialize
/// to an empty CSV field when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepoMetadata {
    /// Unique `owner/name` identifier
    pub full_name: String,

    /// Web URL of the repository
    pub html_url: String,

    /// Star count
    pub stargazers_count: u64,

    /// Fork count
    pub forks_count: u64,

    /// Total contributor count, derived via a secondary request
    pub collaborators: u64,

    /// Open issue count
    pub open_issues_count: u64,

    /// Repository description, if any
    pub description: Option<String>,

    /// Whether the repository is archived
    pub archived: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last-update timestamp
    pub updated_at: DateTime<Utc>,

    /// Last-push timestamp, if the repository was ever pushed to
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Extracts the 11 metadata fields from one repository record.
///
/// Ten fields are read verbatim from the record; `collaborators` costs
/// one additional round-trip per repository (see
/// [`GithubClient::contributor_count`]).
///
/// # Errors
///
/// Propagates any remote-service error from the contributor lookup,
/// e.g. the record was deleted between search and extraction, or the
/// token cannot read the contributor list.
pub async fn extract_metadata(client: &GithubClient, repo: &Repo) -> Result<RepoMetadata> {
    let collaborators = client.contributor_count(&repo.full_name).await?;

    Ok(RepoMetadata {
        full_name: repo.full_name.clone(),
        html_url: repo.html_url.clone(),
        stargazers_count: repo.stargazers_count,
        forks_count: repo.forks_count,
        collaborators,
        open_issues_count: repo.open_issues_count,
        description: repo.description.clone(),
        archived: repo.archived,
        created_at: repo.created_at,
        updated_at: repo.updated_at,
        pushed_at: repo.pushed_at,
    })
}

/// Consumes up to `limit` repositories from `results` and writes them
/// as CSV rows to `path`, preceded by the fixed header row.
///
/// The destination is truncated if it exists (its parent directory is
/// created if absent). Rows are written in consumption order and each
/// row is flushed as it is written, so a mid-stream failure leaves the
/// header plus every completed row on disk. `limit = 0` produces a
/// header-only file.
///
/// Returns the number of data rows written, `min(limit, available)`.
///
/// # Errors
///
/// A filesystem error aborts the operation, leaving a partial or
/// absent file; a remote-service error during consumption or
/// extraction aborts mid-stream, leaving a truncated file. There is no
/// atomic-write guarantee.
pub async fn export_csv(
    client: &GithubClient,
    results: &mut SearchResults<'_>,
    limit: usize,
    path: &Path,
) -> Result<u64> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;

    // The header is written explicitly so that a limit of zero still
    // produces it; serialize() must therefore not emit its own.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(CSV_HEADER)?;
    writer.flush()?;

    let mut written: u64 = 0;
    while written < limit as u64 {
        let Some(repo) = results.try_next().await? else {
            break;
        };

        let row = extract_metadata(client, &repo).await?;
        writer.serialize(&row)?;
        writer.flush()?;
        written += 1;

        debug!(repo = %row.full_name, row = written, "wrote row");
    }

    info!(
        rows = written,
        path = %path.display(),
        total_matches = results.total_count(),
        "export complete"
    );
    Ok(written)
}
