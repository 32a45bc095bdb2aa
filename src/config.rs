//! Configuration types for repo-export
//!
//! All run parameters live in [`ExportConfig`], constructed once at
//! startup and threaded through the pipeline. The only value read from
//! the process environment is the access token, via [`token_from_env`]
//! at the binary boundary; the library itself never touches global
//! state.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Environment variable holding the GitHub access token.
pub const TOKEN_ENV_VAR: &str = "GITHUB_ACCESS_TOKEN";

/// Sort key for repository search results.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Sort by star count (API default for popularity)
    #[default]
    Stars,
    /// Sort by fork count
    Forks,
    /// Sort by last update time
    Updated,
}

impl SortKey {
    /// Query-parameter value understood by the search endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Stars => "stars",
            SortKey::Forks => "forks",
            SortKey::Updated => "updated",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for repository search results.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Descending (API default)
    #[default]
    Desc,
    /// Ascending
    Asc,
}

impl SortOrder {
    /// Query-parameter value understood by the search endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Desc => "desc",
            SortOrder::Asc => "asc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main configuration for a metadata export run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Access token used for all API requests
    pub token: String,

    /// Language filter, applied as `language:<value>` in the search
    /// query. Not validated against any known-language list — an
    /// unrecognized value simply yields few or zero results.
    pub language: String,

    /// Sort key for search results (default: stars)
    #[serde(default)]
    pub sort: SortKey,

    /// Sort direction for search results (default: desc)
    #[serde(default)]
    pub order: SortOrder,

    /// Maximum number of repositories to export (default: 100)
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Output directory (default: "./output")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output file name (default: "repositories.csv")
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Base URL of the API (default: `https://api.github.com`).
    /// Overridable so tests can point at a mock server.
    #[serde(default = "default_api_base")]
    pub api_base: Url,

    /// Page size for search requests, 1–100 (default: 100, the API
    /// maximum)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_limit() -> usize {
    100
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_file_name() -> String {
    "repositories.csv".to_string()
}

// The literal is a valid URL; parsing cannot fail.
#[allow(clippy::expect_used)]
fn default_api_base() -> Url {
    Url::parse("https://api.github.com").expect("default API base URL is valid")
}

fn default_per_page() -> u32 {
    100
}

impl Config {
    /// Creates a configuration for the given token and language with
    /// all other fields at their defaults.
    pub fn new(token: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            language: language.into(),
            sort: SortKey::default(),
            order: SortOrder::default(),
            limit: default_limit(),
            output_dir: default_output_dir(),
            file_name: default_file_name(),
            api_base: default_api_base(),
            per_page: default_per_page(),
        }
    }

    /// Sets the sort key.
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the sort direction.
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the maximum number of repositories to export.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Full path of the destination file.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }

    /// Validates the configuration before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token or language is empty, or
    /// if `per_page` is outside 1–100.
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::Config {
                message: "access token is empty".to_string(),
                key: Some("token".to_string()),
            });
        }
        if self.language.trim().is_empty() {
            return Err(Error::Config {
                message: "language filter must not be empty".to_string(),
                key: Some("language".to_string()),
            });
        }
        if self.per_page == 0 || self.per_page > 100 {
            return Err(Error::Config {
                message: format!("per_page must be 1-100, got {}", self.per_page),
                key: Some("per_page".to_string()),
            });
        }
        Ok(())
    }
}

/// Reads the access token from the `GITHUB_ACCESS_TOKEN` environment
/// variable.
///
/// # Errors
///
/// Returns [`Error::Config`] if the variable is unset or empty. This is
/// a fatal startup condition; the process must not proceed without a
/// credential.
pub fn token_from_env() -> Result<String> {
    match std::env::var(TOKEN_ENV_VAR) {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => Err(Error::Config {
            message: format!("{TOKEN_ENV_VAR} not found in environment variables"),
            key: Some(TOKEN_ENV_VAR.to_string()),
        }),
    }
}
