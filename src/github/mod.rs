//! GitHub REST API client
//!
//! [`GithubClient`] is a thin wrapper over `reqwest` that adds the
//! authentication, `Accept`, and `User-Agent` headers every request
//! needs, and maps non-success responses to the crate's error variants.
//! Search pagination lives in [`search`], wire types in [`types`].

pub mod search;
pub mod types;


pub use search::SearchResults;
pub use types::{Repo, SearchResponse};

use crate::config::{Config, SortKey, SortOrder};
use crate::error::{Error, Result};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK};
use tracing::debug;
use url::Url;

use types::ApiErrorBody;

/// Media type sent in the `Accept` header for all API requests.
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// User-Agent header value. GitHub rejects requests without one.
const USER_AGENT: &str = concat!("repo-export/", env!("CARGO_PKG_VERSION"));

/// Authenticated GitHub API client.
///
/// Cheap to construct; holds no connection state beyond the underlying
/// `reqwest` connection pool.
pub struct GithubClient {
    http: reqwest::Client,
    base: Url,
    token: String,
    per_page: u32,
}

impl GithubClient {
    /// Creates a client from the run configuration.
    ///
    /// No network activity happens here; credentials are only validated
    /// by the API once a request is made.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the underlying HTTP client cannot
    /// be built.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base: config.api_base.clone(),
            token: config.token.clone(),
            per_page: config.per_page,
        })
    }

    /// Returns a lazy, ordered sequence of repositories matching
    /// `language:<language>`, sorted per the given criteria.
    ///
    /// No request is sent until the sequence is first polled; remote
    /// failures surface from [`SearchResults::try_next`], not here.
    pub fn search_repositories(
        &self,
        language: &str,
        sort: SortKey,
        order: SortOrder,
    ) -> SearchResults<'_> {
        SearchResults::new(self, format!("language:{language}"), sort, order, self.per_page)
    }

    /// Returns the total number of contributors to `full_name`.
    ///
    /// Derived from a single `per_page=1` request: the `rel="last"` page
    /// number in the `Link` header equals the contributor count, so the
    /// contributor list is never walked regardless of its size. An
    /// empty repository answers 204 (count 0); a repository with a
    /// single contributor has no `Link` header and the count is the
    /// length of the returned page.
    ///
    /// # Errors
    ///
    /// Returns a remote-service error if the repository is gone
    /// ([`Error::NotFound`]) or the token cannot read its contributor
    /// list ([`Error::PermissionDenied`]).
    pub async fn contributor_count(&self, full_name: &str) -> Result<u64> {
        let path = format!("repos/{full_name}/contributors");
        let response = self
            .get(&path, &[("per_page", "1".to_string()), ("anon", "false".to_string())])
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(0);
        }

        if let Some(count) = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_last_page)
        {
            debug!(repo = full_name, count, "contributor count from Link header");
            return Ok(count);
        }

        let contributors: Vec<serde_json::Value> = response.json().await?;
        Ok(contributors.len() as u64)
    }

    /// Sends an authenticated GET request for `path` (relative to the
    /// base URL) and maps non-success statuses to error variants.
    pub(crate) async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response> {
        let url = self.base.join(path)?;
        debug!(%url, "GET");

        let response = self
            .http
            .get(url)
            .query(query)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Converts non-success responses into the matching error variant,
    /// pulling the message out of the JSON error body when possible.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // The rate-limit header must be read before the body consumes
        // the response.
        let rate_limit_depleted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|remaining| remaining == "0");

        let message = response
            .json::<ApiErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.to_string());

        Err(match status {
            StatusCode::UNAUTHORIZED => Error::AuthRejected(message),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate_limit_depleted => {
                Error::RateLimited(message)
            }
            StatusCode::FORBIDDEN => Error::PermissionDenied(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

/// Extracts the `rel="last"` page number from a `Link` header.
///
/// Link headers look like:
/// `<https://api.github.com/repos/o/r/contributors?per_page=1&page=2>; rel="next", <...&page=347>; rel="last"`
fn parse_last_page(link_header: &str) -> Option<u64> {
    for part in link_header.split(',') {
        let part = part.trim();

        let mut url = None;
        let mut rel = None;
        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                rel = Some(value.trim_matches('"'));
            }
        }

        if rel == Some("last")
            && let Some(url) = url
            && let Some(page) = extract_page_param(url)
        {
            return Some(page);
        }
    }
    None
}

/// Extracts the `page` query parameter from a URL.
fn extract_page_param(url: &str) -> Option<u64> {
    let query = &url[url.find('?')? + 1..];
    for param in query.split('&') {
        if let Some(value) = param.strip_prefix("page=") {
            return value.parse().ok();
        }
    }
    None
}
