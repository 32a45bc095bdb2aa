//! Lazy paginated repository search
//!
//! [`SearchResults`] pulls pages of `GET /search/repositories` on
//! demand: a page is fetched only when the caller asks for a record the
//! buffer cannot satisfy. The sequence is ordered (remote sort order is
//! preserved), finite, forward-only, and not restartable.

use super::GithubClient;
use super::types::{Repo, SearchResponse};
use crate::config::{SortKey, SortOrder};
use crate::error::Result;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Lazy handle over the paginated results of one repository search.
///
/// Constructed by [`GithubClient::search_repositories`]; performs no
/// network activity until [`try_next`](Self::try_next) is first called.
pub struct SearchResults<'a> {
    client: &'a GithubClient,
    query: String,
    sort: SortKey,
    order: SortOrder,
    per_page: u32,
    /// Next page to request, 1-based
    page: u32,
    /// Records fetched but not yet yielded
    buffer: VecDeque<Repo>,
    /// Remote total, known after the first page fetch
    total_count: Option<u64>,
    exhausted: bool,
}

impl<'a> SearchResults<'a> {
    pub(crate) fn new(
        client: &'a GithubClient,
        query: String,
        sort: SortKey,
        order: SortOrder,
        per_page: u32,
    ) -> Self {
        Self {
            client,
            query,
            sort,
            order,
            per_page,
            page: 1,
            buffer: VecDeque::new(),
            total_count: None,
            exhausted: false,
        }
    }

    /// Yields the next repository, fetching the next page if the buffer
    /// is empty. Returns `Ok(None)` once the remote result set is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Surfaces any remote-service or network error raised by the page
    /// fetch; the sequence should not be polled again after an error.
    pub async fn try_next(&mut self) -> Result<Option<Repo>> {
        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_next_page().await?;
        }
        Ok(self.buffer.pop_front())
    }

    /// Total number of repositories matching the query, as reported by
    /// the API. `None` until the first page has been fetched.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        let response = self
            .client
            .get(
                "search/repositories",
                &[
                    ("q", self.query.clone()),
                    ("sort", self.sort.as_str().to_string()),
                    ("order", self.order.as_str().to_string()),
                    ("per_page", self.per_page.to_string()),
                    ("page", self.page.to_string()),
                ],
            )
            .await?;

        let body: SearchResponse = response.json().await?;

        if body.incomplete_results {
            warn!(
                query = %self.query,
                page = self.page,
                "search timed out server-side; results for this page are partial"
            );
        }

        debug!(
            query = %self.query,
            page = self.page,
            count = body.items.len(),
            total = body.total_count,
            "fetched search page"
        );

        self.total_count = Some(body.total_count);
        // A short or empty page means the remote result set ends here.
        if (body.items.len() as u32) < self.per_page {
            self.exhausted = true;
        }
        self.buffer.extend(body.items);
        self.page += 1;
        Ok(())
    }
}
