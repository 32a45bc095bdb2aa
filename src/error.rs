//! Error types for repo-export
//!
//! Every failure in the export pipeline propagates through the [`Error`]
//! enum; nothing is caught and suppressed. The variants follow the three
//! failure classes of the pipeline: configuration errors (raised before
//! any network activity), remote-service errors (never retried), and
//! local I/O errors.

use thiserror::Error;

/// Result type alias for repo-export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for repo-export
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "language")
        key: Option<String>,
    },

    /// The API rejected the provided credentials (HTTP 401)
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// The API rate limit has been exhausted (HTTP 403/429 with a
    /// depleted `x-ratelimit-remaining` header)
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// The token lacks permission for the requested resource (HTTP 403)
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The requested resource does not exist (HTTP 404), e.g. a
    /// repository deleted between search and extraction
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success response from the API
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code returned by the API
        status: u16,
        /// Message from the API error body, or the status line if the
        /// body could not be parsed
        message: String,
    },

    /// Network error (connection, TLS, body decoding)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A request URL could not be constructed from the configured base
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// CSV serialization or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (destination unwritable, disk failure)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True if this error was raised before any network activity.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. })
    }
}
