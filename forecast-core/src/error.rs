use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by [`ForecastClient`](crate::ForecastClient).
#[derive(Debug, Error)]
pub enum ForecastError {
    /// No API key was loaded when the client was constructed.
    #[error(
        "No API key available (looked in '{}').\n\
         Hint: put your API key into that file and try again.",
        .path.display()
    )]
    CredentialMissing { path: PathBuf },

    /// The provider answered with a non-success status.
    #[error("Forecast request failed with status {status}: {}", .body.as_deref().unwrap_or("<empty body>"))]
    RequestFailed { status: u16, body: Option<String> },

    /// The request did not complete within the configured timeout.
    #[error("Forecast request timed out after {secs} seconds")]
    Timeout { secs: u64 },

    /// Connection-level failure (DNS, TLS, refused connection, broken body stream).
    #[error("Failed to reach forecast provider: {0}")]
    Transport(#[source] reqwest::Error),

    /// Body was not JSON, or not shaped like `{ days: [ { hours: [..] } ] }`.
    #[error("Unexpected forecast response: {0}")]
    ResponseFormat(String),

    /// `base_url` is not an absolute URL that can take path segments.
    #[error("Invalid forecast endpoint {0}")]
    InvalidUrl(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// The HTTP client itself could not be built.
    #[error("Failed to initialize HTTP client: {0}")]
    Client(String),
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::ResponseFormat(format!("body is not valid JSON: {err}"))
    }
}

impl ForecastError {
    /// Classify a reqwest failure, keeping timeouts apart from other transport errors.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ForecastError::Timeout { secs: timeout_secs }
        } else {
            ForecastError::Transport(err)
        }
    }
}
