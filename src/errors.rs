use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("API request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("failed to parse JSON response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Fatal outcomes of a refresh. Either one leaves the stored table as it was.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("active pairs unavailable: {0}")]
    UpstreamUnavailable(#[source] ExchangeError),

    #[error("storage commit failed: {0}")]
    CommitFailed(#[from] sqlx::Error),
}
