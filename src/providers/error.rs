//! Provider error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The provider answered, but the payload does not match the expected
    /// shape. For structured opinion calls this counts as a failure of the
    /// one respondent being queried, never of the batch.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            ProviderError::Unreachable(error.to_string())
        } else {
            ProviderError::RequestFailed(error.to_string())
        }
    }
}
