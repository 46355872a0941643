//! Errors raised while talking to the external providers

use thiserror::Error;

/// Boxed source error for transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when fetching data from a provider
///
/// Every failure a provider call can run into maps to exactly one variant,
/// so callers that want more than "no value" can tell them apart.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS or timeout failure before a response arrived
    #[error("HTTP request failed: {0}")]
    Transport(#[source] BoxError),

    /// A response arrived with a status code other than the expected one
    #[error("Unexpected status code {actual} (expected {expected})")]
    UnexpectedStatus { expected: &'static str, actual: u16 },

    /// A response arrived but its body is not the expected one
    #[error("Unexpected response body: {0:?}")]
    UnexpectedBody(String),

    /// The body could not be parsed into the expected structure
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A collection that must never be empty came back empty
    #[error("Provider returned an empty collection")]
    Empty,

    /// The provider answered with an explicit "no such entity"
    #[error("Not found")]
    NotFound,

    /// The provider returned records, none of which has the requested id
    #[error("Requested id {requested} but the provider returned {returned:?}")]
    Mismatch { requested: u64, returned: Vec<u64> },
}

impl FetchError {
    /// Whether this is the provider's explicit "not found" answer rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound)
    }
}

impl From<reqwest::Error> for FetchError {
    /// Drops the request URL, whose query string may carry an API key
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(Box::new(err.without_url()))
    }
}
