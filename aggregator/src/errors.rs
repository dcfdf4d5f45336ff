use thiserror::Error;

/// Reasons a single tag could not be resolved.
///
/// Payloads are plain strings so the error can be attached to an aggregation
/// result, cloned and compared.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("provider unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("could not decode post at index {index}: {reason}")]
    DecodeError { index: usize, reason: String },

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FetchError {
    /// Short stable name of the error kind, used as a metric and log field.
    pub const fn kind(&self) -> &'static str {
        match self {
            FetchError::RemoteUnavailable(_) => "remote_unavailable",
            FetchError::MalformedResponse(_) => "malformed_response",
            FetchError::DecodeError { .. } => "decode_error",
            FetchError::Timeout(_) => "timeout",
            FetchError::Internal(_) => "internal",
        }
    }
}

// Every transport failure, a client side timeout included, means the provider
// could not be reached. `Timeout` is reserved for the aggregator's own deadlines.
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::RemoteUnavailable(err.to_string())
    }
}
