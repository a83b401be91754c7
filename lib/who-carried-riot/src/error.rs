use thiserror::Error;

/// Failure talking to the upstream provider. "Not found" is not an error:
/// sources return [`None`] or an empty list for it instead.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("rate limited at {endpoint}")]
    RateLimited { endpoint: &'static str },
    #[error("request to {endpoint} failed (status {status:?}): {message}")]
    Transport {
        endpoint: &'static str,
        status: Option<u16>,
        message: String,
    },
    #[error("unexpected response from {endpoint}: {source}")]
    Malformed {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl SourceError {
    pub fn endpoint(&self) -> &'static str {
        match self {
            SourceError::RateLimited { endpoint }
            | SourceError::Transport { endpoint, .. }
            | SourceError::Malformed { endpoint, .. } => endpoint,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SourceError::RateLimited { .. })
    }
}
