use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure or timeout. Nothing was learned; safe to retry later.
    #[error("provider unreachable: {0}")]
    Network(String),

    #[error("provider rejected the request with HTTP {status}: {body}")]
    UpstreamRejected { status: u16, body: String },

    #[error("provider response could not be parsed: {0}")]
    ResponseUnparseable(String),

    #[error("provider response failed authenticity check: {0}")]
    Authenticity(String),

    #[error("provider gateway misconfigured: {0}")]
    Config(String),
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Network(_))
    }
}
