use thiserror::Error;

/// Errors surfaced by a provider adapter.
///
/// Every variant tied to a call carries the provider name so an aggregated
/// failure can say which backend broke.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderError {
    /// No API key was passed in and none is configured for the provider.
    #[error("{provider}: API key required")]
    MissingCredential { provider: String },

    /// The call did not finish inside the configured bound.
    #[error("{provider}: request timed out after {timeout_secs}s")]
    Timeout { provider: String, timeout_secs: u64 },

    /// The provider answered with a non-success status.
    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// Connection, TLS or protocol failure before a status was received.
    #[error("{provider}: HTTP request failed: {message}")]
    Transport { provider: String, message: String },

    /// A success status with a body that is not JSON.
    #[error("{provider}: invalid JSON response: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Adapter configuration is inconsistent.
    #[error("invalid provider config: {0}")]
    InvalidConfig(String),
}

impl ProviderError {
    /// Name of the provider the error came from, if it came from a call.
    pub fn provider(&self) -> Option<&str> {
        match self {
            ProviderError::MissingCredential { provider }
            | ProviderError::Timeout { provider, .. }
            | ProviderError::Status { provider, .. }
            | ProviderError::Transport { provider, .. }
            | ProviderError::InvalidResponse { provider, .. } => Some(provider),
            ProviderError::InvalidConfig(_) => None,
        }
    }

    /// Short machine-readable tag, used in logs, metrics and partial results.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::MissingCredential { .. } => "missing_credential",
            ProviderError::Timeout { .. } => "timeout",
            ProviderError::Status { .. } => "provider_error",
            ProviderError::Transport { .. } => "transport",
            ProviderError::InvalidResponse { .. } => "invalid_response",
            ProviderError::InvalidConfig(_) => "invalid_config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_carries_body() {
        let err = ProviderError::Status {
            provider: "mistral".into(),
            status: 503,
            body: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "mistral API error 503: overloaded");
        assert_eq!(err.provider(), Some("mistral"));
        assert_eq!(err.kind(), "provider_error");
    }

    #[test]
    fn config_error_has_no_provider() {
        let err = ProviderError::InvalidConfig("base_url empty".into());
        assert_eq!(err.provider(), None);
        assert_eq!(err.kind(), "invalid_config");
    }
}
