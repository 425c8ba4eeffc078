use thiserror::Error;

/// Yandex Cloud errors that can occur during API operations.
///
/// SECURITY: Error messages must NEVER contain the IAM token.
#[derive(Debug, Error)]
pub enum YandexError {
    /// Authentication failed (invalid or expired IAM token)
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-level error (connection failed, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("cluster not found: '{cluster_id}'")]
    ClusterNotFound { cluster_id: String },

    #[error("invalid host '{fqdn}': {message}")]
    InvalidHost { fqdn: String, message: String },
}

impl From<YandexError> for crate::providers::ProviderError {
    fn from(err: YandexError) -> Self {
        crate::providers::ProviderError::Yandex(err.to_string())
    }
}
