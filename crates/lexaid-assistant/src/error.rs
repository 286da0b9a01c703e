//! Error types for the assistant crate

use thiserror::Error;

/// Errors that can occur when talking to a generative model provider
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ProviderError {
    /// Resource not found by ID or name
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication failed (never includes key details)
    #[error("Authentication failed")]
    AuthError,

    /// Rate limited by provider
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Network error occurred
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Generic provider error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid model specified
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Model not available in provider
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ProviderError {
    /// Whether the error means the requested model id is unknown or unsupported
    pub fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            ProviderError::ModelNotAvailable(_) | ProviderError::InvalidModel(_)
        )
    }

    /// Whether the error is a credential/configuration problem no other model can fix
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProviderError::ConfigError(_) | ProviderError::AuthError)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ProviderError {
    fn from(err: serde_yaml::Error) -> Self {
        ProviderError::ConfigError(format!("Failed to parse config file: {}", err))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // Drop the URL so nothing request-specific leaks into messages
        let err = err.without_url();
        if err.is_timeout() {
            ProviderError::ProviderError("Request timeout".to_string())
        } else if err.is_connect() {
            ProviderError::NetworkError(err.to_string())
        } else if err.is_decode() {
            ProviderError::ParseError(err.to_string())
        } else {
            ProviderError::ProviderError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_unavailable_classification() {
        assert!(ProviderError::ModelNotAvailable("gemini-x".into()).is_model_unavailable());
        assert!(ProviderError::InvalidModel("gemini-x".into()).is_model_unavailable());
        assert!(!ProviderError::RateLimited(60).is_model_unavailable());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(ProviderError::AuthError.is_fatal());
        assert!(ProviderError::ConfigError("missing".into()).is_fatal());
        assert!(!ProviderError::NetworkError("reset".into()).is_fatal());
        assert!(!ProviderError::ModelNotAvailable("gemini-x".into()).is_fatal());
    }

    #[test]
    fn test_auth_error_message_has_no_details() {
        assert_eq!(ProviderError::AuthError.to_string(), "Authentication failed");
    }

    #[test]
    fn test_serde_json_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let converted = ProviderError::from(err);
        assert!(matches!(converted, ProviderError::SerializationError(_)));
    }
}
