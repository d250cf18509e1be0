//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Translation exists but has not been added to API storage yet
    #[error("Not yet translated: {text}")]
    NotAvailable {
        /// Text that was looked up
        text: String,
    },

    /// Text cannot be translated at all
    #[error("Untranslatable: {text}")]
    Untranslatable {
        /// Text that was looked up
        text: String,
    },

    /// Batch translation called without any texts
    #[error("Requested a batch translation, but there are no texts in the batch.")]
    BatchIsEmpty,

    /// Translation was found but its quality is too low
    #[error("The translation of {text} does not meet the requested quality threshold.")]
    QualityThresholdNotMet {
        /// Text whose translation was rejected
        text: String,
    },

    /// Submission to the translators failed
    #[error("Translation request failed: {message}")]
    RequestFailed {
        /// Failure reported by the API
        message: String,
    },

    /// The API locked this client out after a redundant request
    #[error("Abusive client: translation was requested although it was already available")]
    AbusiveClient,

    /// Premium lookup gave up after too many fetch/request cycles
    #[error("Translation of {text} still unavailable after {cycles} cycles")]
    PremiumRetriesExhausted {
        /// Text that never became available
        text: String,
        /// Number of fetch cycles performed
        cycles: u32,
    },

    /// API request failed with an unrecognised status
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Body or message returned by the API
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        /// Transport failure description
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        /// What could not be decoded
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong with the configuration
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl TranslationError {
    /// Whether submitting again may succeed.
    ///
    /// Only transient submission and transport failures qualify. A locked-out
    /// client stays locked out, and lookup failures do not change by asking twice.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TranslationError::RequestFailed { .. }
                | TranslationError::NetworkError { .. }
                | TranslationError::ApiError { .. }
        )
    }

    /// Stable machine-readable code used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            TranslationError::NotAvailable { .. } => "not_available",
            TranslationError::Untranslatable { .. } => "untranslatable",
            TranslationError::BatchIsEmpty => "batch_is_empty",
            TranslationError::QualityThresholdNotMet { .. } => "quality_threshold_not_met",
            TranslationError::RequestFailed { .. } => "request_failed",
            TranslationError::AbusiveClient => "abusive_client",
            TranslationError::PremiumRetriesExhausted { .. } => "premium_retries_exhausted",
            TranslationError::ApiError { .. } => "api_error",
            TranslationError::NetworkError { .. } | TranslationError::HttpError(_) => {
                "network_error"
            }
            TranslationError::InvalidResponseError { .. }
            | TranslationError::JsonError(_)
            | TranslationError::YamlError(_) => "invalid_response",
            TranslationError::ConfigError { .. } => "config_error",
            TranslationError::InternalError(_) | TranslationError::IoError(_) => "internal_error",
        }
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TranslationError::QualityThresholdNotMet {
            text: "jIyaj".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "The translation of jIyaj does not meet the requested quality threshold."
        );
        assert_eq!(
            TranslationError::BatchIsEmpty.to_string(),
            "Requested a batch translation, but there are no texts in the batch."
        );
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(TranslationError::RequestFailed {
            message: "teleporter jammed".to_string()
        }
        .is_retryable());
        assert!(!TranslationError::AbusiveClient.is_retryable());
        assert!(!TranslationError::Untranslatable {
            text: "x".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(
            TranslationError::NotAvailable {
                text: "x".to_string()
            }
            .code(),
            "not_available"
        );
        assert_eq!(TranslationError::AbusiveClient.code(), "abusive_client");
    }
}
