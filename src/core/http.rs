//! HTTP access to a remote translation API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::core::api::TranslationApi;
use crate::core::config::ServiceConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Fetched, RequestOutcome};

/// Query for a stored translation
#[derive(Debug, Serialize, Deserialize)]
pub struct FetchQuery {
    /// Text to look up
    pub text: String,
}

/// Body of a translation request
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitBody {
    /// Text to translate
    pub text: String,
}

/// Reply to an accepted translation request
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReply {
    /// Always `accepted`
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// What went wrong
    pub error: ErrorDetail,
}

/// Error payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable message
    pub message: String,
    /// Machine-readable kind, see [`TranslationError::code`]
    pub code: String,
}

impl ErrorResponse {
    /// Wire form of an error
    pub fn from_error(err: &TranslationError) -> Self {
        Self {
            error: ErrorDetail {
                message: err.to_string(),
                code: err.code().to_string(),
            },
        }
    }

    /// Turn a wire error back into the error kind it was produced from
    pub fn into_error(self, status: u16, text: &str) -> TranslationError {
        match self.error.code.as_str() {
            "not_available" => TranslationError::NotAvailable {
                text: text.to_string(),
            },
            "untranslatable" => TranslationError::Untranslatable {
                text: text.to_string(),
            },
            "abusive_client" => TranslationError::AbusiveClient,
            "request_failed" => TranslationError::RequestFailed {
                message: self.error.message,
            },
            _ => TranslationError::ApiError {
                status,
                message: self.error.message,
            },
        }
    }
}

/// Translation API reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpApi {
    /// Create a client for the API at `endpoint`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create from the service configuration
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let endpoint = config
            .api_endpoint
            .clone()
            .ok_or_else(|| TranslationError::ConfigError {
                message: "api_endpoint is required for the HTTP API".to_string(),
            })?;

        Self::new(endpoint, Duration::from_millis(config.timeout_ms))
    }

    /// Base URL requests go to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn error_from(response: reqwest::Response, text: &str) -> TranslationError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => error.into_error(status, text),
            Err(_) => TranslationError::ApiError {
                status,
                message: body,
            },
        }
    }
}

#[async_trait]
impl TranslationApi for HttpApi {
    async fn fetch(&self, text: &str) -> Result<Fetched> {
        debug!("GET {}/v1/translations for '{}'", self.endpoint, text);

        let response = self
            .client
            .get(format!("{}/v1/translations", self.endpoint))
            .query(&FetchQuery {
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, text).await);
        }

        response
            .json::<Fetched>()
            .await
            .map_err(|e| TranslationError::InvalidResponseError {
                message: e.to_string(),
            })
    }

    async fn request(&self, text: &str) -> RequestOutcome {
        debug!("POST {}/v1/requests for '{}'", self.endpoint, text);

        let response = self
            .client
            .post(format!("{}/v1/requests", self.endpoint))
            .json(&SubmitBody {
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response, text).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_error_round_trip() {
        let wire = ErrorResponse::from_error(&TranslationError::Untranslatable {
            text: "gIyaj".to_string(),
        });
        assert_eq!(wire.error.code, "untranslatable");

        let err = wire.into_error(422, "gIyaj");
        assert!(matches!(err, TranslationError::Untranslatable { ref text } if text == "gIyaj"));
    }

    #[test]
    fn test_unknown_wire_code() {
        let wire = ErrorResponse {
            error: ErrorDetail {
                message: "boom".to_string(),
                code: "teleporter_meltdown".to_string(),
            },
        };

        assert!(matches!(
            wire.into_error(500, "x"),
            TranslationError::ApiError { status: 500, .. }
        ));
    }

    #[test]
    fn test_from_config_requires_endpoint() {
        let config = ServiceConfig::default();
        assert!(matches!(
            HttpApi::from_config(&config),
            Err(TranslationError::ConfigError { .. })
        ));

        let config = ServiceConfig {
            api_endpoint: Some("http://127.0.0.1:8000/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            HttpApi::from_config(&config).unwrap().endpoint(),
            "http://127.0.0.1:8000"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let api = HttpApi::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        assert!(matches!(
            api.fetch("jIyaj").await,
            Err(TranslationError::NetworkError { .. })
        ));
    }
}
