//! Tiered translation client with retry and quality gating

use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::api::TranslationApi;
use crate::core::config::ServiceConfig;
use crate::core::errors::{Result, TranslationError};

/// Translation service offering free, batch and premium access to the API
#[derive(Debug)]
pub struct TranslationService<A> {
    api: Arc<A>,
    config: Arc<ServiceConfig>,
}

impl<A> Clone for TranslationService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            config: Arc::clone(&self.config),
        }
    }
}

impl<A: TranslationApi> TranslationService<A> {
    /// Create a new translation service
    pub fn new(api: A, config: ServiceConfig) -> Result<Self> {
        Self::with_shared_api(Arc::new(api), config)
    }

    /// Create a service around an API that is also used elsewhere
    pub fn with_shared_api(api: Arc<A>, config: ServiceConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            api,
            config: Arc::new(config),
        })
    }

    /// The API this service talks to
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Active configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Fetch a translation from storage, whatever its quality.
    ///
    /// API errors are forwarded unchanged.
    pub async fn free(&self, text: &str) -> Result<String> {
        let fetched = self.api.fetch(text).await?;
        Ok(fetched.translation)
    }

    /// Translate every text with the free service.
    ///
    /// Translations come back in input order. The first failure aborts the
    /// batch; remaining texts are not fetched.
    pub async fn batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Err(TranslationError::BatchIsEmpty);
        }

        let mut translations = Vec::with_capacity(texts.len());
        for text in texts {
            translations.push(self.free(text.as_ref()).await?);
        }

        Ok(translations)
    }

    /// Request a translation, using the configured number of attempts
    pub async fn request(&self, text: &str) -> Result<()> {
        self.request_with_attempts(text, self.config.request_attempts)
            .await
    }

    /// Request a translation, calling the API at most `max_attempts` times.
    ///
    /// Resolves on the first accepted submission; otherwise fails with the
    /// last error received. Errors that another call cannot fix, such as a
    /// lockout or untranslatable text, are returned right away.
    pub async fn request_with_attempts(&self, text: &str, max_attempts: u32) -> Result<()> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("Request attempt {}/{} for '{}'", attempt, max_attempts, text);

            let error = match self.api.request(text).await {
                Ok(()) => {
                    if attempt > 1 {
                        info!("Request for '{}' accepted after {} attempts", text, attempt);
                    }
                    return Ok(());
                }
                Err(e) => e,
            };

            warn!("Request attempt {} for '{}' failed: {}", attempt, text, error);

            if !error.is_retryable() || attempt >= max_attempts {
                return Err(error);
            }

            let delay = self.config.retry_delay(attempt);
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }
    }

    /// Fetch a translation of at least `minimum_quality`.
    ///
    /// A translation that is not in storage yet is requested, then fetched
    /// again. Low quality is final. Gives up with
    /// [`TranslationError::PremiumRetriesExhausted`] once the configured
    /// number of fetch cycles has run.
    pub async fn premium(&self, text: &str, minimum_quality: u32) -> Result<String> {
        let max_cycles = self.config.premium_max_cycles;

        for cycle in 1..=max_cycles {
            match self.api.fetch(text).await {
                Ok(fetched) if fetched.meets(minimum_quality) => {
                    if cycle > 1 {
                        info!("Premium translation of '{}' ready after {} cycles", text, cycle);
                    }
                    return Ok(fetched.translation);
                }
                Ok(fetched) => {
                    debug!(
                        "Quality {} of '{}' below threshold {}",
                        fetched.quality, text, minimum_quality
                    );
                    return Err(TranslationError::QualityThresholdNotMet {
                        text: text.to_string(),
                    });
                }
                Err(TranslationError::NotAvailable { .. }) => {
                    if cycle == max_cycles {
                        break;
                    }
                    debug!("'{}' not in storage, requesting (cycle {})", text, cycle);
                    self.request(text).await?;

                    let delay = self.config.retry_delay(cycle);
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        warn!("Giving up on '{}' after {} cycles", text, max_cycles);
        Err(TranslationError::PremiumRetriesExhausted {
            text: text.to_string(),
            cycles: max_cycles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Fetched, RequestOutcome};
    use crate::core::storage::SpaceApi;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service(api: SpaceApi) -> TranslationService<SpaceApi> {
        TranslationService::new(api, ServiceConfig::immediate()).unwrap()
    }

    fn space() -> SpaceApi {
        SpaceApi::builder()
            .with_stored("jIyaj", "I understand.", 100)
            .with_stored("a", "A", 5)
            .with_stored("majQa'", "Well done!", 90)
            .with_pending("jIyajbe'", "I don't understand.", 80)
            .build()
    }

    /// Storage that never fills up, whatever is requested
    #[derive(Debug, Default)]
    struct Stubborn {
        fetches: AtomicUsize,
        requests: AtomicUsize,
    }

    #[async_trait]
    impl TranslationApi for Stubborn {
        async fn fetch(&self, text: &str) -> Result<Fetched> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Err(TranslationError::NotAvailable {
                text: text.to_string(),
            })
        }

        async fn request(&self, _text: &str) -> RequestOutcome {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Submission that fails every time, numbering its failures
    #[derive(Debug, Default)]
    struct Numbered {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl TranslationApi for Numbered {
        async fn fetch(&self, text: &str) -> Result<Fetched> {
            Err(TranslationError::NotAvailable {
                text: text.to_string(),
            })
        }

        async fn request(&self, _text: &str) -> RequestOutcome {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            Err(TranslationError::RequestFailed {
                message: format!("attempt {}", attempt),
            })
        }
    }

    #[tokio::test]
    async fn test_free_ignores_quality() {
        let service = service(space());
        assert_eq!(service.free("a").await.unwrap(), "A");
    }

    #[tokio::test]
    async fn test_free_forwards_errors() {
        let service = service(space());

        assert!(matches!(
            service.free("jIyajbe'").await,
            Err(TranslationError::NotAvailable { .. })
        ));
        assert!(matches!(
            service.free("gIyaj").await,
            Err(TranslationError::Untranslatable { .. })
        ));
    }

    #[tokio::test]
    async fn test_batch_in_order() {
        let service = service(space());
        let translations = service.batch(&["jIyaj", "majQa'"]).await.unwrap();
        assert_eq!(translations, vec!["I understand.", "Well done!"]);
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let api = space();
        let service = service(api.clone());
        let texts: Vec<String> = vec![];

        assert!(matches!(
            service.batch(&texts[..]).await,
            Err(TranslationError::BatchIsEmpty)
        ));
    }

    #[tokio::test]
    async fn test_batch_fails_fast_on_first_error() {
        let api = space();
        let service = service(api.clone());

        let err = service
            .batch(&["jIyaj", "jIyajbe'", "gIyaj", "majQa'"])
            .await
            .unwrap_err();

        assert!(matches!(err, TranslationError::NotAvailable { ref text } if text == "jIyajbe'"));
        assert_eq!(api.fetch_count("gIyaj").await, 0);
        assert_eq!(api.fetch_count("majQa'").await, 0);
    }

    #[tokio::test]
    async fn test_request_succeeds_after_retries() {
        let api = space();
        api.fail_next_requests("jIyajbe'", 2).await;
        let service = service(api.clone());

        service.request("jIyajbe'").await.unwrap();

        assert_eq!(api.request_count("jIyajbe'").await, 3);
        assert_eq!(service.free("jIyajbe'").await.unwrap(), "I don't understand.");
    }

    #[tokio::test]
    async fn test_request_gives_up_after_three_attempts() {
        let api = space();
        api.fail_next_requests("jIyajbe'", 5).await;
        let service = service(api.clone());

        let err = service.request("jIyajbe'").await.unwrap_err();

        assert!(matches!(err, TranslationError::RequestFailed { .. }));
        assert_eq!(api.request_count("jIyajbe'").await, 3);
        assert_eq!(api.request_log().await.len(), 3);
    }

    #[tokio::test]
    async fn test_request_returns_last_error() {
        let service = TranslationService::new(Numbered::default(), ServiceConfig::immediate()).unwrap();

        let err = service.request("jIyajbe'").await.unwrap_err();

        assert!(matches!(err, TranslationError::RequestFailed { ref message } if message == "attempt 3"));
        assert_eq!(service.api().attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_request_untranslatable_is_not_retried() {
        let api = space();
        let service = service(api.clone());

        let err = service.request("gIyaj").await.unwrap_err();

        assert!(matches!(err, TranslationError::Untranslatable { .. }));
        assert_eq!(api.request_count("gIyaj").await, 1);
    }

    #[tokio::test]
    async fn test_request_with_custom_attempts() {
        let api = space();
        api.fail_next_requests("jIyajbe'", 5).await;
        let service = service(api.clone());

        assert!(service.request_with_attempts("jIyajbe'", 1).await.is_err());
        assert_eq!(api.request_count("jIyajbe'").await, 1);
    }

    #[tokio::test]
    async fn test_request_does_not_retry_lockout() {
        let api = space();
        let service = service(api.clone());

        let err = service.request("jIyaj").await.unwrap_err();

        assert!(matches!(err, TranslationError::AbusiveClient));
        assert_eq!(api.request_count("jIyaj").await, 1);
    }

    #[tokio::test]
    async fn test_premium_quality_gate() {
        let api = space();
        let service = service(api.clone());

        assert_eq!(service.premium("a", 5).await.unwrap(), "A");
        assert!(matches!(
            service.premium("a", 6).await,
            Err(TranslationError::QualityThresholdNotMet { ref text }) if text == "a"
        ));

        // Available translations are never requested
        assert_eq!(api.request_count("a").await, 0);
        assert!(!api.is_locked_out().await);
    }

    #[tokio::test]
    async fn test_premium_requests_missing_translation() {
        let api = space();
        api.fail_next_requests("jIyajbe'", 1).await;
        let service = service(api.clone());

        let translation = service.premium("jIyajbe'", 50).await.unwrap();

        assert_eq!(translation, "I don't understand.");
        assert_eq!(api.fetch_count("jIyajbe'").await, 2);
        assert_eq!(api.request_count("jIyajbe'").await, 2);
    }

    #[tokio::test]
    async fn test_premium_low_quality_after_request() {
        let api = space();
        let service = service(api.clone());

        assert!(matches!(
            service.premium("jIyajbe'", 81).await,
            Err(TranslationError::QualityThresholdNotMet { .. })
        ));
        assert_eq!(api.request_count("jIyajbe'").await, 1);
    }

    #[tokio::test]
    async fn test_premium_untranslatable_is_not_requested() {
        let api = space();
        let service = service(api.clone());

        assert!(matches!(
            service.premium("gIyaj", 0).await,
            Err(TranslationError::Untranslatable { .. })
        ));
        assert_eq!(api.request_count("gIyaj").await, 0);
    }

    #[tokio::test]
    async fn test_premium_propagates_request_failure() {
        let api = space();
        api.fail_next_requests("jIyajbe'", 3).await;
        let service = service(api.clone());

        assert!(matches!(
            service.premium("jIyajbe'", 0).await,
            Err(TranslationError::RequestFailed { .. })
        ));
        assert_eq!(api.fetch_count("jIyajbe'").await, 1);
    }

    #[tokio::test]
    async fn test_premium_gives_up_after_max_cycles() {
        let config = ServiceConfig {
            premium_max_cycles: 4,
            ..ServiceConfig::immediate()
        };
        let service = TranslationService::new(Stubborn::default(), config).unwrap();

        let err = service.premium("Qapla'", 0).await.unwrap_err();

        assert!(matches!(
            err,
            TranslationError::PremiumRetriesExhausted { cycles: 4, .. }
        ));
        // One request between each pair of fetches
        assert_eq!(service.api().fetches.load(Ordering::SeqCst), 4);
        assert_eq!(service.api().requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = ServiceConfig {
            premium_max_cycles: 0,
            ..ServiceConfig::immediate()
        };
        assert!(TranslationService::new(space(), config).is_err());
    }

    #[tokio::test]
    async fn test_backoff_between_attempts() {
        tokio::time::pause();

        let api = space();
        api.fail_next_requests("jIyajbe'", 2).await;
        let config = ServiceConfig {
            retry_delay_ms: 1000,
            ..Default::default()
        };
        let service = TranslationService::new(api, config).unwrap();

        let start = tokio::time::Instant::now();
        service.request("jIyajbe'").await.unwrap();

        // 1s after the first failure, 2s after the second
        assert!(start.elapsed() >= std::time::Duration::from_millis(3000));
    }
}
