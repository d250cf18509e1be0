//! Boundary to the remote translation API
//!
//! The translators expose two capabilities: reading stored translations and
//! submitting new translation requests. [`TranslationApi`] is the awaitable
//! form the client works against. [`CallbackApi`] is the raw callback form of
//! the remote API, adapted by [`CallbackBridge`].

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Fetched, RequestOutcome};

/// Awaitable access to the translation API
#[async_trait]
pub trait TranslationApi: Send + Sync + Debug {
    /// Fetch a stored translation.
    ///
    /// Fails with [`TranslationError::NotAvailable`] if the translation is not
    /// in storage yet, or [`TranslationError::Untranslatable`] if it never will be.
    async fn fetch(&self, text: &str) -> Result<Fetched>;

    /// Ask the translators to translate `text` and put it into storage.
    ///
    /// Unreliable. Must not be called for text that is already stored.
    async fn request(&self, text: &str) -> RequestOutcome;
}

#[async_trait]
impl<T: TranslationApi + ?Sized> TranslationApi for Arc<T> {
    async fn fetch(&self, text: &str) -> Result<Fetched> {
        (**self).fetch(text).await
    }

    async fn request(&self, text: &str) -> RequestOutcome {
        (**self).request(text).await
    }
}

/// Completion callback for a submission; receives the error on failure
pub type RequestCallback = Box<dyn FnOnce(Option<TranslationError>) + Send + 'static>;

/// Translation API whose submission reports back through a callback
#[async_trait]
pub trait CallbackApi: Send + Sync + Debug {
    /// Fetch a stored translation
    async fn fetch(&self, text: &str) -> Result<Fetched>;

    /// Submit `text` for translation; `done` is invoked once on completion
    fn request(&self, text: &str, done: RequestCallback);
}

/// Adapts a [`CallbackApi`] into a [`TranslationApi`]
#[derive(Debug, Clone)]
pub struct CallbackBridge<C> {
    inner: C,
}

impl<C: CallbackApi> CallbackBridge<C> {
    /// Wrap a callback-style API
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// The wrapped API
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: CallbackApi> TranslationApi for CallbackBridge<C> {
    async fn fetch(&self, text: &str) -> Result<Fetched> {
        self.inner.fetch(text).await
    }

    async fn request(&self, text: &str) -> RequestOutcome {
        let (tx, rx) = oneshot::channel();

        self.inner.request(
            text,
            Box::new(move |error: Option<TranslationError>| {
                // Receiver gone means the caller stopped waiting
                let _ = tx.send(error);
            }),
        );

        match rx.await {
            Ok(None) => Ok(()),
            Ok(Some(error)) => Err(error),
            Err(_) => Err(TranslationError::RequestFailed {
                message: format!("request callback for '{}' was never invoked", text),
            }),
        }
    }
}
