//! In-memory simulation of the storage-backed translation API

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::core::api::TranslationApi;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Catalog, Fetched, RequestLogEntry, RequestOutcome, TranslationRecord};

/// Mutable state behind the simulated API
#[derive(Debug, Default)]
struct SpaceState {
    stored: HashMap<String, TranslationRecord>,
    pending: HashMap<String, TranslationRecord>,
    /// Submissions still scheduled to fail, per text
    scheduled_failures: HashMap<String, u32>,
    /// Every n-th submission fails, if set
    fail_every: Option<usize>,
    fetch_counts: HashMap<String, usize>,
    request_counts: HashMap<String, usize>,
    total_requests: usize,
    request_log: Vec<RequestLogEntry>,
    locked_out: bool,
}

/// Simulated translation API with storage satellites and fickle translators
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct SpaceApi {
    state: Arc<RwLock<SpaceState>>,
}

/// Seeds a [`SpaceApi`] before it is shared
#[derive(Debug, Default)]
pub struct SpaceApiBuilder {
    state: SpaceState,
}

impl SpaceApiBuilder {
    /// Add a translation that can be fetched right away
    pub fn with_stored(mut self, text: &str, translation: &str, quality: u32) -> Self {
        self.state
            .stored
            .insert(text.to_string(), TranslationRecord::new(text, translation, quality));
        self
    }

    /// Add a translation that exists but has to be requested first
    pub fn with_pending(mut self, text: &str, translation: &str, quality: u32) -> Self {
        self.state
            .pending
            .insert(text.to_string(), TranslationRecord::new(text, translation, quality));
        self
    }

    /// Make every n-th submission fail; 0 disables
    pub fn with_fail_every(mut self, n: usize) -> Self {
        self.state.fail_every = if n == 0 { None } else { Some(n) };
        self
    }

    /// Finish seeding
    pub fn build(self) -> SpaceApi {
        SpaceApi {
            state: Arc::new(RwLock::new(self.state)),
        }
    }
}

impl From<Catalog> for SpaceApiBuilder {
    fn from(catalog: Catalog) -> Self {
        let state = SpaceState {
            stored: catalog
                .stored
                .into_iter()
                .map(|r| (r.text.clone(), r))
                .collect(),
            pending: catalog
                .pending
                .into_iter()
                .map(|r| (r.text.clone(), r))
                .collect(),
            ..Default::default()
        };

        Self { state }
    }
}

impl SpaceApi {
    /// Create an empty API where every text is untranslatable
    pub fn new() -> Self {
        Self::default()
    }

    /// Start seeding an empty API
    pub fn builder() -> SpaceApiBuilder {
        SpaceApiBuilder::default()
    }

    /// Create an API seeded from a catalog
    pub fn from_catalog(catalog: Catalog) -> Self {
        let builder = SpaceApiBuilder::from(catalog);

        info!(
            "Loaded catalog: {} stored, {} pending",
            builder.state.stored.len(),
            builder.state.pending.len()
        );

        builder.build()
    }

    /// Create an API seeded from a JSON or YAML catalog file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_catalog(Catalog::from_file(path)?))
    }

    /// Make the next `n` submissions for `text` fail
    pub async fn fail_next_requests(&self, text: &str, n: u32) {
        let mut state = self.state.write().await;
        *state.scheduled_failures.entry(text.to_string()).or_default() += n;
    }

    /// Number of fetches seen for `text`
    pub async fn fetch_count(&self, text: &str) -> usize {
        let state = self.state.read().await;
        state.fetch_counts.get(text).copied().unwrap_or(0)
    }

    /// Number of submissions seen for `text`
    pub async fn request_count(&self, text: &str) -> usize {
        let state = self.state.read().await;
        state.request_counts.get(text).copied().unwrap_or(0)
    }

    /// All submissions seen so far, oldest first
    pub async fn request_log(&self) -> Vec<RequestLogEntry> {
        self.state.read().await.request_log.clone()
    }

    /// Whether this client has been kicked out
    pub async fn is_locked_out(&self) -> bool {
        self.state.read().await.locked_out
    }

    /// Snapshot of everything currently in storage
    pub async fn stored(&self) -> Vec<TranslationRecord> {
        let state = self.state.read().await;
        let mut records: Vec<_> = state.stored.values().cloned().collect();
        records.sort_by(|a, b| a.text.cmp(&b.text));
        records
    }

    fn submit(state: &mut SpaceState, text: &str) -> RequestOutcome {
        if state.locked_out {
            return Err(TranslationError::AbusiveClient);
        }

        if state.stored.contains_key(text) {
            warn!("Redundant request for '{}', locking client out", text);
            state.locked_out = true;
            return Err(TranslationError::AbusiveClient);
        }

        if !state.pending.contains_key(text) {
            return Err(TranslationError::Untranslatable {
                text: text.to_string(),
            });
        }

        if let Some(remaining) = state.scheduled_failures.get_mut(text) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TranslationError::RequestFailed {
                    message: "the translators failed to teleport in".to_string(),
                });
            }
        }

        if let Some(n) = state.fail_every {
            if state.total_requests % n == 0 {
                return Err(TranslationError::RequestFailed {
                    message: "the translators are on a coffee break".to_string(),
                });
            }
        }

        if let Some(record) = state.pending.remove(text) {
            state.stored.insert(text.to_string(), record);
        }

        Ok(())
    }
}

#[async_trait]
impl TranslationApi for SpaceApi {
    async fn fetch(&self, text: &str) -> Result<Fetched> {
        let mut state = self.state.write().await;
        *state.fetch_counts.entry(text.to_string()).or_default() += 1;

        if state.locked_out {
            return Err(TranslationError::AbusiveClient);
        }

        if let Some(record) = state.stored.get(text) {
            debug!("Fetched '{}' from storage", text);
            return Ok(record.fetched());
        }

        if state.pending.contains_key(text) {
            return Err(TranslationError::NotAvailable {
                text: text.to_string(),
            });
        }

        Err(TranslationError::Untranslatable {
            text: text.to_string(),
        })
    }

    async fn request(&self, text: &str) -> RequestOutcome {
        let mut state = self.state.write().await;
        *state.request_counts.entry(text.to_string()).or_default() += 1;
        state.total_requests += 1;

        let outcome = Self::submit(&mut state, text);

        state.request_log.push(RequestLogEntry {
            text: text.to_string(),
            at: Utc::now(),
            error: outcome.as_ref().err().map(|e| e.to_string()),
        });

        match &outcome {
            Ok(()) => debug!("Translators stored '{}'", text),
            Err(e) => debug!("Request for '{}' failed: {}", text, e),
        }

        outcome
    }
}
