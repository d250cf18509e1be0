//! Core data models for translation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::errors::{Result, TranslationError};

/// A translation held in API storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Source text
    pub text: String,
    /// Translated text
    pub translation: String,
    /// Quality score assigned by the translators
    pub quality: u32,
}

impl TranslationRecord {
    /// Create a record
    pub fn new(text: impl Into<String>, translation: impl Into<String>, quality: u32) -> Self {
        Self {
            text: text.into(),
            translation: translation.into(),
            quality,
        }
    }

    /// The part of the record returned by a fetch
    pub fn fetched(&self) -> Fetched {
        Fetched {
            translation: self.translation.clone(),
            quality: self.quality,
        }
    }
}

/// Result of fetching a translation from storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fetched {
    /// Translated text
    pub translation: String,
    /// Quality score assigned by the translators
    pub quality: u32,
}

impl Fetched {
    /// Check if quality reaches the given threshold
    pub fn meets(&self, minimum_quality: u32) -> bool {
        self.quality >= minimum_quality
    }
}

/// Outcome of a single submission attempt
pub type RequestOutcome = Result<()>;

/// Seed data for the simulated translation API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Translations available in storage right away
    #[serde(default)]
    pub stored: Vec<TranslationRecord>,
    /// Translations that exist but must be requested first
    #[serde(default)]
    pub pending: Vec<TranslationRecord>,
}

impl Catalog {
    /// Load a catalog from a JSON or YAML file, chosen by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            other => Err(TranslationError::ConfigError {
                message: format!(
                    "Unsupported catalog format {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                ),
            }),
        }
    }
}

/// One submission seen by the simulated API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    /// Text that was submitted
    pub text: String,
    /// When the submission arrived
    pub at: DateTime<Utc>,
    /// `None` when the submission succeeded
    pub error: Option<String>,
}

impl RequestLogEntry {
    /// Whether the submission was accepted
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}
