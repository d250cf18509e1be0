//! Space Translator - tiered translation client library
//!
//! This library provides free, batch and premium access to an unreliable,
//! storage-backed translation API, with a simulated API and an HTTP server
//! for running it locally.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use self::core::{
    api::{CallbackApi, CallbackBridge, TranslationApi},
    client::TranslationService,
    config::ServiceConfig,
    errors::TranslationError,
    http::HttpApi,
    models::{Catalog, Fetched, TranslationRecord},
    storage::SpaceApi,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
