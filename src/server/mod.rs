//! HTTP server for the simulated translation API

pub mod api;
