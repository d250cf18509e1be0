//! Core translation engine module

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod storage;
