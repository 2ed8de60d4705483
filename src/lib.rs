//! scrolldepth - scroll-depth telemetry service
//!
//! An embeddable tracking script reports how far visitors scroll; the server
//! validates and stores each event and derives engagement analytics for an
//! owner-scoped dashboard API.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Tracker management and stats from the command line
//!
//! # Architecture
//! - `analytics`: Pure aggregation over loaded events
//! - `api`: HTTP handlers and middleware
//! - `config`: Static configuration (TOML + `SD__*` environment)
//! - `interfaces`: CLI commands
//! - `runtime`: Startup, shutdown and execution modes
//! - `services`: Ingestion, tracker management, dashboard queries
//! - `storage`: SeaORM-backed persistence
//! - `system`: Logging

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
