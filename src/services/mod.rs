//! Service layer for business logic
//!
//! Shared between the HTTP API and the CLI.

mod dashboard_service;
pub mod geoip;
pub mod ingest;
pub mod script;
mod tracker_service;

pub use dashboard_service::DashboardService;
pub use geoip::GeoIpProvider;
pub use ingest::{IngestService, TrackPayload, ValidatedEvent, ValidationFailure, ValidationIssue};
pub use tracker_service::{TRACKER_ID_LENGTH, TrackerService};
