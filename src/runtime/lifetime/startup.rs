use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analytics::CountryLookup;
use crate::config::get_config;
use crate::services::{DashboardService, GeoIpProvider, IngestService, TrackerService};
use crate::storage::{SeaOrmStorage, StorageFactory};

/// 短于该长度的 key 在启动时告警
const MIN_KEY_LENGTH: usize = 16;

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub ingest: Arc<IngestService>,
    pub trackers: Arc<TrackerService>,
    pub dashboard: Arc<DashboardService>,
    pub route_config: RouteConfig,
}

#[derive(Clone, Debug)]
pub struct RouteConfig {
    pub api_prefix: String,
    pub health_prefix: String,
}

/// 由存储构建各服务（CLI 也复用这一步）
pub fn build_services(
    storage: Arc<SeaOrmStorage>,
) -> (Arc<IngestService>, Arc<TrackerService>, Arc<DashboardService>) {
    let config = get_config();
    let lookup: Arc<dyn CountryLookup> = GeoIpProvider::from_config(&config.analytics);
    info!("Country lookup: {}", lookup.name());

    let ingest = Arc::new(IngestService::new(storage.clone()));
    let trackers = Arc::new(TrackerService::new(storage.clone()));
    let dashboard = Arc::new(DashboardService::new(storage, lookup, &config.dashboard));
    (ingest, trackers, dashboard)
}

/// 准备服务器启动的上下文：存储、服务与路由配置
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let (ingest, trackers, dashboard) = build_services(storage.clone());

    let config = get_config();
    let route_config = RouteConfig {
        api_prefix: config.routes.api_prefix.clone(),
        health_prefix: config.routes.health_prefix.clone(),
    };

    check_component_enabled(&route_config);

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        ingest,
        trackers,
        dashboard,
        route_config,
    })
}

fn check_component_enabled(route_config: &RouteConfig) {
    let config = get_config();

    let public_key = &config.auth.public_key;
    if public_key.is_empty() {
        info!("Dashboard API is disabled (auth.public_key not set)");
    } else {
        if public_key.len() < MIN_KEY_LENGTH {
            warn!("WARNING: auth.public_key is very short. Consider using a stronger key.");
        }
        info!("Dashboard API available at: {}", route_config.api_prefix);
    }

    let service_key = &config.auth.service_key;
    if service_key.is_empty() {
        info!("Full health check is disabled (auth.service_key not set)");
    } else {
        if service_key.len() < MIN_KEY_LENGTH {
            warn!("WARNING: auth.service_key is very short. Consider using a stronger key.");
        }
        info!("Health API available at: {}", route_config.health_prefix);
    }

    if !service_key.is_empty() && service_key == public_key {
        warn!("WARNING: auth.service_key equals auth.public_key; the privileged key is exposed to dashboard clients.");
    }

    match &config.tracking.public_url {
        Some(url) => info!("Tracking script reports to {}/track", url.trim_end_matches('/')),
        None => info!("Tracking endpoint derived from request host (tracking.public_url not set)"),
    }

    if config.tracking.rate_limit.enabled {
        warn!(
            "Tracking rate limit enabled ({}s per request, burst {}); counters are per instance",
            config.tracking.rate_limit.seconds_per_request, config.tracking.rate_limit.burst_size
        );
    }
}
