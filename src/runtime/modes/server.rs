//! Server mode
//!
//! 组装 HTTP 服务：公开的追踪端点、仪表盘 API 与健康检查。

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    http::{Method, header},
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{error, warn};

use crate::api::constants::OWNER_ID_HEADER;
use crate::api::middleware::{
    HealthAuth, OwnerAuth, RequestIdMiddleware, TimingMiddleware, TrackingCors,
    tracking_rate_limiter,
};
use crate::api::services::{
    AppStartTime, TrackLimits, health_routes, trackers_routes, tracking_routes,
};
use crate::config::CorsConfig;
use crate::runtime::lifetime;

const MAX_WORKERS: usize = 32;

/// 启动时校验仪表盘 CORS 配置（只执行一次）
fn validate_cors_config(cors: &CorsConfig) {
    if !cors.enabled {
        return;
    }

    if cors.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but cors.allowed_origins is empty. \
            No cross-origin dashboard requests will be allowed."
        );
    }

    let is_any_origin = cors.allowed_origins.iter().any(|o| o == "*");
    if is_any_origin && cors.allow_credentials {
        error!(
            "SECURITY WARNING: any origin + allow_credentials is refused for the dashboard API. \
            Credentials support has been disabled."
        );
    }
}

/// 仪表盘 API 的 CORS（只挂在 API scope 上）
fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    if !cors_config.enabled {
        return Cors::default();
    }

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");

    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allowed_header(OWNER_ID_HEADER)
        .max_age(cors_config.max_age as usize);

    if is_any_origin {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    if cors_config.allow_credentials && !is_any_origin {
        cors = cors.supports_credentials();
    }

    cors
}

/// Run the HTTP server
///
/// **Note**: logging must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| error!("Server startup failed: {:#}", e))?;

    let storage = startup.storage.clone();
    let ingest = startup.ingest.clone();
    let trackers = startup.trackers.clone();
    let dashboard = startup.dashboard.clone();
    let api_prefix = startup.route_config.api_prefix.clone();
    let health_prefix = startup.route_config.health_prefix.clone();

    let config = crate::config::get_config();
    let cpu_count = config.server.cpu_count.clamp(1, MAX_WORKERS);
    warn!("Using {} worker threads for the server", cpu_count);

    let cors_config = config.cors.clone();
    validate_cors_config(&cors_config);

    let tracking_cors = TrackingCors::from_config();
    let limiter = tracking_rate_limiter(&config.tracking);
    let track_limits = TrackLimits {
        payload_limit: config.tracking.payload_limit,
    };

    let db_for_shutdown = storage.get_db().clone();

    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&cors_config);
        let tracking_cors = tracking_cors.clone();
        let limiter = limiter.clone();

        App::new()
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(ingest.clone()))
            .app_data(web::Data::new(trackers.clone()))
            .app_data(web::Data::new(dashboard.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::Data::new(track_limits))
            .app_data(web::PayloadConfig::new(track_limits.payload_limit))
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(
                web::scope(&api_prefix)
                    .wrap(OwnerAuth)
                    .wrap(cors)
                    .service(trackers_routes()),
            )
            .service(
                web::scope(&health_prefix)
                    .wrap(HealthAuth)
                    .service(health_routes()),
            )
            .configure(|cfg| tracking_routes(cfg, tracking_cors, limiter.as_ref()))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
