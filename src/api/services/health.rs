use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, trace};

use super::dashboard::{
    ApiResponse, ErrorCode, HealthChecks, HealthResponse, HealthStorageCheck,
};
use crate::api::constants::JSON_CONTENT_TYPE;
use crate::storage::SeaOrmStorage;

const STORAGE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let started = Instant::now();
        trace!("Received health check request");

        let backend = storage.get_backend_config().storage_type;

        let storage_check = match tokio::time::timeout(STORAGE_CHECK_TIMEOUT, storage.ping()).await
        {
            Ok(Ok(())) => HealthStorageCheck {
                status: "healthy".to_string(),
                backend,
                error: None,
            },
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some("database error".to_string()),
                }
            }
            Err(_) => {
                error!("Storage health check timed out");
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some("timeout".to_string()),
                }
            }
        };

        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;
        let healthy = storage_check.status == "healthy";
        let status = if healthy { "healthy" } else { "unhealthy" };

        let body = ApiResponse {
            code: if healthy {
                ErrorCode::Success as i32
            } else {
                ErrorCode::ServiceUnavailable as i32
            },
            message: if healthy { "OK" } else { "Service Unavailable" }.to_string(),
            data: Some(HealthResponse {
                status: status.to_string(),
                timestamp: now.to_rfc3339(),
                uptime,
                checks: HealthChecks {
                    storage: storage_check,
                },
                response_time_ms: started.elapsed().as_millis() as u64,
            }),
        };

        info!(
            "Health check completed in {:?}, status: {}, uptime: {}s",
            started.elapsed(),
            status,
            uptime
        );

        HttpResponse::build(if healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        })
        .insert_header(("Content-Type", JSON_CONTENT_TYPE))
        .json(body)
    }

    /// 就绪检查：数据库可达
    pub async fn readiness_check(storage: web::Data<Arc<SeaOrmStorage>>) -> impl Responder {
        trace!("Received readiness check request");
        match storage.ping().await {
            Ok(()) => HttpResponse::Ok()
                .insert_header(("Content-Type", "text/plain"))
                .body("OK"),
            Err(e) => {
                error!("Readiness check failed: {}", e);
                HttpResponse::ServiceUnavailable()
                    .insert_header(("Content-Type", "text/plain"))
                    .body("Not Ready")
            }
        }
    }

    // 活跃性检查
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");
        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
