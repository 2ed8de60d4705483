pub mod dashboard;
pub mod health;
pub mod script;
pub mod track;

use actix_governor::Governor;
use actix_web::web;

use crate::api::constants::{SCRIPT_PATH, TRACK_PATH};
use crate::api::middleware::{TrackingCors, TrackingLimiterConfig};

pub use dashboard::trackers_routes;
pub use health::{AppStartTime, HealthService, health_routes};
pub use script::tracker_script;
pub use track::{TrackLimits, track};

/// 注册追踪端点（公开，带宽松 CORS）
///
/// 中间件挂在 resource 上，OPTIONS 预检在方法路由之前由 [`TrackingCors`] 应答。
/// 限流只作用于 `POST /track`；429 以错误形式返回，不经过 CORS 头处理。
pub fn tracking_routes(
    cfg: &mut web::ServiceConfig,
    cors: TrackingCors,
    limiter: Option<&TrackingLimiterConfig>,
) {
    match limiter {
        Some(limiter) => cfg.service(
            web::resource(TRACK_PATH)
                .wrap(Governor::new(limiter))
                .wrap(cors.clone())
                .route(web::post().to(track)),
        ),
        None => cfg.service(
            web::resource(TRACK_PATH)
                .wrap(cors.clone())
                .route(web::post().to(track)),
        ),
    };

    cfg.service(
        web::resource(SCRIPT_PATH)
            .wrap(cors)
            .route(web::get().to(tracker_script))
            .route(web::head().to(tracker_script)),
    );
}
