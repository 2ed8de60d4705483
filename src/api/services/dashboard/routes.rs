//! 仪表盘 API 路由

use actix_web::web;

use super::trackers::{
    create_tracker, delete_tracker, get_events, get_summary, get_tracker, get_visitors,
    list_trackers,
};

/// 追踪器路由 `/trackers`
///
/// - GET/POST /trackers
/// - GET/DELETE /trackers/{id}
/// - GET /trackers/{id}/events?limit=n
/// - GET /trackers/{id}/summary
/// - GET /trackers/{id}/visitors
pub fn trackers_routes() -> actix_web::Scope {
    web::scope("/trackers")
        .route("", web::get().to(list_trackers))
        .route("", web::post().to(create_tracker))
        .route("/{id}/events", web::get().to(get_events))
        .route("/{id}/summary", web::get().to(get_summary))
        .route("/{id}/visitors", web::get().to(get_visitors))
        .route("/{id}", web::get().to(get_tracker))
        .route("/{id}", web::delete().to(delete_tracker))
}
