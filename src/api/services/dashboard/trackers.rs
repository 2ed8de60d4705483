//! 追踪器管理与仪表盘读取端点

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{info, trace};

use crate::api::middleware::OwnerId;
use crate::services::{DashboardService, TrackerService};

use super::error_code::ErrorCode;
use super::helpers::{api_result, error_from_scrolldepth, json_response, success_response};
use super::types::{EventsQuery, MessageResponse, TrackerResponse};

pub async fn list_trackers(
    owner: OwnerId,
    trackers: web::Data<Arc<TrackerService>>,
) -> ActixResult<impl Responder> {
    trace!("Dashboard API: list trackers for {}", owner.as_str());
    let result = trackers.list(owner.as_str()).await.map(|list| {
        list.into_iter()
            .map(TrackerResponse::from)
            .collect::<Vec<_>>()
    });
    Ok(api_result(result))
}

pub async fn create_tracker(
    owner: OwnerId,
    trackers: web::Data<Arc<TrackerService>>,
) -> ActixResult<impl Responder> {
    match trackers.create(owner.as_str()).await {
        Ok(tracker) => {
            info!("Dashboard API: tracker {} created", tracker.id);
            Ok(json_response(
                StatusCode::CREATED,
                ErrorCode::Success,
                "Created",
                Some(TrackerResponse::from(tracker)),
            ))
        }
        Err(e) => Ok(error_from_scrolldepth(&e)),
    }
}

pub async fn get_tracker(
    owner: OwnerId,
    path: web::Path<String>,
    trackers: web::Data<Arc<TrackerService>>,
) -> ActixResult<impl Responder> {
    let result = trackers
        .get(owner.as_str(), &path)
        .await
        .map(TrackerResponse::from);
    Ok(api_result(result))
}

pub async fn delete_tracker(
    owner: OwnerId,
    path: web::Path<String>,
    trackers: web::Data<Arc<TrackerService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    match trackers.delete(owner.as_str(), &id).await {
        Ok(()) => Ok(success_response(MessageResponse {
            message: format!("Tracker {} deleted", id),
        })),
        Err(e) => Ok(error_from_scrolldepth(&e)),
    }
}

pub async fn get_events(
    owner: OwnerId,
    path: web::Path<String>,
    query: web::Query<EventsQuery>,
    dashboard: web::Data<Arc<DashboardService>>,
) -> ActixResult<impl Responder> {
    let result = dashboard.events(owner.as_str(), &path, query.limit).await;
    Ok(api_result(result))
}

pub async fn get_summary(
    owner: OwnerId,
    path: web::Path<String>,
    dashboard: web::Data<Arc<DashboardService>>,
) -> ActixResult<HttpResponse> {
    Ok(api_result(dashboard.summary(owner.as_str(), &path).await))
}

pub async fn get_visitors(
    owner: OwnerId,
    path: web::Path<String>,
    dashboard: web::Data<Arc<DashboardService>>,
) -> ActixResult<HttpResponse> {
    Ok(api_result(dashboard.visitors(owner.as_str(), &path).await))
}
