//! `POST /track` 上报端点
//!
//! 请求体按 JSON 解析，不看 Content-Type（sendBeacon 会以 text/plain 发送）。

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::api::constants::JSON_CONTENT_TYPE;
use crate::errors::ScrolldepthError;
use crate::services::{IngestService, TrackPayload, ValidationIssue};
use crate::utils::ip::client_ip;

#[derive(Serialize)]
struct InvalidPayload<'a> {
    error: &'static str,
    details: &'a [ValidationIssue],
}

#[derive(Serialize)]
struct TrackError {
    error: &'static str,
}

/// 上报端点的请求体上限
#[derive(Clone, Copy, Debug)]
pub struct TrackLimits {
    pub payload_limit: usize,
}

impl Default for TrackLimits {
    fn default() -> Self {
        Self {
            payload_limit: crate::config::TrackingConfig::default().payload_limit,
        }
    }
}

fn invalid_payload(issues: &[ValidationIssue]) -> HttpResponse {
    HttpResponse::BadRequest()
        .insert_header(("Content-Type", JSON_CONTENT_TYPE))
        .json(InvalidPayload {
            error: "Invalid payload",
            details: issues,
        })
}

fn track_error(status: StatusCode, error: &'static str) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(("Content-Type", JSON_CONTENT_TYPE))
        .json(TrackError { error })
}

fn body_issue(message: String) -> Vec<ValidationIssue> {
    vec![ValidationIssue {
        path: String::new(),
        message,
    }]
}

/// 按上限读取请求体；超限或读取失败返回校验问题
async fn read_body(
    payload: &mut web::Payload,
    limit: usize,
) -> Result<web::BytesMut, Vec<ValidationIssue>> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| body_issue(format!("Unreadable body: {}", e)))?;
        if body.len() + chunk.len() > limit {
            return Err(body_issue(format!("Payload exceeds {} bytes", limit)));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

pub async fn track(
    req: HttpRequest,
    mut payload: web::Payload,
    ingest: web::Data<Arc<IngestService>>,
    limits: Option<web::Data<TrackLimits>>,
) -> HttpResponse {
    let limit = limits
        .map(|l| l.payload_limit)
        .unwrap_or_else(|| TrackLimits::default().payload_limit);

    let body = match read_body(&mut payload, limit).await {
        Ok(body) => body,
        Err(issues) => {
            debug!("Rejected tracking body: {}", issues[0].message);
            return invalid_payload(&issues);
        }
    };

    let event = match TrackPayload::from_slice(&body) {
        Ok(event) => event,
        Err(failure) => {
            debug!("Invalid tracking payload: {}", failure);
            return invalid_payload(&failure.issues);
        }
    };

    trace!(
        "Tracking event: tracker={} depth={}",
        event.tracker_id, event.scroll_depth
    );

    match ingest.ingest(event, client_ip(&req)).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(ScrolldepthError::NotFound(_)) => {
            track_error(StatusCode::NOT_FOUND, "Unknown trackerId")
        }
        Err(ScrolldepthError::Validation(msg)) => invalid_payload(&body_issue(msg)),
        // 存储错误已在 IngestService 记录
        Err(_) => track_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
    }
}
