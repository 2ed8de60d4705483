//! 仪表盘 API 帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use tracing::error;

use crate::api::constants::JSON_CONTENT_TYPE;
use crate::errors::ScrolldepthError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(("Content-Type", JSON_CONTENT_TYPE))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, code, message, None)
}

/// 错误映射为响应；服务端错误只记日志，不向调用方暴露细节
pub fn error_from_scrolldepth(err: &ScrolldepthError) -> HttpResponse {
    let status = err.http_status();
    let code = ErrorCode::from(err);
    if err.is_server_error() {
        error!("Dashboard API error: {}", err);
        error_response(status, code, "Internal server error")
    } else {
        error_response(status, code, err.message())
    }
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(result: crate::errors::Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_scrolldepth(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_server_error_hides_detail() {
        let err = ScrolldepthError::database_operation("disk I/O error at /var/lib/x.db");
        let resp = error_from_scrolldepth(&err);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Internal server error");
        assert_eq!(json["code"], ErrorCode::TrackerQueryFailed as i32);
    }

    #[actix_rt::test]
    async fn test_not_found_keeps_message() {
        let resp = error_from_scrolldepth(&ScrolldepthError::not_found("Tracker 'x' not found"));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Tracker 'x' not found");
        assert!(json["data"].is_null());
    }
}
