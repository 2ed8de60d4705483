//! 仪表盘 API 错误码

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::ScrolldepthError;

/// 以数字序列化的错误码
///
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 追踪器错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    MissingOwner = 1002,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // 追踪器错误 3000-3099
    TrackerNotFound = 3000,
    TrackerCreateFailed = 3001,
    TrackerQueryFailed = 3002,
}

impl From<&ScrolldepthError> for ErrorCode {
    fn from(err: &ScrolldepthError) -> Self {
        match err {
            ScrolldepthError::Validation(_) => ErrorCode::BadRequest,
            ScrolldepthError::NotFound(_) => ErrorCode::TrackerNotFound,
            ScrolldepthError::Unauthorized(_) => ErrorCode::Unauthorized,
            ScrolldepthError::DatabaseOperation(_) => ErrorCode::TrackerQueryFailed,
            ScrolldepthError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            _ => ErrorCode::InternalServerError,
        }
    }
}
