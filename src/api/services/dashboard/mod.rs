//! 仪表盘 API
//!
//! 所有端点按所有者隔离，响应统一使用 `{code, message, data}` 信封。

pub mod error_code;
mod helpers;
pub mod routes;
mod trackers;
mod types;

pub use error_code::ErrorCode;
pub use helpers::{api_result, error_from_scrolldepth, error_response, success_response};
pub use routes::trackers_routes;
pub use types::*;
