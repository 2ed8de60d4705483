//! API 模块常量定义

/// 仪表盘 API 的所有者标识头
pub const OWNER_ID_HEADER: &str = "X-Owner-Id";

/// Bearer 认证前缀
pub const BEARER_PREFIX: &str = "Bearer ";

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

pub const SCRIPT_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";

/// 上报与脚本端点的路径
pub const TRACK_PATH: &str = "/track";
pub const SCRIPT_PATH: &str = "/tracker-script";
