use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum ScrolldepthError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Unauthorized(String),
    Serialization(String),
    ScriptTemplate(String),
}

impl ScrolldepthError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ScrolldepthError::DatabaseConfig(_) => "E001",
            ScrolldepthError::DatabaseConnection(_) => "E002",
            ScrolldepthError::DatabaseOperation(_) => "E003",
            ScrolldepthError::FileOperation(_) => "E004",
            ScrolldepthError::Validation(_) => "E005",
            ScrolldepthError::NotFound(_) => "E006",
            ScrolldepthError::Unauthorized(_) => "E007",
            ScrolldepthError::Serialization(_) => "E008",
            ScrolldepthError::ScriptTemplate(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ScrolldepthError::DatabaseConfig(_) => "Database Configuration Error",
            ScrolldepthError::DatabaseConnection(_) => "Database Connection Error",
            ScrolldepthError::DatabaseOperation(_) => "Database Operation Error",
            ScrolldepthError::FileOperation(_) => "File Operation Error",
            ScrolldepthError::Validation(_) => "Validation Error",
            ScrolldepthError::NotFound(_) => "Resource Not Found",
            ScrolldepthError::Unauthorized(_) => "Unauthorized",
            ScrolldepthError::Serialization(_) => "Serialization Error",
            ScrolldepthError::ScriptTemplate(_) => "Script Template Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ScrolldepthError::DatabaseConfig(msg)
            | ScrolldepthError::DatabaseConnection(msg)
            | ScrolldepthError::DatabaseOperation(msg)
            | ScrolldepthError::FileOperation(msg)
            | ScrolldepthError::Validation(msg)
            | ScrolldepthError::NotFound(msg)
            | ScrolldepthError::Unauthorized(msg)
            | ScrolldepthError::Serialization(msg)
            | ScrolldepthError::ScriptTemplate(msg) => msg,
        }
    }

    /// HTTP 状态码映射
    ///
    /// Storage and template failures all collapse to 500 so no internal detail
    /// reaches the caller.
    pub fn http_status(&self) -> StatusCode {
        match self {
            ScrolldepthError::Validation(_) => StatusCode::BAD_REQUEST,
            ScrolldepthError::NotFound(_) => StatusCode::NOT_FOUND,
            ScrolldepthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error is the server's fault (and therefore worth an `error!` log)
    pub fn is_server_error(&self) -> bool {
        self.http_status().is_server_error()
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ScrolldepthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ScrolldepthError {}

// 便捷的构造函数
impl ScrolldepthError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ScrolldepthError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ScrolldepthError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ScrolldepthError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ScrolldepthError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ScrolldepthError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ScrolldepthError::NotFound(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        ScrolldepthError::Unauthorized(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ScrolldepthError::Serialization(msg.into())
    }

    pub fn script_template<T: Into<String>>(msg: T) -> Self {
        ScrolldepthError::ScriptTemplate(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ScrolldepthError {
    fn from(err: sea_orm::DbErr) -> Self {
        ScrolldepthError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ScrolldepthError {
    fn from(err: std::io::Error) -> Self {
        ScrolldepthError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ScrolldepthError {
    fn from(err: serde_json::Error) -> Self {
        ScrolldepthError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScrolldepthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ScrolldepthError::validation("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ScrolldepthError::not_found("gone").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ScrolldepthError::database_operation("boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(ScrolldepthError::database_connection("down").is_server_error());
        assert!(!ScrolldepthError::validation("bad").is_server_error());
    }

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            ScrolldepthError::database_config(""),
            ScrolldepthError::database_connection(""),
            ScrolldepthError::database_operation(""),
            ScrolldepthError::file_operation(""),
            ScrolldepthError::validation(""),
            ScrolldepthError::not_found(""),
            ScrolldepthError::unauthorized(""),
            ScrolldepthError::serialization(""),
            ScrolldepthError::script_template(""),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_format_simple() {
        let err = ScrolldepthError::not_found("tracker abc");
        assert_eq!(err.format_simple(), "Resource Not Found: tracker abc");
        assert_eq!(err.to_string(), err.format_simple());
    }
}
