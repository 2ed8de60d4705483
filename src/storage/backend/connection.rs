use std::str::FromStr;
use std::time::Duration;

use sea_orm::sqlx::SqlitePool;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, SqlxSqliteConnector};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::errors::{Result, ScrolldepthError};
use migration::{Migrator, MigratorTrait};

/// SQLite 连接参数
///
/// `foreign_keys` 必须打开：删除追踪器依赖 ON DELETE CASCADE 清理事件。
/// WAL 让上报写入与仪表盘读取互不阻塞。
fn sqlite_options(database_url: &str, busy_timeout: Duration) -> Result<SqliteConnectOptions> {
    let options = SqliteConnectOptions::from_str(database_url).map_err(|e| {
        ScrolldepthError::database_config(format!("Invalid SQLite URL '{}': {}", database_url, e))
    })?;

    Ok(options
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(busy_timeout))
}

pub async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    let busy_timeout = Duration::from_secs(crate::config::get_config().database.timeout.max(1));
    let pool = SqlitePool::connect_with(sqlite_options(database_url, busy_timeout)?)
        .await
        .map_err(|e| ScrolldepthError::database_connection(format!("SQLite 连接失败: {}", e)))?;

    debug!("SQLite pool ready (busy timeout {:?})", busy_timeout);
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

fn pooled_options(database_url: &str, db: &DatabaseConfig) -> ConnectOptions {
    let timeout = Duration::from_secs(db.timeout);
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(db.pool_size)
        .min_connections(db.pool_size.min(2))
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(false);
    options
}

/// MySQL / PostgreSQL
pub async fn connect_generic(database_url: &str, backend_name: &str) -> Result<DatabaseConnection> {
    let config = crate::config::get_config();
    Database::connect(pooled_options(database_url, &config.database))
        .await
        .map_err(|e| {
            ScrolldepthError::database_connection(format!("{} 连接失败: {}", backend_name, e))
        })
}

/// 建表：trackers、scroll_events 及索引
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| ScrolldepthError::database_operation(format!("迁移失败: {}", e)))?;
    info!("Database schema up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_options_reject_bad_url() {
        let err = sqlite_options("sqlite://events.db?mode=bogus", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ScrolldepthError::DatabaseConfig(_)));
        assert!(sqlite_options("sqlite://events.db?mode=rwc", Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_pooled_options_follow_database_config() {
        let db = DatabaseConfig {
            pool_size: 8,
            timeout: 7,
            ..Default::default()
        };
        let options = pooled_options("postgres://localhost/events", &db);
        assert_eq!(options.get_max_connections(), Some(8));
        assert_eq!(options.get_min_connections(), Some(2));
        assert_eq!(options.get_connect_timeout(), Some(Duration::from_secs(7)));
    }
}
