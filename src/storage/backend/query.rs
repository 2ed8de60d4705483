//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::debug;

use super::converters::{model_to_scroll_event, model_to_tracker};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ScrolldepthError};
use crate::storage::{ScrollEvent, Tracker};

use migration::entities::{scroll_event, tracker};

impl SeaOrmStorage {
    /// 按 id 查询追踪器（不区分所有者，供上报端点使用）
    pub async fn find_tracker(&self, id: &str) -> Result<Option<Tracker>> {
        let db = &self.db;
        let id_owned = id.to_string();

        let model = retry::with_retry(&format!("find_tracker({})", id), self.retry_config, || {
            tracker::Entity::find_by_id(id_owned.clone()).one(db)
        })
        .await
        .map_err(|e| ScrolldepthError::database_operation(format!("查询追踪器失败: {}", e)))?;

        Ok(model.map(model_to_tracker))
    }

    /// 按所有者 + id 查询，属于其他所有者的追踪器视为不存在
    pub async fn find_owned_tracker(&self, owner: &str, id: &str) -> Result<Option<Tracker>> {
        let db = &self.db;

        let model = retry::with_retry(
            &format!("find_owned_tracker({})", id),
            self.retry_config,
            || {
                tracker::Entity::find_by_id(id.to_string())
                    .filter(tracker::Column::Owner.eq(owner))
                    .one(db)
            },
        )
        .await
        .map_err(|e| ScrolldepthError::database_operation(format!("查询追踪器失败: {}", e)))?;

        Ok(model.map(model_to_tracker))
    }

    /// 列出所有者的全部追踪器（最新创建的在前）
    pub async fn list_trackers(&self, owner: &str) -> Result<Vec<Tracker>> {
        let db = &self.db;

        let models = retry::with_retry("list_trackers", self.retry_config, || {
            tracker::Entity::find()
                .filter(tracker::Column::Owner.eq(owner))
                .order_by_desc(tracker::Column::CreatedAt)
                .all(db)
        })
        .await
        .map_err(|e| ScrolldepthError::database_operation(format!("列出追踪器失败: {}", e)))?;

        debug!("Loaded {} trackers for owner {}", models.len(), owner);
        Ok(models.into_iter().map(model_to_tracker).collect())
    }

    /// 最近的事件，按发生时间倒序，最多 limit 条
    pub async fn recent_events(&self, tracker_id: &str, limit: u64) -> Result<Vec<ScrollEvent>> {
        self.events_since(tracker_id, None, limit).await
    }

    /// 指定时间之后的事件（倒序，最多 limit 条）
    pub async fn events_since(
        &self,
        tracker_id: &str,
        since: Option<DateTime<Utc>>,
        limit: u64,
    ) -> Result<Vec<ScrollEvent>> {
        let db = &self.db;

        let models = retry::with_retry(
            &format!("events_since({})", tracker_id),
            self.retry_config,
            || {
                let mut query = scroll_event::Entity::find()
                    .filter(scroll_event::Column::TrackerId.eq(tracker_id));
                if let Some(since) = since {
                    query = query.filter(scroll_event::Column::OccurredAt.gte(since));
                }
                query
                    .order_by_desc(scroll_event::Column::OccurredAt)
                    .order_by_desc(scroll_event::Column::Id)
                    .limit(limit)
                    .all(db)
            },
        )
        .await
        .map_err(|e| ScrolldepthError::database_operation(format!("查询滚动事件失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_scroll_event).collect())
    }

    /// 追踪器的事件总数
    pub async fn count_events(&self, tracker_id: &str) -> Result<u64> {
        let db = &self.db;

        retry::with_retry("count_events", self.retry_config, || {
            scroll_event::Entity::find()
                .filter(scroll_event::Column::TrackerId.eq(tracker_id))
                .count(db)
        })
        .await
        .map_err(|e| ScrolldepthError::database_operation(format!("统计事件失败: {}", e)))
    }

    /// 数据库连通性检查（健康检查使用）
    pub async fn ping(&self) -> Result<()> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map(|_| ())
            .map_err(|e| ScrolldepthError::database_connection(format!("数据库不可用: {}", e)))
    }
}
