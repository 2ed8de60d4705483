//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, sea_query::OnConflict};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{new_event_to_active_model, tracker_to_active_model};
use super::retry;
use crate::errors::{Result, ScrolldepthError};
use crate::storage::{NewScrollEvent, Tracker};

use migration::entities::{scroll_event, tracker};

impl SeaOrmStorage {
    /// 插入追踪器，id 已存在时返回 `Ok(false)`（原子的 insert-if-absent）
    pub async fn insert_tracker_if_absent(&self, new_tracker: &Tracker) -> Result<bool> {
        let model = tracker_to_active_model(new_tracker);

        let result = tracker::Entity::insert(model)
            .on_conflict(
                OnConflict::column(tracker::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await;

        match result {
            Ok(_) => {
                info!(
                    "Tracker created: {} (owner: {})",
                    new_tracker.id, new_tracker.owner
                );
                Ok(true)
            }
            Err(sea_orm::DbErr::RecordNotInserted) => Ok(false),
            Err(e) => {
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("no rows") || err_str.contains("record not inserted") {
                    Ok(false)
                } else {
                    Err(ScrolldepthError::database_operation(format!(
                        "创建追踪器 '{}' 失败: {}",
                        new_tracker.id, e
                    )))
                }
            }
        }
    }

    /// 删除所有者的追踪器，事件由外键 ON DELETE CASCADE 清理
    ///
    /// 不存在或属于其他所有者时返回 NotFound
    pub async fn delete_tracker(&self, owner: &str, id: &str) -> Result<()> {
        let db = &self.db;

        let result = retry::with_retry(&format!("delete_tracker({})", id), self.retry_config, || {
            tracker::Entity::delete_many()
                .filter(tracker::Column::Id.eq(id))
                .filter(tracker::Column::Owner.eq(owner))
                .exec(db)
        })
        .await
        .map_err(|e| ScrolldepthError::database_operation(format!("删除追踪器失败: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(ScrolldepthError::not_found(format!("追踪器不存在: {}", id)));
        }

        info!("Tracker deleted: {}", id);
        Ok(())
    }

    /// 插入一条滚动事件
    ///
    /// 没有幂等键，重复上报产生重复行
    pub async fn insert_event(&self, event: &NewScrollEvent) -> Result<()> {
        let db = &self.db;

        retry::with_retry(
            &format!("insert_event({})", event.tracker_id),
            self.retry_config,
            || scroll_event::Entity::insert(new_event_to_active_model(event)).exec(db),
        )
        .await
        .map_err(|e| ScrolldepthError::database_operation(format!("写入滚动事件失败: {}", e)))?;

        debug!(
            "Scroll event stored: tracker={} depth={}",
            event.tracker_id, event.scroll_depth
        );
        Ok(())
    }
}
