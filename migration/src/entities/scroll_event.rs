//! Scroll event entity, one row per reported observation

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "scroll_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tracker_id: String,
    pub scroll_depth: i32,
    #[sea_orm(column_type = "Text")]
    pub page_url: String,
    pub occurred_at: DateTimeUtc,
    pub time_on_page: Option<i64>,
    pub total_time_on_page: Option<i64>,
    pub max_scroll_depth: Option<i32>,
    pub scroll_events_count: Option<i32>,
    /// Free-form engagement payload, serialized JSON
    #[sea_orm(column_type = "Text", nullable)]
    pub engagement_data: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub ua: Option<String>,
    pub viewport_w: Option<i32>,
    pub viewport_h: Option<i32>,
    pub ip_address: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
