//! scroll_events 表迁移
//!
//! 每个上报事件一行，tracker 删除时级联删除。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScrollEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScrollEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ScrollEvents::TrackerId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScrollEvents::ScrollDepth).integer().not_null())
                    .col(ColumnDef::new(ScrollEvents::PageUrl).text().not_null())
                    .col(
                        ColumnDef::new(ScrollEvents::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScrollEvents::TimeOnPage).big_integer().null())
                    .col(
                        ColumnDef::new(ScrollEvents::TotalTimeOnPage)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ScrollEvents::MaxScrollDepth).integer().null())
                    .col(
                        ColumnDef::new(ScrollEvents::ScrollEventsCount)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ScrollEvents::EngagementData).text().null())
                    .col(ColumnDef::new(ScrollEvents::Ua).text().null())
                    .col(ColumnDef::new(ScrollEvents::ViewportW).integer().null())
                    .col(ColumnDef::new(ScrollEvents::ViewportH).integer().null())
                    .col(ColumnDef::new(ScrollEvents::IpAddress).string_len(45).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scroll_events_tracker")
                            .from(ScrollEvents::Table, ScrollEvents::TrackerId)
                            .to(Trackers::Table, Trackers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 复合索引（单 tracker 时间序列查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_scroll_events_tracker_time")
                    .table(ScrollEvents::Table)
                    .col(ScrollEvents::TrackerId)
                    .col(ScrollEvents::OccurredAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_scroll_events_tracker_time")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ScrollEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScrollEvents {
    #[sea_orm(iden = "scroll_events")]
    Table,
    Id,
    TrackerId,
    ScrollDepth,
    PageUrl,
    OccurredAt,
    TimeOnPage,
    TotalTimeOnPage,
    MaxScrollDepth,
    ScrollEventsCount,
    EngagementData,
    Ua,
    ViewportW,
    ViewportH,
    IpAddress,
}

#[derive(DeriveIden)]
enum Trackers {
    #[sea_orm(iden = "trackers")]
    Table,
    Id,
}
