use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 trackers 表
        manager
            .create_table(
                Table::create()
                    .table(Trackers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trackers::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Trackers::Owner).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Trackers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // owner 索引（用于按账号列出 tracker）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_trackers_owner")
                    .table(Trackers::Table)
                    .col(Trackers::Owner)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_trackers_owner").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Trackers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Trackers {
    #[sea_orm(iden = "trackers")]
    Table,
    Id,
    Owner,
    CreatedAt,
}
