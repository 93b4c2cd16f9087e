use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccessLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AccessLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AccessLogs::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(AccessLogs::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccessLogs::UserAgent).string().not_null())
                    .col(ColumnDef::new(AccessLogs::Ip).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_access_logs_user_timestamp")
                    .table(AccessLogs::Table)
                    .col(AccessLogs::UserId)
                    .col(AccessLogs::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccessLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AccessLogs {
    Table,
    Id,
    UserId,
    Timestamp,
    UserAgent,
    Ip,
}
