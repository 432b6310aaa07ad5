//! Create requesters table
//!
//! Known requester identities; bookings reference them by id.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Requesters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Requesters::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Requesters::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Requesters::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(Requesters::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Requesters::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Requesters {
    Table,
    Id,
    Email,
    DisplayName,
    CreatedAt,
}
