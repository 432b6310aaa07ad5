//! Create shows table
//!
//! Holds the authoritative seat counters for each show.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Shows::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Shows::Title).string().not_null())
                    .col(ColumnDef::new(Shows::Description).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Shows::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Shows::TotalSeats).integer().not_null())
                    .col(ColumnDef::new(Shows::AvailableSeats).integer().not_null())
                    .col(
                        ColumnDef::new(Shows::PricePerSeat)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shows::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shows_starts_at")
                    .table(Shows::Table)
                    .col(Shows::StartsAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shows::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Shows {
    Table,
    Id,
    Title,
    Description,
    StartsAt,
    TotalSeats,
    AvailableSeats,
    PricePerSeat,
    CreatedAt,
}
