use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_catalog_tables::{Products, Stores, WipItems};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stocktakings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stocktakings::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Stocktakings::StoreId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Stocktakings::StocktakingDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Stocktakings::Status)
                            .string_len(16)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(ColumnDef::new(Stocktakings::EmployeeId).string().not_null())
                    .col(
                        ColumnDef::new(Stocktakings::ConfirmedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Stocktakings::Notes).text().null())
                    .col(
                        ColumnDef::new(Stocktakings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Stocktakings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stocktakings_store_id")
                            .from(Stocktakings::Table, Stocktakings::StoreId)
                            .to(Stores::Table, Stores::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StocktakingDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StocktakingDetails::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StocktakingDetails::StocktakingId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StocktakingDetails::ProductId)
                            .string_len(32)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StocktakingDetails::WipItemId)
                            .string_len(32)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StocktakingDetails::SystemQuantity)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StocktakingDetails::ActualQuantity)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StocktakingDetails::Difference)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StocktakingDetails::Unit)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StocktakingDetails::Notes).text().null())
                    .col(
                        ColumnDef::new(StocktakingDetails::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stocktaking_details_stocktaking_id")
                            .from(StocktakingDetails::Table, StocktakingDetails::StocktakingId)
                            .to(Stocktakings::Table, Stocktakings::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stocktaking_details_product_id")
                            .from(StocktakingDetails::Table, StocktakingDetails::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stocktaking_details_wip_item_id")
                            .from(StocktakingDetails::Table, StocktakingDetails::WipItemId)
                            .to(WipItems::Table, WipItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stocktaking_details_stocktaking_id")
                    .table(StocktakingDetails::Table)
                    .col(StocktakingDetails::StocktakingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StocktakingDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stocktakings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Stocktakings {
    Table,
    Id,
    StoreId,
    StocktakingDate,
    Status,
    EmployeeId,
    ConfirmedAt,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StocktakingDetails {
    Table,
    Id,
    StocktakingId,
    ProductId,
    WipItemId,
    SystemQuantity,
    ActualQuantity,
    Difference,
    Unit,
    Notes,
    CreatedAt,
}
