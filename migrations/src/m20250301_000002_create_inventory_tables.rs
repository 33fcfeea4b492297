use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_catalog_tables::{Products, Stores, WipItems};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per (store, product); absence reads as zero on hand
        manager
            .create_table(
                Table::create()
                    .table(InventoryRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryRecords::StoreId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryRecords::ProductId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryRecords::Quantity)
                            .decimal_len(16, 4)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventoryRecords::LastUpdatedBy)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(InventoryRecords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(InventoryRecords::StoreId)
                            .col(InventoryRecords::ProductId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventory_records_store_id")
                            .from(InventoryRecords::Table, InventoryRecords::StoreId)
                            .to(Stores::Table, Stores::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventory_records_product_id")
                            .from(InventoryRecords::Table, InventoryRecords::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WipInventoryRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WipInventoryRecords::StoreId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WipInventoryRecords::WipItemId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WipInventoryRecords::Quantity)
                            .decimal_len(16, 4)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WipInventoryRecords::ProductionDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WipInventoryRecords::ExpiryDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WipInventoryRecords::LastUpdatedBy)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WipInventoryRecords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(WipInventoryRecords::StoreId)
                            .col(WipInventoryRecords::WipItemId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wip_inventory_records_store_id")
                            .from(WipInventoryRecords::Table, WipInventoryRecords::StoreId)
                            .to(Stores::Table, Stores::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wip_inventory_records_wip_item_id")
                            .from(WipInventoryRecords::Table, WipInventoryRecords::WipItemId)
                            .to(WipItems::Table, WipItems::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WipInventoryRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InventoryRecords {
    Table,
    StoreId,
    ProductId,
    Quantity,
    LastUpdatedBy,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WipInventoryRecords {
    Table,
    StoreId,
    WipItemId,
    Quantity,
    ProductionDate,
    ExpiryDate,
    LastUpdatedBy,
    UpdatedAt,
}
