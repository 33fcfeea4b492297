use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_catalog_tables::{Stores, WipItems};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WipProductions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WipProductions::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WipProductions::StoreId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(WipProductions::WipItemId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WipProductions::Quantity)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(WipProductions::Unit).string_len(16).not_null())
                    .col(
                        ColumnDef::new(WipProductions::ProductionDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WipProductions::ExpiryDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(WipProductions::EmployeeId).string().null())
                    .col(ColumnDef::new(WipProductions::Notes).text().null())
                    .col(
                        ColumnDef::new(WipProductions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wip_productions_store_id")
                            .from(WipProductions::Table, WipProductions::StoreId)
                            .to(Stores::Table, Stores::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wip_productions_wip_item_id")
                            .from(WipProductions::Table, WipProductions::WipItemId)
                            .to(WipItems::Table, WipItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_wip_productions_store_date")
                    .table(WipProductions::Table)
                    .col(WipProductions::StoreId)
                    .col(WipProductions::ProductionDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WipProductions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WipProductions {
    Table,
    Id,
    StoreId,
    WipItemId,
    Quantity,
    Unit,
    ProductionDate,
    ExpiryDate,
    EmployeeId,
    Notes,
    CreatedAt,
}
