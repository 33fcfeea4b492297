use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stores::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stores::Id)
                            .string_len(32)
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Stores::Name).string().not_null())
                    .col(
                        ColumnDef::new(Stores::StoreType)
                            .string_len(16)
                            .not_null()
                            .default("STORE"),
                    )
                    .col(ColumnDef::new(Stores::Address).string().null())
                    .col(ColumnDef::new(Stores::Phone).string().null())
                    .col(
                        ColumnDef::new(Stores::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Stores::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Stores::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string_len(32)
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::CategoryType).string_len(16).not_null())
                    .col(ColumnDef::new(Categories::ParentId).string_len(32).null())
                    .col(
                        ColumnDef::new(Categories::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Menus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Menus::Id)
                            .string_len(32)
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Menus::Name).string().not_null())
                    .col(ColumnDef::new(Menus::CategoryId).string_len(32).null())
                    .col(ColumnDef::new(Menus::Price).decimal_len(16, 4).not_null())
                    .col(
                        ColumnDef::new(Menus::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Menus::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Menus::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menus_category_id")
                            .from(Menus::Table, Menus::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .string_len(32)
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::JanCode).string_len(32).null())
                    .col(ColumnDef::new(Products::CategoryId).string_len(32).null())
                    .col(ColumnDef::new(Products::Unit).string_len(16).not_null())
                    .col(ColumnDef::new(Products::LotSize).decimal_len(16, 4).null())
                    .col(ColumnDef::new(Products::LotUnit).string_len(16).null())
                    .col(ColumnDef::new(Products::UnitPrice).decimal_len(16, 4).null())
                    .col(ColumnDef::new(Products::SupplierId).string_len(32).null())
                    .col(ColumnDef::new(Products::MinStock).decimal_len(16, 4).null())
                    .col(ColumnDef::new(Products::OrderUnit).decimal_len(16, 4).null())
                    .col(ColumnDef::new(Products::StorageLocation).string().null())
                    .col(
                        ColumnDef::new(Products::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WipItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WipItems::Id)
                            .string_len(32)
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WipItems::Name).string().not_null())
                    .col(ColumnDef::new(WipItems::CategoryId).string_len(32).null())
                    .col(ColumnDef::new(WipItems::Unit).string_len(16).not_null())
                    .col(ColumnDef::new(WipItems::ShelfLifeDays).integer().null())
                    .col(
                        ColumnDef::new(WipItems::ProductionLocation)
                            .string_len(32)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WipItems::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(WipItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WipItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wip_items_category_id")
                            .from(WipItems::Table, WipItems::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecipeLines::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecipeLines::MenuId).string_len(32).null())
                    .col(ColumnDef::new(RecipeLines::WipItemId).string_len(32).null())
                    .col(ColumnDef::new(RecipeLines::ProductId).string_len(32).null())
                    .col(
                        ColumnDef::new(RecipeLines::UsedWipItemId)
                            .string_len(32)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RecipeLines::Quantity)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecipeLines::Unit).string_len(16).not_null())
                    .col(
                        ColumnDef::new(RecipeLines::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecipeLines::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_lines_menu_id")
                            .from(RecipeLines::Table, RecipeLines::MenuId)
                            .to(Menus::Table, Menus::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_lines_wip_item_id")
                            .from(RecipeLines::Table, RecipeLines::WipItemId)
                            .to(WipItems::Table, WipItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_lines_product_id")
                            .from(RecipeLines::Table, RecipeLines::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_lines_used_wip_item_id")
                            .from(RecipeLines::Table, RecipeLines::UsedWipItemId)
                            .to(WipItems::Table, WipItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_lines_wip_item_id")
                    .table(RecipeLines::Table)
                    .col(RecipeLines::WipItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_lines_menu_id")
                    .table(RecipeLines::Table)
                    .col(RecipeLines::MenuId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecipeLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WipItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Menus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stores::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Stores {
    Table,
    Id,
    Name,
    StoreType,
    Address,
    Phone,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Categories {
    Table,
    Id,
    Name,
    CategoryType,
    ParentId,
    DisplayOrder,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Menus {
    Table,
    Id,
    Name,
    CategoryId,
    Price,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Products {
    Table,
    Id,
    Name,
    JanCode,
    CategoryId,
    Unit,
    LotSize,
    LotUnit,
    UnitPrice,
    SupplierId,
    MinStock,
    OrderUnit,
    StorageLocation,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum WipItems {
    Table,
    Id,
    Name,
    CategoryId,
    Unit,
    ShelfLifeDays,
    ProductionLocation,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RecipeLines {
    Table,
    Id,
    MenuId,
    WipItemId,
    ProductId,
    UsedWipItemId,
    Quantity,
    Unit,
    CreatedAt,
    UpdatedAt,
}
