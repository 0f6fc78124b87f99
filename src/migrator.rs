use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240501_000001_create_items_table::Migration),
            Box::new(m20240501_000002_create_on_hand_records_table::Migration),
            Box::new(m20240501_000003_create_stock_events_table::Migration),
        ]
    }
}

mod m20240501_000001_create_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000001_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Items::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Items::ScannedCode)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Items::Model).string().not_null())
                        .col(ColumnDef::new(Items::Brand).string().null())
                        .col(ColumnDef::new(Items::Size).string().null())
                        .col(ColumnDef::new(Items::Color).string().null())
                        .col(ColumnDef::new(Items::Notes).string().null())
                        .col(ColumnDef::new(Items::PurchasedFrom).string().null())
                        .col(ColumnDef::new(Items::SoldOrderReference).string().null())
                        .col(
                            ColumnDef::new(Items::PaintThickness)
                                .decimal_len(10, 2)
                                .null(),
                        )
                        .col(ColumnDef::new(Items::Price).decimal_len(12, 2).null())
                        .col(ColumnDef::new(Items::QuantityNote).integer().null())
                        .col(ColumnDef::new(Items::InventoriedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_brand")
                        .table(Items::Table)
                        .col(Items::Brand)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Items {
        Table,
        Id,
        ScannedCode,
        Model,
        Brand,
        Size,
        Color,
        Notes,
        PurchasedFrom,
        SoldOrderReference,
        PaintThickness,
        Price,
        QuantityNote,
        InventoriedAt,
    }
}

mod m20240501_000002_create_on_hand_records_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000002_create_on_hand_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OnHandRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OnHandRecords::ItemId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OnHandRecords::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OnHandRecords::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OnHandRecords::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum OnHandRecords {
        Table,
        ItemId,
        Quantity,
        UpdatedAt,
    }
}

mod m20240501_000003_create_stock_events_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000003_create_stock_events_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockEvents::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockEvents::ItemId).uuid().not_null())
                        .col(ColumnDef::new(StockEvents::Action).string().not_null())
                        .col(ColumnDef::new(StockEvents::Delta).integer().not_null())
                        .col(ColumnDef::new(StockEvents::OrderReference).string().null())
                        .col(ColumnDef::new(StockEvents::Source).string().null())
                        .col(ColumnDef::new(StockEvents::DateSubtracted).timestamp().null())
                        .col(ColumnDef::new(StockEvents::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_events_item_id")
                        .table(StockEvents::Table)
                        .col(StockEvents::ItemId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockEvents::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum StockEvents {
        Table,
        Id,
        ItemId,
        Action,
        Delta,
        OrderReference,
        Source,
        DateSubtracted,
        CreatedAt,
    }
}
