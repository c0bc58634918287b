use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_reference_tables::Migration),
            Box::new(m20240101_000002_create_purchase_orders_table::Migration),
            Box::new(m20240101_000003_create_assets_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_reference_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vendors::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Vendors::Name).string().not_null())
                        .col(ColumnDef::new(Vendors::ContactEmail).string().null())
                        .col(
                            ColumnDef::new(Vendors::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Vendors::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AssetModels::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AssetModels::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AssetModels::Name).string().not_null())
                        .col(ColumnDef::new(AssetModels::AssetType).string().not_null())
                        .col(ColumnDef::new(AssetModels::Make).string().not_null())
                        .col(
                            ColumnDef::new(AssetModels::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(AssetModels::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OperatingSystems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OperatingSystems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OperatingSystems::Name).string().not_null())
                        .col(ColumnDef::new(OperatingSystems::Version).string().null())
                        .col(
                            ColumnDef::new(OperatingSystems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OperatingSystems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AssetModels::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Vendors {
        Table,
        Id,
        Name,
        ContactEmail,
        IsActive,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Name,
        Email,
        IsActive,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum AssetModels {
        Table,
        Id,
        Name,
        AssetType,
        Make,
        IsActive,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum OperatingSystems {
        Table,
        Id,
        Name,
        Version,
        CreatedAt,
    }
}

mod m20240101_000002_create_purchase_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_purchase_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::PoNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::AcquisitionType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::InvoiceNumber).string().null())
                        .col(ColumnDef::new(PurchaseOrders::AcquisitionDate).date().null())
                        .col(ColumnDef::new(PurchaseOrders::VendorId).uuid().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::OwnerType)
                                .string_len(32)
                                .null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::LeaseEndDate).date().null())
                        .col(ColumnDef::new(PurchaseOrders::RentalAmount).decimal().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::MinContractPeriod)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::AcquisitionPrice)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::DepreciationPct)
                                .decimal()
                                .null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::CurrentPrice).decimal().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalDevices)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PurchaseOrders::WarrantyExpiry).date().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_vendor_id")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::VendorId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PurchaseOrders {
        Table,
        Id,
        PoNumber,
        AcquisitionType,
        InvoiceNumber,
        AcquisitionDate,
        VendorId,
        OwnerType,
        LeaseEndDate,
        RentalAmount,
        MinContractPeriod,
        AcquisitionPrice,
        DepreciationPct,
        CurrentPrice,
        TotalDevices,
        WarrantyExpiry,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_assets_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_assets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Assets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Assets::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Assets::Name).string().not_null())
                        .col(
                            ColumnDef::new(Assets::SerialNumber)
                                .string()
                                .null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Assets::AssetCode)
                                .string()
                                .null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Assets::Status).string_len(32).not_null())
                        // Plain value reference to purchase_orders.po_number;
                        // deliberately no foreign key constraint.
                        .col(ColumnDef::new(Assets::PoNumber).string().null())
                        .col(ColumnDef::new(Assets::AssignedUserId).uuid().null())
                        .col(ColumnDef::new(Assets::ModelId).uuid().null())
                        .col(ColumnDef::new(Assets::AssetType).string().null())
                        .col(ColumnDef::new(Assets::Make).string().null())
                        .col(ColumnDef::new(Assets::OsId).uuid().null())
                        .col(ColumnDef::new(Assets::VendorId).uuid().null())
                        .col(ColumnDef::new(Assets::InvoiceNumber).string().null())
                        .col(ColumnDef::new(Assets::AcquisitionDate).date().null())
                        .col(
                            ColumnDef::new(Assets::AcquisitionType)
                                .string_len(32)
                                .null(),
                        )
                        .col(ColumnDef::new(Assets::OwnerType).string_len(32).null())
                        .col(ColumnDef::new(Assets::LeaseEndDate).date().null())
                        .col(ColumnDef::new(Assets::RentalAmount).decimal().null())
                        .col(ColumnDef::new(Assets::MinContractPeriod).integer().null())
                        .col(ColumnDef::new(Assets::AcquisitionPrice).decimal().null())
                        .col(ColumnDef::new(Assets::DepreciationPct).decimal().null())
                        .col(ColumnDef::new(Assets::CurrentPrice).decimal().null())
                        .col(ColumnDef::new(Assets::WarrantyExpiry).date().null())
                        .col(
                            ColumnDef::new(Assets::IsDeleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Assets::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Assets::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assets_po_number")
                        .table(Assets::Table)
                        .col(Assets::PoNumber)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assets_is_deleted")
                        .table(Assets::Table)
                        .col(Assets::IsDeleted)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assets_assigned_user_id")
                        .table(Assets::Table)
                        .col(Assets::AssignedUserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Assets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Assets {
        Table,
        Id,
        Name,
        SerialNumber,
        AssetCode,
        Status,
        PoNumber,
        AssignedUserId,
        ModelId,
        AssetType,
        Make,
        OsId,
        VendorId,
        InvoiceNumber,
        AcquisitionDate,
        AcquisitionType,
        OwnerType,
        LeaseEndDate,
        RentalAmount,
        MinContractPeriod,
        AcquisitionPrice,
        DepreciationPct,
        CurrentPrice,
        WarrantyExpiry,
        IsDeleted,
        CreatedAt,
        UpdatedAt,
    }
}
