use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AcquisitionType, AssetStatus, OwnerType};

/// A tracked asset.
///
/// `po_number` is a plain value copy of the owning purchase order's natural
/// key, deliberately not a database foreign key. Every write to it goes
/// through the field synchronizer or the PO migration/deletion commands;
/// no other code path touches the column.
///
/// The acquisition fields (invoice number, dates, owner type, lease terms,
/// pricing) are cached copies of the PO's shared fields, re-synchronized
/// whenever the source PO changes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub serial_number: Option<String>,
    #[sea_orm(unique)]
    pub asset_code: Option<String>,
    pub status: AssetStatus,
    pub po_number: Option<String>,
    pub assigned_user_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub asset_type: Option<String>,
    pub make: Option<String>,
    pub os_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub acquisition_type: Option<AcquisitionType>,
    pub owner_type: Option<OwnerType>,
    pub lease_end_date: Option<NaiveDate>,
    pub rental_amount: Option<Decimal>,
    pub min_contract_period: Option<i32>,
    pub acquisition_price: Option<Decimal>,
    pub depreciation_pct: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub warranty_expiry: Option<NaiveDate>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::asset_model::Entity",
        from = "Column::ModelId",
        to = "super::asset_model::Column::Id"
    )]
    AssetModel,
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedUserId",
        to = "super::user::Column::Id"
    )]
    AssignedUser,
    #[sea_orm(
        belongs_to = "super::operating_system::Entity",
        from = "Column::OsId",
        to = "super::operating_system::Column::Id"
    )]
    OperatingSystem,
}

impl Related<super::asset_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssetModel.def()
    }
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedUser.def()
    }
}

impl Related<super::operating_system::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperatingSystem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Display identifier used in reports and batch outcomes: serial number
    /// when present, else the asset name.
    pub fn display_identifier(&self) -> &str {
        self.serial_number.as_deref().unwrap_or(&self.name)
    }
}
