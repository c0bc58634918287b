use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AcquisitionType, OwnerType};

/// A purchase order. `po_number` is the human-readable natural key; it is
/// unique at any instant but mutable, and assets reference it by value.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub po_number: String,
    pub acquisition_type: AcquisitionType,
    pub invoice_number: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub vendor_id: Option<Uuid>,
    pub owner_type: Option<OwnerType>,
    pub lease_end_date: Option<NaiveDate>,
    pub rental_amount: Option<Decimal>,
    pub min_contract_period: Option<i32>,
    pub acquisition_price: Option<Decimal>,
    pub depreciation_pct: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub total_devices: i32,
    pub warranty_expiry: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
