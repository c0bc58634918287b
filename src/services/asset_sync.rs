//! Purchase-order field synchronization.
//!
//! Assets carry cached copies of their purchase order's shared fields.
//! This module is the single write path for those copies: it computes a
//! field-by-field diff per asset and persists only the assets that
//! actually changed, which keeps the pass idempotent: a second run with
//! an unchanged PO writes nothing.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::debug;

use crate::entities::enums::{AcquisitionType, OwnerType};
use crate::entities::{asset, purchase_order};
use crate::errors::ServiceError;

/// Snapshot of the PO fields that are mirrored onto linked assets.
#[derive(Debug, Clone, PartialEq)]
pub struct PoSharedFields {
    pub invoice_number: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub acquisition_type: AcquisitionType,
    pub owner_type: Option<OwnerType>,
    pub lease_end_date: Option<NaiveDate>,
    pub rental_amount: Option<Decimal>,
    pub min_contract_period: Option<i32>,
    pub acquisition_price: Option<Decimal>,
    pub depreciation_pct: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub warranty_expiry: Option<NaiveDate>,
}

impl PoSharedFields {
    pub fn from_po(po: &purchase_order::Model) -> Self {
        Self {
            invoice_number: po.invoice_number.clone(),
            acquisition_date: po.acquisition_date,
            acquisition_type: po.acquisition_type,
            owner_type: po.owner_type,
            lease_end_date: po.lease_end_date,
            rental_amount: po.rental_amount,
            min_contract_period: po.min_contract_period,
            acquisition_price: po.acquisition_price,
            depreciation_pct: po.depreciation_pct,
            current_price: po.current_price,
            warranty_expiry: po.warranty_expiry,
        }
    }

    /// Builds a partial update for `asset` containing exactly the shared
    /// fields whose cached value differs from this snapshot. Returns `None`
    /// when the asset is already consistent.
    pub fn diff_against(&self, asset: &asset::Model) -> Option<asset::ActiveModel> {
        let mut patch = asset::ActiveModel {
            id: Set(asset.id),
            ..Default::default()
        };
        let mut changed = false;

        if asset.invoice_number != self.invoice_number {
            patch.invoice_number = Set(self.invoice_number.clone());
            changed = true;
        }
        if asset.acquisition_date != self.acquisition_date {
            patch.acquisition_date = Set(self.acquisition_date);
            changed = true;
        }
        if asset.acquisition_type != Some(self.acquisition_type) {
            patch.acquisition_type = Set(Some(self.acquisition_type));
            changed = true;
        }
        if asset.owner_type != self.owner_type {
            patch.owner_type = Set(self.owner_type);
            changed = true;
        }
        if asset.lease_end_date != self.lease_end_date {
            patch.lease_end_date = Set(self.lease_end_date);
            changed = true;
        }
        if asset.rental_amount != self.rental_amount {
            patch.rental_amount = Set(self.rental_amount);
            changed = true;
        }
        if asset.min_contract_period != self.min_contract_period {
            patch.min_contract_period = Set(self.min_contract_period);
            changed = true;
        }
        if asset.acquisition_price != self.acquisition_price {
            patch.acquisition_price = Set(self.acquisition_price);
            changed = true;
        }
        if asset.depreciation_pct != self.depreciation_pct {
            patch.depreciation_pct = Set(self.depreciation_pct);
            changed = true;
        }
        if asset.current_price != self.current_price {
            patch.current_price = Set(self.current_price);
            changed = true;
        }
        if asset.warranty_expiry != self.warranty_expiry {
            patch.warranty_expiry = Set(self.warranty_expiry);
            changed = true;
        }

        if changed {
            patch.updated_at = Set(Utc::now());
            Some(patch)
        } else {
            None
        }
    }
}

/// Pushes the PO's shared fields onto every non-deleted asset referencing
/// `po.po_number`. Returns the number of assets actually written.
pub async fn sync_po_fields<C: ConnectionTrait>(
    conn: &C,
    po: &purchase_order::Model,
) -> Result<u64, ServiceError> {
    sync_po_fields_matching(conn, po, &po.po_number).await
}

/// Same as [`sync_po_fields`] but matches assets against an explicit
/// number; used while a migration is part-way through repointing.
pub async fn sync_po_fields_matching<C: ConnectionTrait>(
    conn: &C,
    po: &purchase_order::Model,
    po_number: &str,
) -> Result<u64, ServiceError> {
    let shared = PoSharedFields::from_po(po);

    let assets = asset::Entity::find()
        .filter(asset::Column::PoNumber.eq(po_number))
        .filter(asset::Column::IsDeleted.eq(false))
        .all(conn)
        .await
        .map_err(ServiceError::from_db_err)?;

    let mut updated: u64 = 0;
    for existing in &assets {
        if let Some(patch) = shared.diff_against(existing) {
            patch.update(conn).await.map_err(ServiceError::from_db_err)?;
            updated += 1;
        }
    }

    debug!(
        po_number = %po_number,
        assets_seen = assets.len(),
        assets_updated = updated,
        "purchase order field sync complete"
    );

    Ok(updated)
}

/// Repoints every non-deleted asset from `old_number` to `new_number`.
/// Only the migration workflow may call this; it is the sole write path
/// for `assets.po_number` outside asset creation itself.
pub async fn repoint_assets<C: ConnectionTrait>(
    conn: &C,
    old_number: &str,
    new_number: &str,
) -> Result<u64, ServiceError> {
    let result = asset::Entity::update_many()
        .col_expr(asset::Column::PoNumber, Expr::value(new_number))
        .col_expr(asset::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(asset::Column::PoNumber.eq(old_number))
        .filter(asset::Column::IsDeleted.eq(false))
        .exec(conn)
        .await
        .map_err(ServiceError::from_db_err)?;

    Ok(result.rows_affected)
}

/// Counts non-deleted assets referencing the given PO number.
pub async fn count_linked_assets<C: ConnectionTrait>(
    conn: &C,
    po_number: &str,
) -> Result<u64, ServiceError> {
    use sea_orm::PaginatorTrait;

    asset::Entity::find()
        .filter(asset::Column::PoNumber.eq(po_number))
        .filter(asset::Column::IsDeleted.eq(false))
        .count(conn)
        .await
        .map_err(ServiceError::from_db_err)
}
