use crate::{
    commands::Command,
    db::DbPool,
    entities::enums::{AcquisitionType, OwnerType},
    entities::{purchase_order, vendor},
    errors::ServiceError,
    events::{Event, EventSender},
    services::asset_sync,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
    TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Partial update for a purchase order. A present field is written; an
/// absent field keeps its stored value. Changing `po_number` routes the
/// whole update through the in-place key migration ordering: assets are
/// repointed before the PO row is renamed.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderPatch {
    pub po_number: Option<String>,
    pub acquisition_type: Option<String>,
    pub invoice_number: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub vendor_id: Option<Uuid>,
    pub owner_type: Option<String>,
    pub lease_end_date: Option<NaiveDate>,
    pub rental_amount: Option<Decimal>,
    pub min_contract_period: Option<i32>,
    pub acquisition_price: Option<Decimal>,
    pub depreciation_pct: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub total_devices: Option<i32>,
    pub warranty_expiry: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatePurchaseOrderCommand {
    pub id: Uuid,
    pub patch: PurchaseOrderPatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePurchaseOrderResult {
    pub purchase_order: purchase_order::Model,
    /// Assets repointed to a new PO number; zero when the number is unchanged.
    pub assets_repointed: u64,
    /// Assets whose cached shared fields were rewritten by the sync pass.
    pub assets_synced: u64,
}

#[async_trait::async_trait]
impl Command for UpdatePurchaseOrderCommand {
    type Result = UpdatePurchaseOrderResult;

    #[instrument(skip(self, db_pool, event_sender), fields(purchase_order_id = %self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        // Enum fields are parsed up front so a bad value fails before the
        // transaction opens.
        let acquisition_type = self
            .patch
            .acquisition_type
            .as_deref()
            .map(AcquisitionType::parse)
            .transpose()?;
        let owner_type = self
            .patch
            .owner_type
            .as_deref()
            .map(OwnerType::parse)
            .transpose()?;

        let id = self.id;
        let patch = self.patch.clone();
        let db = db_pool.as_ref();

        let result = db
            .transaction::<_, UpdatePurchaseOrderResult, ServiceError>(move |txn| {
                Box::pin(async move {
                    let po = purchase_order::Entity::find_by_id(id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::from_db_err)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Purchase order {} does not exist", id))
                        })?;

                    if let Some(vendor_id) = patch.vendor_id {
                        vendor::Entity::find_by_id(vendor_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::from_db_err)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Vendor {} does not exist",
                                    vendor_id
                                ))
                            })?;
                    }

                    let old_number = po.po_number.clone();
                    let new_number = patch
                        .po_number
                        .as_deref()
                        .map(str::trim)
                        .filter(|n| !n.is_empty() && *n != old_number)
                        .map(str::to_string);

                    let mut assets_repointed = 0;
                    if let Some(new_number) = &new_number {
                        let collision = purchase_order::Entity::find()
                            .filter(purchase_order::Column::PoNumber.eq(new_number.as_str()))
                            .one(txn)
                            .await
                            .map_err(ServiceError::from_db_err)?;
                        if collision.is_some() {
                            return Err(ServiceError::Conflict(format!(
                                "Purchase order '{}' already exists",
                                new_number
                            )));
                        }

                        // FK-first ordering: dependents move before the key
                        // changes.
                        assets_repointed =
                            asset_sync::repoint_assets(txn, &old_number, new_number).await?;
                    }

                    let mut am = po.into_active_model();
                    if let Some(new_number) = &new_number {
                        am.po_number = Set(new_number.clone());
                    }
                    if let Some(value) = acquisition_type {
                        am.acquisition_type = Set(value);
                    }
                    if let Some(value) = owner_type {
                        am.owner_type = Set(Some(value));
                    }
                    if let Some(value) = patch.invoice_number.clone() {
                        am.invoice_number = Set(Some(value));
                    }
                    if let Some(value) = patch.acquisition_date {
                        am.acquisition_date = Set(Some(value));
                    }
                    if let Some(value) = patch.vendor_id {
                        am.vendor_id = Set(Some(value));
                    }
                    if let Some(value) = patch.lease_end_date {
                        am.lease_end_date = Set(Some(value));
                    }
                    if let Some(value) = patch.rental_amount {
                        am.rental_amount = Set(Some(value));
                    }
                    if let Some(value) = patch.min_contract_period {
                        am.min_contract_period = Set(Some(value));
                    }
                    if let Some(value) = patch.acquisition_price {
                        am.acquisition_price = Set(Some(value));
                    }
                    if let Some(value) = patch.depreciation_pct {
                        am.depreciation_pct = Set(Some(value));
                    }
                    if let Some(value) = patch.current_price {
                        am.current_price = Set(Some(value));
                    }
                    if let Some(value) = patch.total_devices {
                        if value < 0 {
                            return Err(ServiceError::ValidationError(
                                "Device quota cannot be negative".to_string(),
                            ));
                        }
                        am.total_devices = Set(value);
                    }
                    if let Some(value) = patch.warranty_expiry {
                        am.warranty_expiry = Set(Some(value));
                    }
                    am.updated_at = Set(Utc::now());

                    let updated = am.update(txn).await.map_err(ServiceError::from_db_err)?;

                    let assets_synced = asset_sync::sync_po_fields(txn, &updated).await?;

                    Ok(UpdatePurchaseOrderResult {
                        purchase_order: updated,
                        assets_repointed,
                        assets_synced,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::from_db_err(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            purchase_order_id = %result.purchase_order.id,
            po_number = %result.purchase_order.po_number,
            assets_repointed = result.assets_repointed,
            assets_synced = result.assets_synced,
            "Purchase order updated"
        );

        event_sender
            .send_lossy(Event::PurchaseOrderUpdated(result.purchase_order.id))
            .await;
        if result.assets_repointed > 0 {
            event_sender
                .send_lossy(Event::AssetsSynced {
                    po_number: result.purchase_order.po_number.clone(),
                    assets_updated: result.assets_synced,
                })
                .await;
        }

        Ok(result)
    }
}
