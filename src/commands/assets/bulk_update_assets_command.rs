use crate::{
    commands::assets::{item_identifier, BatchOutcome, ItemFailure, ItemOutcome},
    commands::Command,
    db::DbPool,
    entities::enums::AssetStatus,
    entities::{asset, asset_model, operating_system, purchase_order, user, vendor},
    errors::ServiceError,
    events::{Event, EventSender},
    services::asset_sync,
};
use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref BULK_UPDATE_ITEMS: IntCounter = IntCounter::new(
        "asset_bulk_update_items_total",
        "Total asset items processed by bulk update"
    )
    .expect("metric can be created");
    static ref BULK_UPDATE_FAILURES: IntCounter = IntCounter::new(
        "asset_bulk_update_failures_total",
        "Asset items that failed bulk update"
    )
    .expect("metric can be created");
}

/// Partial update for one asset. A present field is written; an absent
/// field keeps its stored value. Repointing `po_number` also refreshes the
/// asset's cached copies of the new PO's shared fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetUpdateInput {
    pub id: Uuid,
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub asset_code: Option<String>,
    pub status: Option<String>,
    pub po_number: Option<String>,
    pub assigned_user_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub asset_type: Option<String>,
    pub make: Option<String>,
    pub os_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub warranty_expiry: Option<NaiveDate>,
}

/// Applies an ordered batch of asset updates with the same per-item
/// isolation semantics as bulk creation.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BulkUpdateAssetsCommand {
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<AssetUpdateInput>,
}

async fn process_update_item<C: ConnectionTrait>(
    txn: &C,
    item: &AssetUpdateInput,
) -> Result<asset::Model, ItemFailure> {
    let existing = asset::Entity::find_by_id(item.id)
        .filter(asset::Column::IsDeleted.eq(false))
        .one(txn)
        .await
        .map_err(ItemFailure::from)?
        .ok_or_else(|| {
            ItemFailure::missing_reference("id", format!("Asset {} does not exist", item.id))
        })?;

    let status = item
        .status
        .as_deref()
        .map(AssetStatus::parse)
        .transpose()
        .map_err(ItemFailure::from_service_error)?;

    // A repointed asset picks up the target PO's shared fields in the same
    // write, keeping the cached copies consistent.
    let new_po = match item.po_number.as_deref().map(str::trim) {
        Some(number) if !number.is_empty() && Some(number) != existing.po_number.as_deref() => {
            let found = purchase_order::Entity::find()
                .filter(purchase_order::Column::PoNumber.eq(number))
                .one(txn)
                .await
                .map_err(ItemFailure::from)?
                .ok_or_else(|| {
                    ItemFailure::missing_reference(
                        "po_number",
                        format!("Purchase order '{}' does not exist", number),
                    )
                })?;
            Some(found)
        }
        _ => None,
    };

    let model = match item.model_id {
        Some(model_id) if Some(model_id) != existing.model_id => Some(
            asset_model::Entity::find_by_id(model_id)
                .one(txn)
                .await
                .map_err(ItemFailure::from)?
                .ok_or_else(|| {
                    ItemFailure::missing_reference(
                        "model_id",
                        format!("Model {} does not exist", model_id),
                    )
                })?,
        ),
        _ => None,
    };

    if let Some(os_id) = item.os_id {
        operating_system::Entity::find_by_id(os_id)
            .one(txn)
            .await
            .map_err(ItemFailure::from)?
            .ok_or_else(|| {
                ItemFailure::missing_reference(
                    "os_id",
                    format!("Operating system {} does not exist", os_id),
                )
            })?;
    }

    if let Some(vendor_id) = item.vendor_id {
        vendor::Entity::find_by_id(vendor_id)
            .one(txn)
            .await
            .map_err(ItemFailure::from)?
            .ok_or_else(|| {
                ItemFailure::missing_reference(
                    "vendor_id",
                    format!("Vendor {} does not exist", vendor_id),
                )
            })?;
    }

    if let Some(user_id) = item.assigned_user_id {
        user::Entity::find_by_id(user_id)
            .one(txn)
            .await
            .map_err(ItemFailure::from)?
            .ok_or_else(|| {
                ItemFailure::missing_reference(
                    "assigned_user_id",
                    format!("User {} does not exist", user_id),
                )
            })?;
    }

    let mut am = existing.into_active_model();

    if let Some(name) = item.name.as_deref() {
        let name = name.trim();
        if name.is_empty() {
            return Err(ItemFailure::validation("name", "Asset name cannot be empty"));
        }
        am.name = Set(name.to_string());
    }
    if let Some(serial) = item.serial_number.as_deref() {
        let serial = serial.trim();
        if serial.is_empty() {
            return Err(ItemFailure::validation(
                "serial_number",
                "Serial number cannot be empty",
            ));
        }
        am.serial_number = Set(Some(serial.to_string()));
    }
    if let Some(code) = item.asset_code.as_deref() {
        let code = code.trim();
        if code.is_empty() {
            return Err(ItemFailure::validation(
                "asset_code",
                "Asset code cannot be empty",
            ));
        }
        am.asset_code = Set(Some(code.to_string()));
    }
    if let Some(status) = status {
        am.status = Set(status);
    }
    if let Some(user_id) = item.assigned_user_id {
        am.assigned_user_id = Set(Some(user_id));
    }
    if let Some(model_id) = item.model_id {
        am.model_id = Set(Some(model_id));
    }
    if let Some(model) = &model {
        // Re-derive the denormalized catalog fields unless the item
        // overrides them explicitly.
        am.asset_type = Set(Some(
            item.asset_type.clone().unwrap_or_else(|| model.asset_type.clone()),
        ));
        am.make = Set(Some(item.make.clone().unwrap_or_else(|| model.make.clone())));
    } else {
        if let Some(asset_type) = item.asset_type.clone() {
            am.asset_type = Set(Some(asset_type));
        }
        if let Some(make) = item.make.clone() {
            am.make = Set(Some(make));
        }
    }
    if let Some(os_id) = item.os_id {
        am.os_id = Set(Some(os_id));
    }
    if let Some(vendor_id) = item.vendor_id {
        am.vendor_id = Set(Some(vendor_id));
    }
    if let Some(warranty) = item.warranty_expiry {
        am.warranty_expiry = Set(Some(warranty));
    }
    if let Some(po) = &new_po {
        let shared = asset_sync::PoSharedFields::from_po(po);
        am.po_number = Set(Some(po.po_number.clone()));
        am.invoice_number = Set(shared.invoice_number.clone());
        am.acquisition_date = Set(shared.acquisition_date);
        am.acquisition_type = Set(Some(shared.acquisition_type));
        am.owner_type = Set(shared.owner_type);
        am.lease_end_date = Set(shared.lease_end_date);
        am.rental_amount = Set(shared.rental_amount);
        am.min_contract_period = Set(shared.min_contract_period);
        am.acquisition_price = Set(shared.acquisition_price);
        am.depreciation_pct = Set(shared.depreciation_pct);
        am.current_price = Set(shared.current_price);
        if item.warranty_expiry.is_none() {
            am.warranty_expiry = Set(shared.warranty_expiry);
        }
    }
    am.updated_at = Set(Utc::now());

    am.update(txn).await.map_err(ItemFailure::from)
}

#[async_trait::async_trait]
impl Command for BulkUpdateAssetsCommand {
    type Result = BatchOutcome;

    #[instrument(skip(self, db_pool, event_sender), fields(items = self.items.len()))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid input: {}", e)))?;

        let db = db_pool.as_ref();
        let mut results = Vec::with_capacity(self.items.len());

        for (index, item) in self.items.iter().enumerate() {
            let identifier = item_identifier(
                item.serial_number.as_deref(),
                item.name.as_deref(),
                index,
            );

            let item_cloned = item.clone();
            let attempt = db
                .transaction::<_, asset::Model, ItemFailure>(move |txn| {
                    Box::pin(async move { process_update_item(txn, &item_cloned).await })
                })
                .await;

            BULK_UPDATE_ITEMS.inc();

            match attempt {
                Ok(updated) => {
                    event_sender.send_lossy(Event::AssetUpdated(updated.id)).await;
                    event_sender
                        .send_lossy(Event::AssetAudit {
                            asset_id: updated.id,
                            user_id: updated.assigned_user_id,
                            action: "ASSET_UPDATED".to_string(),
                            details: format!("asset '{}' updated via bulk update", identifier),
                        })
                        .await;
                    results.push(ItemOutcome {
                        index,
                        identifier,
                        asset_id: Some(updated.id),
                        failure: None,
                    });
                }
                Err(err) => {
                    BULK_UPDATE_FAILURES.inc();
                    let failure = match err {
                        TransactionError::Connection(db_err) => ItemFailure::from(db_err),
                        TransactionError::Transaction(failure) => failure,
                    };
                    warn!(
                        index,
                        identifier = %identifier,
                        kind = ?failure.kind,
                        message = %failure.message,
                        "bulk asset update item failed"
                    );
                    results.push(ItemOutcome {
                        index,
                        identifier,
                        asset_id: None,
                        failure: Some(failure),
                    });
                }
            }
        }

        let outcome = BatchOutcome::from_results(results, None);
        info!(
            total = outcome.total,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            disposition = ?outcome.disposition,
            "bulk asset update complete"
        );

        Ok(outcome)
    }
}
