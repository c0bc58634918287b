use crate::{
    commands::assets::{
        first_validation_failure, item_identifier, BatchOutcome, CapacityNote, ItemFailure,
        ItemOutcome,
    },
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
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref BULK_CREATE_ITEMS: IntCounter = IntCounter::new(
        "asset_bulk_create_items_total",
        "Total asset items processed by bulk creation"
    )
    .expect("metric can be created");
    static ref BULK_CREATE_FAILURES: IntCounter = IntCounter::new(
        "asset_bulk_create_failures_total",
        "Asset items that failed bulk creation"
    )
    .expect("metric can be created");
}

/// One asset to create. Unset optional fields fall back to the scoped
/// purchase order's values where one applies.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAssetInput {
    #[validate(length(min = 1, message = "Asset name is required"))]
    pub name: String,
    pub serial_number: Option<String>,
    pub asset_code: Option<String>,
    /// Free-form status; normalized, defaults to IN_STOCK.
    pub status: Option<String>,
    pub po_number: Option<String>,
    pub assigned_user_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    /// Overrides the type inferred from the model.
    pub asset_type: Option<String>,
    /// Overrides the make inferred from the model.
    pub make: Option<String>,
    pub os_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub warranty_expiry: Option<NaiveDate>,
}

/// Creates an ordered batch of assets with per-item failure isolation:
/// every item is attempted, each in its own transaction, and the outcome
/// report carries one entry per input item.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BulkCreateAssetsCommand {
    /// When set, the batch is scoped to this PO: its existence is checked
    /// once up front and its number is injected into every item.
    pub po_number: Option<String>,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<NewAssetInput>,
}

async fn process_create_item<C: ConnectionTrait>(
    txn: &C,
    item: &NewAssetInput,
    scoped_po: Option<&purchase_order::Model>,
) -> Result<asset::Model, ItemFailure> {
    item.validate().map_err(|e| first_validation_failure(&e))?;

    let status = match item.status.as_deref() {
        Some(raw) => AssetStatus::parse(raw).map_err(ItemFailure::from_service_error)?,
        None => AssetStatus::InStock,
    };

    // Resolve the owning PO: the scoped one, or the item's own reference.
    let po = match (scoped_po, item.po_number.as_deref()) {
        (Some(po), _) => Some(po.clone()),
        (None, Some(number)) if !number.trim().is_empty() => {
            let number = number.trim();
            let found = purchase_order::Entity::find()
                .filter(purchase_order::Column::PoNumber.eq(number))
                .one(txn)
                .await
                .map_err(ItemFailure::from)?;
            Some(found.ok_or_else(|| {
                ItemFailure::missing_reference(
                    "po_number",
                    format!("Purchase order '{}' does not exist", number),
                )
            })?)
        }
        _ => None,
    };

    // Cross-entity defaults: the model catalog supplies type and make.
    let model = match item.model_id {
        Some(model_id) => Some(
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
        None => None,
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

    let shared = po.as_ref().map(asset_sync::PoSharedFields::from_po);

    let asset_type = item
        .asset_type
        .clone()
        .or_else(|| model.as_ref().map(|m| m.asset_type.clone()));
    let make = item
        .make
        .clone()
        .or_else(|| model.as_ref().map(|m| m.make.clone()));
    let vendor_id = item.vendor_id.or_else(|| po.as_ref().and_then(|p| p.vendor_id));

    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let now = Utc::now();
    let new_asset = asset::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(item.name.trim().to_string()),
        serial_number: Set(non_empty(&item.serial_number)),
        asset_code: Set(non_empty(&item.asset_code)),
        status: Set(status),
        po_number: Set(po.as_ref().map(|p| p.po_number.clone())),
        assigned_user_id: Set(item.assigned_user_id),
        model_id: Set(item.model_id),
        asset_type: Set(asset_type),
        make: Set(make),
        os_id: Set(item.os_id),
        vendor_id: Set(vendor_id),
        invoice_number: Set(shared.as_ref().and_then(|s| s.invoice_number.clone())),
        acquisition_date: Set(shared.as_ref().and_then(|s| s.acquisition_date)),
        acquisition_type: Set(shared.as_ref().map(|s| s.acquisition_type)),
        owner_type: Set(shared.as_ref().and_then(|s| s.owner_type)),
        lease_end_date: Set(shared.as_ref().and_then(|s| s.lease_end_date)),
        rental_amount: Set(shared.as_ref().and_then(|s| s.rental_amount)),
        min_contract_period: Set(shared.as_ref().and_then(|s| s.min_contract_period)),
        acquisition_price: Set(shared.as_ref().and_then(|s| s.acquisition_price)),
        depreciation_pct: Set(shared.as_ref().and_then(|s| s.depreciation_pct)),
        current_price: Set(shared.as_ref().and_then(|s| s.current_price)),
        warranty_expiry: Set(item
            .warranty_expiry
            .or_else(|| shared.as_ref().and_then(|s| s.warranty_expiry))),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_asset.insert(txn).await.map_err(ItemFailure::from)
}

#[async_trait::async_trait]
impl Command for BulkCreateAssetsCommand {
    type Result = BatchOutcome;

    #[instrument(skip(self, db_pool, event_sender), fields(items = self.items.len(), scoped_po = ?self.po_number))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid input: {}", e)))?;

        let db = db_pool.as_ref();

        // PO existence for a scoped batch is validated once, up front, and
        // is fatal to the whole call rather than per item.
        let (scoped_po, capacity) = match self.po_number.as_deref().map(str::trim) {
            Some(number) if !number.is_empty() => {
                let po = purchase_order::Entity::find()
                    .filter(purchase_order::Column::PoNumber.eq(number))
                    .one(db)
                    .await
                    .map_err(ServiceError::from_db_err)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Purchase order '{}' does not exist",
                            number
                        ))
                    })?;

                let linked = asset_sync::count_linked_assets(db, &po.po_number).await?;
                let remaining = (po.total_devices as i64 - linked as i64).max(0) as u64;
                let note = CapacityNote {
                    total_devices: po.total_devices,
                    linked_before: linked,
                    remaining_before: remaining,
                    requested: self.items.len(),
                    can_create_more: remaining > 0,
                };
                if (self.items.len() as u64) > remaining {
                    warn!(
                        po_number = %po.po_number,
                        remaining,
                        requested = self.items.len(),
                        "batch exceeds PO device quota (advisory only)"
                    );
                }
                (Some(po), Some(note))
            }
            _ => (None, None),
        };

        let mut results = Vec::with_capacity(self.items.len());

        for (index, item) in self.items.iter().enumerate() {
            let identifier =
                item_identifier(item.serial_number.as_deref(), Some(&item.name), index);

            // Each item gets its own transaction so one failure cannot
            // poison its siblings' writes.
            let item_cloned = item.clone();
            let po_cloned = scoped_po.clone();
            let attempt = db
                .transaction::<_, asset::Model, ItemFailure>(move |txn| {
                    Box::pin(async move {
                        process_create_item(txn, &item_cloned, po_cloned.as_ref()).await
                    })
                })
                .await;

            BULK_CREATE_ITEMS.inc();

            match attempt {
                Ok(created) => {
                    event_sender.send_lossy(Event::AssetCreated(created.id)).await;
                    event_sender
                        .send_lossy(Event::AssetAudit {
                            asset_id: created.id,
                            user_id: created.assigned_user_id,
                            action: "ASSET_CREATED".to_string(),
                            details: format!("asset '{}' created via bulk ingestion", identifier),
                        })
                        .await;
                    results.push(ItemOutcome {
                        index,
                        identifier,
                        asset_id: Some(created.id),
                        failure: None,
                    });
                }
                Err(err) => {
                    BULK_CREATE_FAILURES.inc();
                    let failure = match err {
                        TransactionError::Connection(db_err) => ItemFailure::from(db_err),
                        TransactionError::Transaction(failure) => failure,
                    };
                    warn!(
                        index,
                        identifier = %identifier,
                        kind = ?failure.kind,
                        message = %failure.message,
                        "bulk asset creation item failed"
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

        let outcome = BatchOutcome::from_results(results, capacity);
        info!(
            total = outcome.total,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            disposition = ?outcome.disposition,
            "bulk asset creation complete"
        );

        Ok(outcome)
    }
}
