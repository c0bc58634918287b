use crate::{
    commands::Command,
    db::DbPool,
    entities::purchase_order,
    errors::ServiceError,
    events::{Event, EventSender},
    services::asset_sync,
};
use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
    TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

lazy_static! {
    static ref PO_MIGRATIONS: IntCounter = IntCounter::new(
        "po_number_migrations_total",
        "Total number of completed PO number migrations"
    )
    .expect("metric can be created");
    static ref PO_MIGRATION_FAILURES: IntCounter = IntCounter::new(
        "po_number_migration_failures_total",
        "Total number of failed PO number migrations"
    )
    .expect("metric can be created");
}

/// How the rename is carried out. Both strategies produce the same
/// externally observable end state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MigrationStrategy {
    /// Repoint assets to the new number first, then rename the PO row in
    /// place. At no committed point does an asset reference a missing
    /// number, and no two POs ever share one.
    #[default]
    InPlace,
    /// Insert a copy of the PO under the new number, repoint the assets,
    /// then delete the old row. The old and new PO coexist momentarily
    /// (different numbers, so no uniqueness conflict); the final delete is
    /// unconditional once the repoint has run.
    CopyAndSwap,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MigratePoNumberCommand {
    pub old_number: String,
    pub new_number: String,
    #[serde(default)]
    pub strategy: MigrationStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigratePoNumberResult {
    pub purchase_order: purchase_order::Model,
    /// Number of assets repointed from the old number, returned for audit.
    pub assets_repointed: u64,
}

#[async_trait::async_trait]
impl Command for MigratePoNumberCommand {
    type Result = MigratePoNumberResult;

    #[instrument(skip(self, db_pool, event_sender), fields(old = %self.old_number, new = %self.new_number))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let old_number = self.old_number.trim().to_string();
        let new_number = self.new_number.trim().to_string();

        if old_number.is_empty() || new_number.is_empty() {
            return Err(ServiceError::ValidationError(
                "PO numbers cannot be empty".to_string(),
            ));
        }
        if old_number == new_number {
            return Err(ServiceError::InvalidOperation(
                "old and new PO numbers are identical".to_string(),
            ));
        }

        let strategy = self.strategy;
        let db = db_pool.as_ref();

        let result = db
            .transaction::<_, MigratePoNumberResult, ServiceError>(move |txn| {
                Box::pin(async move {
                    // Collision check before any mutation. Concurrent
                    // migrations to the same number race on the unique
                    // index; exactly one commit wins.
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

                    let po = purchase_order::Entity::find()
                        .filter(purchase_order::Column::PoNumber.eq(old_number.as_str()))
                        .one(txn)
                        .await
                        .map_err(ServiceError::from_db_err)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Purchase order '{}' does not exist",
                                old_number
                            ))
                        })?;

                    let migrated = match strategy {
                        MigrationStrategy::InPlace => {
                            let repointed =
                                asset_sync::repoint_assets(txn, &old_number, &new_number).await?;

                            let mut am = po.into_active_model();
                            am.po_number = Set(new_number.clone());
                            am.updated_at = Set(Utc::now());
                            let renamed =
                                am.update(txn).await.map_err(ServiceError::from_db_err)?;

                            MigratePoNumberResult {
                                purchase_order: renamed,
                                assets_repointed: repointed,
                            }
                        }
                        MigrationStrategy::CopyAndSwap => {
                            let replacement = purchase_order::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                po_number: Set(new_number.clone()),
                                acquisition_type: Set(po.acquisition_type),
                                invoice_number: Set(po.invoice_number.clone()),
                                acquisition_date: Set(po.acquisition_date),
                                vendor_id: Set(po.vendor_id),
                                owner_type: Set(po.owner_type),
                                lease_end_date: Set(po.lease_end_date),
                                rental_amount: Set(po.rental_amount),
                                min_contract_period: Set(po.min_contract_period),
                                acquisition_price: Set(po.acquisition_price),
                                depreciation_pct: Set(po.depreciation_pct),
                                current_price: Set(po.current_price),
                                total_devices: Set(po.total_devices),
                                warranty_expiry: Set(po.warranty_expiry),
                                created_at: Set(po.created_at),
                                updated_at: Set(Utc::now()),
                            };
                            let replacement = replacement
                                .insert(txn)
                                .await
                                .map_err(ServiceError::from_db_err)?;

                            let repointed =
                                asset_sync::repoint_assets(txn, &old_number, &new_number).await?;

                            purchase_order::Entity::delete_by_id(po.id)
                                .exec(txn)
                                .await
                                .map_err(ServiceError::from_db_err)?;

                            MigratePoNumberResult {
                                purchase_order: replacement,
                                assets_repointed: repointed,
                            }
                        }
                    };

                    // Repointed assets may still carry stale shared-field
                    // copies from before the rename.
                    asset_sync::sync_po_fields(txn, &migrated.purchase_order).await?;

                    Ok(migrated)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::from_db_err(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })
            .map_err(|e| {
                PO_MIGRATION_FAILURES.inc();
                error!(error = %e, "PO number migration failed");
                e
            })?;

        PO_MIGRATIONS.inc();
        info!(
            purchase_order_id = %result.purchase_order.id,
            assets_repointed = result.assets_repointed,
            "PO number migrated"
        );

        event_sender
            .send_lossy(Event::PurchaseOrderNumberMigrated {
                purchase_order_id: result.purchase_order.id,
                old_number: self.old_number.trim().to_string(),
                new_number: self.new_number.trim().to_string(),
                assets_repointed: result.assets_repointed,
            })
            .await;

        Ok(result)
    }
}
