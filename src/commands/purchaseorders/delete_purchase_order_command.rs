use crate::{
    commands::Command,
    db::DbPool,
    entities::{asset, purchase_order},
    errors::ServiceError,
    events::{Event, EventSender},
    services::po_deletion,
};
use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, TransactionError, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

lazy_static! {
    static ref PO_CASCADE_DELETES: IntCounter = IntCounter::new(
        "po_cascade_deletes_total",
        "Total number of purchase orders cascade-deleted"
    )
    .expect("metric can be created");
    static ref PO_CASCADE_DELETE_REJECTIONS: IntCounter = IntCounter::new(
        "po_cascade_delete_rejections_total",
        "Cascade deletions rejected because of blocking assets"
    )
    .expect("metric can be created");
}

/// Cascade-deletes a purchase order: soft-deletes every linked asset and
/// removes the PO row. Conflicts are re-checked inside the transaction, so
/// a blocker appearing between an earlier check and this call makes the
/// whole operation fail closed.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletePurchaseOrderCommand {
    pub po_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePurchaseOrderResult {
    pub purchase_order_id: Uuid,
    pub assets_soft_deleted: u64,
}

#[async_trait::async_trait]
impl Command for DeletePurchaseOrderCommand {
    type Result = DeletePurchaseOrderResult;

    #[instrument(skip(self, db_pool, event_sender), fields(po_number = %self.po_number))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let po_number = self.po_number.trim().to_string();
        if po_number.is_empty() {
            return Err(ServiceError::ValidationError(
                "PO number is required".to_string(),
            ));
        }

        let db = db_pool.as_ref();

        let result = db
            .transaction::<_, DeletePurchaseOrderResult, ServiceError>(move |txn| {
                Box::pin(async move {
                    let po = purchase_order::Entity::find()
                        .filter(purchase_order::Column::PoNumber.eq(po_number.as_str()))
                        .one(txn)
                        .await
                        .map_err(ServiceError::from_db_err)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Purchase order '{}' does not exist",
                                po_number
                            ))
                        })?;

                    if let Some(report) = po_deletion::check_deletion_conflicts(txn, &po).await? {
                        return Err(ServiceError::DeletionConflict(report));
                    }

                    let soft_deleted = asset::Entity::update_many()
                        .col_expr(asset::Column::IsDeleted, Expr::value(true))
                        .col_expr(asset::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(asset::Column::PoNumber.eq(po_number.as_str()))
                        .filter(asset::Column::IsDeleted.eq(false))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::from_db_err)?
                        .rows_affected;

                    purchase_order::Entity::delete_by_id(po.id)
                        .exec(txn)
                        .await
                        .map_err(ServiceError::from_db_err)?;

                    Ok(DeletePurchaseOrderResult {
                        purchase_order_id: po.id,
                        assets_soft_deleted: soft_deleted,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::from_db_err(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })
            .map_err(|e| {
                if matches!(e, ServiceError::DeletionConflict(_)) {
                    PO_CASCADE_DELETE_REJECTIONS.inc();
                    warn!(po_number = %self.po_number, "cascade deletion rejected: blocking assets");
                }
                e
            })?;

        PO_CASCADE_DELETES.inc();
        info!(
            purchase_order_id = %result.purchase_order_id,
            assets_soft_deleted = result.assets_soft_deleted,
            "Purchase order cascade-deleted"
        );

        event_sender
            .send_lossy(Event::PurchaseOrderDeleted {
                purchase_order_id: result.purchase_order_id,
                po_number: self.po_number.trim().to_string(),
                assets_soft_deleted: result.assets_soft_deleted,
            })
            .await;

        Ok(result)
    }
}
