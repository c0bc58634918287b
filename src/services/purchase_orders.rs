use crate::commands::purchaseorders::{
    CreatePurchaseOrderCommand, DeletePurchaseOrderCommand, DeletePurchaseOrderResult,
    MigratePoNumberCommand, MigratePoNumberResult, UpdatePurchaseOrderCommand,
    UpdatePurchaseOrderResult,
};
use crate::commands::Command;
use crate::db::DbPool;
use crate::entities::purchase_order;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::services::{asset_sync, po_deletion};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Advisory device-quota summary for a purchase order. `remaining` can hit
/// zero while creation still succeeds; the quota is information, not a
/// rejection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoCapacitySummary {
    pub po_number: String,
    pub total_devices: i32,
    pub linked_assets: u64,
    pub remaining: u64,
    pub can_create_more: bool,
}

/// Service for managing purchase orders and their dependent assets
#[derive(Clone)]
pub struct PurchaseOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    #[allow(dead_code)]
    logger: Logger,
}

impl PurchaseOrderService {
    /// Creates a new purchase order service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, logger: Logger) -> Self {
        Self {
            db_pool,
            event_sender,
            logger,
        }
    }

    /// Creates a new purchase order
    #[instrument(skip(self, command))]
    pub async fn create_purchase_order(
        &self,
        command: CreatePurchaseOrderCommand,
    ) -> Result<purchase_order::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Applies a partial update; a changed PO number flows through the
    /// key-migration ordering and dependent assets are re-synchronized.
    #[instrument(skip(self, command))]
    pub async fn update_purchase_order(
        &self,
        command: UpdatePurchaseOrderCommand,
    ) -> Result<UpdatePurchaseOrderResult, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Migrates a PO's natural key to a new number
    #[instrument(skip(self, command))]
    pub async fn migrate_po_number(
        &self,
        command: MigratePoNumberCommand,
    ) -> Result<MigratePoNumberResult, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Cascade-deletes a purchase order after an in-transaction conflict
    /// re-check; returns the number of soft-deleted assets.
    #[instrument(skip(self))]
    pub async fn delete_purchase_order_with_cascade(
        &self,
        po_number: &str,
    ) -> Result<DeletePurchaseOrderResult, ServiceError> {
        DeletePurchaseOrderCommand {
            po_number: po_number.to_string(),
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    /// Returns the structured deletion-conflict report, or `None` when the
    /// PO may be safely cascade-deleted.
    #[instrument(skip(self))]
    pub async fn check_deletion_conflicts(
        &self,
        po_number: &str,
    ) -> Result<Option<po_deletion::ConflictReport>, ServiceError> {
        let po = self.require_by_number(po_number).await?;
        po_deletion::check_deletion_conflicts(self.db_pool.as_ref(), &po).await
    }

    /// Gets a purchase order by ID
    #[instrument(skip(self))]
    pub async fn get_purchase_order(
        &self,
        po_id: &Uuid,
    ) -> Result<Option<purchase_order::Model>, ServiceError> {
        purchase_order::Entity::find_by_id(*po_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::from_db_err)
    }

    /// Gets a purchase order by its natural key
    #[instrument(skip(self))]
    pub async fn find_by_po_number(
        &self,
        po_number: &str,
    ) -> Result<Option<purchase_order::Model>, ServiceError> {
        purchase_order::Entity::find()
            .filter(purchase_order::Column::PoNumber.eq(po_number))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::from_db_err)
    }

    /// Gets purchase orders for a vendor
    #[instrument(skip(self))]
    pub async fn get_purchase_orders_by_vendor(
        &self,
        vendor_id: &Uuid,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        purchase_order::Entity::find()
            .filter(purchase_order::Column::VendorId.eq(*vendor_id))
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::from_db_err)
    }

    /// Device-quota summary: `remaining = max(0, total_devices - linked)`.
    #[instrument(skip(self))]
    pub async fn get_po_summary(
        &self,
        po_number: &str,
    ) -> Result<PoCapacitySummary, ServiceError> {
        let po = self.require_by_number(po_number).await?;
        let linked =
            asset_sync::count_linked_assets(self.db_pool.as_ref(), &po.po_number).await?;
        let remaining = (po.total_devices as i64 - linked as i64).max(0) as u64;

        Ok(PoCapacitySummary {
            po_number: po.po_number,
            total_devices: po.total_devices,
            linked_assets: linked,
            remaining,
            can_create_more: remaining > 0,
        })
    }

    /// Re-runs the field synchronizer for a PO; returns the number of
    /// assets written. A second run with no PO change writes zero.
    #[instrument(skip(self))]
    pub async fn resync_assets(&self, po_number: &str) -> Result<u64, ServiceError> {
        let po = self.require_by_number(po_number).await?;
        asset_sync::sync_po_fields(self.db_pool.as_ref(), &po).await
    }

    async fn require_by_number(
        &self,
        po_number: &str,
    ) -> Result<purchase_order::Model, ServiceError> {
        self.find_by_po_number(po_number).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Purchase order '{}' does not exist", po_number))
        })
    }
}
