use crate::commands::assets::{
    AssetUpdateInput, BatchOutcome, BulkCreateAssetsCommand, BulkUpdateAssetsCommand,
    NewAssetInput,
};
use crate::commands::Command;
use crate::db::DbPool;
use crate::entities::asset;
use crate::errors::ServiceError;
use crate::events::EventSender;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Service for bulk asset ingestion and lookups
#[derive(Clone)]
pub struct AssetService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    #[allow(dead_code)]
    logger: Logger,
}

impl AssetService {
    /// Creates a new asset service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, logger: Logger) -> Self {
        Self {
            db_pool,
            event_sender,
            logger,
        }
    }

    /// Creates a batch of assets; every item is attempted and the outcome
    /// report carries one entry per input item.
    #[instrument(skip(self, command))]
    pub async fn create_assets_in_bulk(
        &self,
        command: BulkCreateAssetsCommand,
    ) -> Result<BatchOutcome, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// PO-scoped bulk creation: validates the PO once and injects its
    /// number (and shared-field defaults) into every item.
    #[instrument(skip(self, items))]
    pub async fn create_assets_for_po(
        &self,
        po_number: &str,
        items: Vec<NewAssetInput>,
    ) -> Result<BatchOutcome, ServiceError> {
        BulkCreateAssetsCommand {
            po_number: Some(po_number.to_string()),
            items,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    /// Applies a batch of per-asset partial updates with the same per-item
    /// isolation as creation.
    #[instrument(skip(self, items))]
    pub async fn update_assets_in_bulk(
        &self,
        items: Vec<AssetUpdateInput>,
    ) -> Result<BatchOutcome, ServiceError> {
        BulkUpdateAssetsCommand { items }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Gets an asset by ID (soft-deleted assets excluded)
    #[instrument(skip(self))]
    pub async fn get_asset(&self, asset_id: &Uuid) -> Result<Option<asset::Model>, ServiceError> {
        asset::Entity::find_by_id(*asset_id)
            .filter(asset::Column::IsDeleted.eq(false))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::from_db_err)
    }

    /// Gets an asset by serial number (soft-deleted assets excluded)
    #[instrument(skip(self))]
    pub async fn find_by_serial_number(
        &self,
        serial_number: &str,
    ) -> Result<Option<asset::Model>, ServiceError> {
        asset::Entity::find()
            .filter(asset::Column::SerialNumber.eq(serial_number))
            .filter(asset::Column::IsDeleted.eq(false))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::from_db_err)
    }

    /// Lists non-deleted assets referencing a PO number
    #[instrument(skip(self))]
    pub async fn find_by_po_number(
        &self,
        po_number: &str,
    ) -> Result<Vec<asset::Model>, ServiceError> {
        asset::Entity::find()
            .filter(asset::Column::PoNumber.eq(po_number))
            .filter(asset::Column::IsDeleted.eq(false))
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::from_db_err)
    }
}
