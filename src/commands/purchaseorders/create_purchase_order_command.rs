use crate::{
    commands::Command,
    db::DbPool,
    entities::enums::{AcquisitionType, OwnerType},
    entities::{purchase_order, vendor},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref PO_CREATIONS: IntCounter = IntCounter::new(
        "purchase_order_creations_total",
        "Total number of purchase orders created"
    )
    .expect("metric can be created");
    static ref PO_CREATION_FAILURES: IntCounter = IntCounter::new(
        "purchase_order_creation_failures_total",
        "Total number of failed purchase order creations"
    )
    .expect("metric can be created");
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePurchaseOrderCommand {
    #[validate(length(min = 1, message = "PO number is required"))]
    pub po_number: String,
    /// Free-form acquisition type; normalized before persistence.
    #[validate(length(min = 1, message = "Acquisition type is required"))]
    pub acquisition_type: String,
    pub invoice_number: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub vendor_id: Option<Uuid>,
    /// Free-form owner type; normalized before persistence.
    pub owner_type: Option<String>,
    pub lease_end_date: Option<NaiveDate>,
    pub rental_amount: Option<Decimal>,
    #[validate(range(min = 0))]
    pub min_contract_period: Option<i32>,
    pub acquisition_price: Option<Decimal>,
    pub depreciation_pct: Option<Decimal>,
    pub current_price: Option<Decimal>,
    #[validate(range(min = 0, message = "Device quota cannot be negative"))]
    pub total_devices: i32,
    pub warranty_expiry: Option<NaiveDate>,
}

#[async_trait::async_trait]
impl Command for CreatePurchaseOrderCommand {
    type Result = purchase_order::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(po_number = %self.po_number))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            PO_CREATION_FAILURES.inc();
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;

        let acquisition_type = AcquisitionType::parse(&self.acquisition_type)?;
        let owner_type = self
            .owner_type
            .as_deref()
            .map(OwnerType::parse)
            .transpose()?;

        let db = db_pool.as_ref();

        if let Some(vendor_id) = self.vendor_id {
            vendor::Entity::find_by_id(vendor_id)
                .one(db)
                .await
                .map_err(ServiceError::from_db_err)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Vendor {} does not exist", vendor_id))
                })?;
        }

        let now = Utc::now();
        let new_po = purchase_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            po_number: Set(self.po_number.trim().to_string()),
            acquisition_type: Set(acquisition_type),
            invoice_number: Set(self.invoice_number.clone()),
            acquisition_date: Set(self.acquisition_date),
            vendor_id: Set(self.vendor_id),
            owner_type: Set(owner_type),
            lease_end_date: Set(self.lease_end_date),
            rental_amount: Set(self.rental_amount),
            min_contract_period: Set(self.min_contract_period),
            acquisition_price: Set(self.acquisition_price),
            depreciation_pct: Set(self.depreciation_pct),
            current_price: Set(self.current_price),
            total_devices: Set(self.total_devices),
            warranty_expiry: Set(self.warranty_expiry),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // No pre-check on the number; duplicates surface as a uniqueness
        // violation mapped to the po_number field.
        let saved = new_po.insert(db).await.map_err(|e| {
            PO_CREATION_FAILURES.inc();
            error!(po_number = %self.po_number, error = %e, "Failed to create purchase order");
            ServiceError::from_db_err(e)
        })?;

        PO_CREATIONS.inc();
        info!(
            purchase_order_id = %saved.id,
            po_number = %saved.po_number,
            total_devices = saved.total_devices,
            "Purchase order created"
        );

        event_sender
            .send_lossy(Event::PurchaseOrderCreated(saved.id))
            .await;

        Ok(saved)
    }
}
