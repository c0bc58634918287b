// Shared by every integration test binary; not all binaries use every helper.
#![allow(dead_code)]

use std::sync::Arc;

use asset_api::{
    commands::purchaseorders::CreatePurchaseOrderCommand,
    commands::assets::NewAssetInput,
    config::AppConfig,
    db,
    entities::{asset_model, operating_system, user, vendor},
    events::{self, EventSender},
    logging, AppState,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Helper harness wiring the services against an in-memory SQLite database.
pub struct TestApp {
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:".to_string(), "test".to_string());
        // One pooled connection keeps the in-memory database alive and
        // shared across the whole test.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx, None));

        let state = AppState::new(
            db_arc,
            cfg,
            event_sender,
            logging::discard_logger(),
        );

        Self {
            state,
            _event_task: event_task,
        }
    }

    pub async fn seed_vendor(&self, name: &str) -> vendor::Model {
        vendor::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            contact_email: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed vendor")
    }

    pub async fn seed_user(&self, name: &str, email: &str) -> user::Model {
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed user")
    }

    pub async fn seed_model(
        &self,
        name: &str,
        asset_type: &str,
        make: &str,
    ) -> asset_model::Model {
        asset_model::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            asset_type: Set(asset_type.to_string()),
            make: Set(make.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed asset model")
    }

    pub async fn seed_os(&self, name: &str, version: Option<&str>) -> operating_system::Model {
        operating_system::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            version: Set(version.map(str::to_string)),
            created_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed operating system")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// A creation command with sensible defaults; tests override what they need.
pub fn po_command(po_number: &str, total_devices: i32) -> CreatePurchaseOrderCommand {
    CreatePurchaseOrderCommand {
        po_number: po_number.to_string(),
        acquisition_type: "Bought".to_string(),
        invoice_number: Some(format!("INV-{}", po_number)),
        acquisition_date: chrono::NaiveDate::from_ymd_opt(2024, 2, 15),
        vendor_id: None,
        owner_type: Some("company".to_string()),
        lease_end_date: None,
        rental_amount: None,
        min_contract_period: None,
        acquisition_price: None,
        depreciation_pct: None,
        current_price: None,
        total_devices,
        warranty_expiry: None,
    }
}

/// A bulk-creation item with sensible defaults.
pub fn asset_input(name: &str, serial: Option<&str>) -> NewAssetInput {
    NewAssetInput {
        name: name.to_string(),
        serial_number: serial.map(str::to_string),
        asset_code: None,
        status: None,
        po_number: None,
        assigned_user_id: None,
        model_id: None,
        asset_type: None,
        make: None,
        os_id: None,
        vendor_id: None,
        warranty_expiry: None,
    }
}
