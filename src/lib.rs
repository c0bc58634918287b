//! Asset API Library
//!
//! Tracks physical/software assets and the purchase orders that acquired
//! them. The core of the crate is the PO→Asset consistency engine: the
//! natural-key migration workflow, the shared-field synchronizer, the
//! deletion-conflict detector, and the bulk ingestion engine with
//! per-item failure isolation.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod migrator;
pub mod services;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub purchase_orders: services::purchase_orders::PurchaseOrderService,
    pub assets: services::assets::AssetService,
}

impl AppState {
    /// Wires the services against one pool and event channel.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
        logger: slog::Logger,
    ) -> Self {
        let sender = Arc::new(event_sender.clone());
        let purchase_orders = services::purchase_orders::PurchaseOrderService::new(
            db.clone(),
            sender.clone(),
            logger.clone(),
        );
        let assets = services::assets::AssetService::new(db.clone(), sender, logger);

        Self {
            db,
            config,
            event_sender,
            purchase_orders,
            assets,
        }
    }
}
