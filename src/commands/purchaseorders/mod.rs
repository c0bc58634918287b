pub mod create_purchase_order_command;
pub mod delete_purchase_order_command;
pub mod migrate_po_number_command;
pub mod update_purchase_order_command;

pub use create_purchase_order_command::CreatePurchaseOrderCommand;
pub use delete_purchase_order_command::{DeletePurchaseOrderCommand, DeletePurchaseOrderResult};
pub use migrate_po_number_command::{
    MigratePoNumberCommand, MigratePoNumberResult, MigrationStrategy,
};
pub use update_purchase_order_command::{
    PurchaseOrderPatch, UpdatePurchaseOrderCommand, UpdatePurchaseOrderResult,
};
