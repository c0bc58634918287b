// Core services
pub mod assets;
pub mod purchase_orders;

// Consistency engine internals shared by the commands
pub mod asset_sync;
pub mod po_deletion;
