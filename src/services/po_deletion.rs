//! Deletion-conflict detection for purchase orders.
//!
//! A PO may only be cascade-deleted when none of its linked assets is in
//! active service. Having conflicts is a normal, expected outcome and is
//! represented as data; the check never fails just because blockers exist.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{asset, purchase_order, user};
use crate::errors::ServiceError;

/// One asset that prevents cascade deletion, with every reason combined
/// into a single human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingAsset {
    pub asset_id: Uuid,
    /// Serial number when present, else the asset name.
    pub identifier: String,
    pub reasons: String,
}

/// Structured report returned when a PO cannot be safely deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub po_number: String,
    /// Non-deleted assets linked to the PO (blockers and non-blockers).
    pub total_assets: u64,
    pub blocking_assets: Vec<BlockingAsset>,
}

impl ConflictReport {
    pub fn blocking_count(&self) -> usize {
        self.blocking_assets.len()
    }
}

/// Evaluates the blocking conditions for one asset. `user_names` maps the
/// assigned users to display names for the report; `today` is passed in so
/// date comparisons stay deterministic under test.
fn blocking_reasons(
    asset: &asset::Model,
    user_names: &HashMap<Uuid, String>,
    today: NaiveDate,
) -> Vec<String> {
    let mut reasons = Vec::new();

    if let Some(user_id) = asset.assigned_user_id {
        let name = user_names
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string());
        reasons.push(format!("Asset assigned to user: {}", name));
    }

    if asset.status.blocks_deletion() {
        reasons.push(format!(
            "Asset is currently active/in use ({})",
            asset.status.canonical()
        ));
    }

    if let Some(expiry) = asset.warranty_expiry {
        if expiry > today {
            reasons.push(format!("Warranty active until {}", expiry));
        }
    }

    if let Some(lease_end) = asset.lease_end_date {
        if lease_end > today {
            reasons.push(format!("Lease active until {}", lease_end));
        }
    }

    reasons
}

/// Inspects all non-deleted assets linked to `po` and returns `None` when
/// deletion is safe, or the full conflict report otherwise.
pub async fn check_deletion_conflicts<C: ConnectionTrait>(
    conn: &C,
    po: &purchase_order::Model,
) -> Result<Option<ConflictReport>, ServiceError> {
    let assets = asset::Entity::find()
        .filter(asset::Column::PoNumber.eq(po.po_number.as_str()))
        .filter(asset::Column::IsDeleted.eq(false))
        .all(conn)
        .await
        .map_err(ServiceError::from_db_err)?;

    let assigned_ids: Vec<Uuid> = assets.iter().filter_map(|a| a.assigned_user_id).collect();

    let user_names: HashMap<Uuid, String> = if assigned_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(assigned_ids))
            .all(conn)
            .await
            .map_err(ServiceError::from_db_err)?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    };

    let today = Utc::now().date_naive();
    let mut blocking = Vec::new();

    for asset in &assets {
        let reasons = blocking_reasons(asset, &user_names, today);
        if !reasons.is_empty() {
            blocking.push(BlockingAsset {
                asset_id: asset.id,
                identifier: asset.display_identifier().to_string(),
                reasons: reasons.join("; "),
            });
        }
    }

    if blocking.is_empty() {
        return Ok(None);
    }

    Ok(Some(ConflictReport {
        po_number: po.po_number.clone(),
        total_assets: assets.len() as u64,
        blocking_assets: blocking,
    }))
}
