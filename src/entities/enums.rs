//! Closed vocabularies shared by purchase orders and assets, plus the
//! normalizer that maps free-form human input onto them.
//!
//! Every component that accepts a status, owner type, or acquisition type
//! string parses it here, so the canonical mapping has one definition and
//! one test surface. Unknown input is rejected; it is never passed through
//! to storage.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Lifecycle status of an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum AssetStatus {
    #[sea_orm(string_value = "IN_STOCK")]
    InStock,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "IN_USE")]
    InUse,
    #[sea_orm(string_value = "IN_REPAIR")]
    InRepair,
    #[sea_orm(string_value = "ON_LOAN")]
    OnLoan,
    #[sea_orm(string_value = "BROKEN")]
    Broken,
    #[sea_orm(string_value = "CEASED")]
    Ceased,
}

/// Who carries the asset on their books.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum OwnerType {
    #[sea_orm(string_value = "COMPANY")]
    Company,
    #[sea_orm(string_value = "PERSONAL")]
    Personal,
    #[sea_orm(string_value = "VENDOR")]
    Vendor,
}

/// How the purchase order acquired its devices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum AcquisitionType {
    #[sea_orm(string_value = "BOUGHT")]
    Bought,
    #[sea_orm(string_value = "RENTED")]
    Rented,
}

/// Collapses case, surrounding whitespace, and internal separators so
/// "In stock", "in_stock", and "IN-STOCK" all canonicalize identically.
fn canonical_token(input: &str) -> String {
    input
        .trim()
        .to_uppercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

impl AssetStatus {
    /// Canonical storage token for this status.
    pub fn canonical(&self) -> &'static str {
        match self {
            AssetStatus::InStock => "IN_STOCK",
            AssetStatus::Active => "ACTIVE",
            AssetStatus::InUse => "IN_USE",
            AssetStatus::InRepair => "IN_REPAIR",
            AssetStatus::OnLoan => "ON_LOAN",
            AssetStatus::Broken => "BROKEN",
            AssetStatus::Ceased => "CEASED",
        }
    }

    /// Parses human-entered input against the canonical tokens and their
    /// known synonyms. Unknown values are an error, never a pass-through.
    pub fn parse(input: &str) -> Result<Self, ServiceError> {
        match canonical_token(input).as_str() {
            "IN_STOCK" | "INSTOCK" | "STOCK" | "AVAILABLE" => Ok(AssetStatus::InStock),
            "ACTIVE" => Ok(AssetStatus::Active),
            "IN_USE" | "INUSE" | "DEPLOYED" | "ASSIGNED" => Ok(AssetStatus::InUse),
            "IN_REPAIR" | "REPAIR" | "REPAIRING" | "UNDER_REPAIR" => Ok(AssetStatus::InRepair),
            "ON_LOAN" | "LOAN" | "LOANED" => Ok(AssetStatus::OnLoan),
            "BROKEN" | "DAMAGED" | "FAULTY" | "DEFECTIVE" => Ok(AssetStatus::Broken),
            "CEASED" | "RETIRED" | "DECOMMISSIONED" | "DISPOSED" | "SCRAPPED" => {
                Ok(AssetStatus::Ceased)
            }
            _ => Err(ServiceError::InvalidStatus(format!(
                "unknown asset status '{}'",
                input.trim()
            ))),
        }
    }

    /// Statuses that indicate the asset is in active service and therefore
    /// block cascade deletion of its purchase order.
    pub fn blocks_deletion(&self) -> bool {
        matches!(
            self,
            AssetStatus::Active | AssetStatus::InUse | AssetStatus::InRepair | AssetStatus::OnLoan
        )
    }
}

impl OwnerType {
    pub fn canonical(&self) -> &'static str {
        match self {
            OwnerType::Company => "COMPANY",
            OwnerType::Personal => "PERSONAL",
            OwnerType::Vendor => "VENDOR",
        }
    }

    pub fn parse(input: &str) -> Result<Self, ServiceError> {
        match canonical_token(input).as_str() {
            "COMPANY" | "CORPORATE" | "COMPANY_OWNED" | "SELF_OWNED" => Ok(OwnerType::Company),
            "PERSONAL" | "EMPLOYEE" | "INDIVIDUAL" | "BYOD" => Ok(OwnerType::Personal),
            "VENDOR" | "SUPPLIER" | "THIRD_PARTY" => Ok(OwnerType::Vendor),
            _ => Err(ServiceError::FieldValidation {
                field: "owner_type".to_string(),
                message: format!("unknown owner type '{}'", input.trim()),
            }),
        }
    }
}

impl AcquisitionType {
    pub fn canonical(&self) -> &'static str {
        match self {
            AcquisitionType::Bought => "BOUGHT",
            AcquisitionType::Rented => "RENTED",
        }
    }

    pub fn parse(input: &str) -> Result<Self, ServiceError> {
        match canonical_token(input).as_str() {
            "BOUGHT" | "BUY" | "PURCHASED" | "PURCHASE" | "OWNED" => Ok(AcquisitionType::Bought),
            "RENTED" | "RENT" | "RENTAL" | "LEASED" | "LEASE" => Ok(AcquisitionType::Rented),
            _ => Err(ServiceError::FieldValidation {
                field: "acquisition_type".to_string(),
                message: format!("unknown acquisition type '{}'", input.trim()),
            }),
        }
    }
}
