use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::DealId;

/// A deal exactly as submitted, before any validation.
///
/// Every field is kept as optional text so that missing or unparseable values
/// surface as field-level validation violations instead of row-level
/// deserialization failures. Amounts never pass through a float.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealRecord {
    pub deal_unique_id: Option<String>,
    pub from_currency_iso_code: Option<String>,
    pub to_currency_iso_code: Option<String>,
    /// RFC 3339, or a zone-less `2024-01-15T10:30:00` read as UTC.
    pub deal_timestamp: Option<String>,
    pub deal_amount: Option<String>
}

impl DealRecord {
    /// The identifier for log lines and error payloads, even when absent.
    pub fn identifier(&self) -> &str {
        self.deal_unique_id.as_deref().unwrap_or("<missing>")
    }
}

/// A deal that passed structural validation and is ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDeal {
    pub deal_unique_id: String,
    pub from_currency_iso_code: String,
    pub to_currency_iso_code: String,
    pub deal_timestamp: DateTime<Utc>,
    pub deal_amount: Decimal
}

/// A deal as held by the store.
///
/// Only the store constructs these; once built the fields are read-only, so the
/// import timestamp can never move after commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedDeal {
    id: DealId,
    deal: ValidatedDeal,
    imported_at: DateTime<Utc>
}

impl PersistedDeal {
    pub(crate) fn new(id: DealId, deal: ValidatedDeal, imported_at: DateTime<Utc>) -> Self {
        Self { id, deal, imported_at }
    }

    pub fn id(&self) -> DealId {
        self.id
    }

    pub fn deal_unique_id(&self) -> &str {
        &self.deal.deal_unique_id
    }

    pub fn from_currency_iso_code(&self) -> &str {
        &self.deal.from_currency_iso_code
    }

    pub fn to_currency_iso_code(&self) -> &str {
        &self.deal.to_currency_iso_code
    }

    pub fn deal_timestamp(&self) -> DateTime<Utc> {
        self.deal.deal_timestamp
    }

    pub fn deal_amount(&self) -> Decimal {
        self.deal.deal_amount
    }

    pub fn imported_at(&self) -> DateTime<Utc> {
        self.imported_at
    }
}
