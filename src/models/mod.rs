mod deal;
mod errors;

pub use deal::{DealRecord, PersistedDeal, ValidatedDeal};
pub use errors::{ImportError, Rejection, RejectionKind, ValidationStage, Violations};

pub const DEAL_UNIQUE_ID: &str = "deal_unique_id";
pub const FROM_CURRENCY: &str = "from_currency_iso_code";
pub const TO_CURRENCY: &str = "to_currency_iso_code";
pub const DEAL_TIMESTAMP: &str = "deal_timestamp";
pub const DEAL_AMOUNT: &str = "deal_amount";
