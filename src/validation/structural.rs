use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{
    DealRecord, ImportError, ValidatedDeal, Violations, DEAL_AMOUNT, DEAL_TIMESTAMP, DEAL_UNIQUE_ID, FROM_CURRENCY,
    TO_CURRENCY,
};

pub const MAX_DEAL_UNIQUE_ID_LENGTH: usize = 100;
pub const MAX_INTEGER_DIGITS: u32 = 15;
pub const MAX_FRACTION_DIGITS: u32 = 4;

/// Checks the shape of a raw record and, if every field is acceptable, returns
/// the typed candidate.
///
/// All rules run independently, so a failing record reports every offending
/// field at once. `now` is the instant the timestamp is compared against.
///
/// # Errors
/// Returns `ImportError::InvalidDeal` carrying one reason per offending field.
pub fn validate_structure(record: &DealRecord, now: DateTime<Utc>) -> Result<ValidatedDeal, ImportError> {
    let mut violations = Violations::new();

    let deal_unique_id = check_unique_id(record.deal_unique_id.as_deref(), &mut violations);
    let from_currency = check_currency(record.from_currency_iso_code.as_deref(), FROM_CURRENCY, "From", &mut violations);
    let to_currency = check_currency(record.to_currency_iso_code.as_deref(), TO_CURRENCY, "To", &mut violations);
    let deal_timestamp = check_timestamp(record.deal_timestamp.as_deref(), now, &mut violations);
    let deal_amount = check_amount(record.deal_amount.as_deref(), &mut violations);

    match (deal_unique_id, from_currency, to_currency, deal_timestamp, deal_amount) {
        (Some(deal_unique_id), Some(from_currency_iso_code), Some(to_currency_iso_code), Some(deal_timestamp), Some(deal_amount)) => {
            Ok(ValidatedDeal {
                deal_unique_id,
                from_currency_iso_code,
                to_currency_iso_code,
                deal_timestamp,
                deal_amount
            })
        }
        _ => Err(ImportError::invalid_structure(record, violations))
    }
}

fn check_unique_id(value: Option<&str>, violations: &mut Violations) -> Option<String> {
    let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
        violations.add(DEAL_UNIQUE_ID, "Deal unique ID is required");
        return None;
    };

    if value.chars().count() > MAX_DEAL_UNIQUE_ID_LENGTH {
        violations.add(DEAL_UNIQUE_ID, format!("Deal unique ID must not exceed {MAX_DEAL_UNIQUE_ID_LENGTH} characters"));
        return None;
    }

    Some(value.to_string())
}

fn check_currency(value: Option<&str>, field: &'static str, label: &str, violations: &mut Violations) -> Option<String> {
    let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
        violations.add(field, format!("{label} currency ISO code is required"));
        return None;
    };

    let well_formed = value.len() == 3 && value.bytes().all(|byte| byte.is_ascii_uppercase());

    if !well_formed {
        violations.add(field, format!("{label} currency must be a valid 3-letter ISO code"));
        return None;
    }

    Some(value.to_string())
}

fn check_timestamp(value: Option<&str>, now: DateTime<Utc>, violations: &mut Violations) -> Option<DateTime<Utc>> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        violations.add(DEAL_TIMESTAMP, "Deal timestamp is required");
        return None;
    };

    let Some(value) = parse_timestamp(value) else {
        violations.add(DEAL_TIMESTAMP, "Deal timestamp format is invalid");
        return None;
    };

    if value > now {
        violations.add(DEAL_TIMESTAMP, "Deal timestamp cannot be in the future");
        return None;
    }

    Some(value)
}

/// Accepts RFC 3339, and zone-less local date-times which are taken to be UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|timestamp| timestamp.and_utc())
}

fn check_amount(value: Option<&str>, violations: &mut Violations) -> Option<Decimal> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        violations.add(DEAL_AMOUNT, "Deal amount is required");
        return None;
    };

    //NOTE: from_str_exact refuses input it would have to round to fit
    let Ok(value) = Decimal::from_str_exact(value) else {
        violations.add(DEAL_AMOUNT, "Deal amount must be a decimal number");
        return None;
    };

    if value <= Decimal::ZERO {
        violations.add(DEAL_AMOUNT, "Deal amount must be positive");
        return None;
    }

    if integer_digits(value) > MAX_INTEGER_DIGITS || fraction_digits(value) > MAX_FRACTION_DIGITS {
        violations.add(DEAL_AMOUNT, "Deal amount format is invalid");
        return None;
    }

    Some(value)
}

//NOTE: Trailing zeros are not significant, `1.50000` has one fractional digit. Nothing is rounded here,
//      a value that needs more digits than allowed is rejected.
fn fraction_digits(value: Decimal) -> u32 {
    value.normalize().scale()
}

fn integer_digits(value: Decimal) -> u32 {
    let integer = value.abs().trunc().normalize();

    if integer.is_zero() {
        0
    } else {
        integer.to_string().len() as u32
    }
}
