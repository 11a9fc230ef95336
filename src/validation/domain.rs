use crate::models::{ImportError, ValidatedDeal, Violations, FROM_CURRENCY, TO_CURRENCY};
use crate::types::CurrencyRegistry;

/// Applies the business rules to a structurally valid deal.
///
/// Checks run in a fixed order and stop at the first failure: source currency
/// membership, target currency membership, then distinctness of the pair.
///
/// # Errors
/// Returns `ImportError::InvalidDeal` naming the single failing field.
pub fn validate_domain(deal: &ValidatedDeal, registry: &CurrencyRegistry) -> Result<(), ImportError> {
    let from = deal.from_currency_iso_code.as_str();
    let to = deal.to_currency_iso_code.as_str();

    if !registry.is_known(from) {
        return Err(ImportError::invalid_domain(deal, Violations::single(FROM_CURRENCY, format!("Invalid from currency code: {from}"))));
    }

    if !registry.is_known(to) {
        return Err(ImportError::invalid_domain(deal, Violations::single(TO_CURRENCY, format!("Invalid to currency code: {to}"))));
    }

    if from == to {
        return Err(ImportError::invalid_domain(deal, Violations::single(TO_CURRENCY, "From and to currencies must be different")));
    }

    Ok(())
}
