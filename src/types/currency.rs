use std::collections::HashSet;

const DEFAULT_CODES: [&str; 39] = [
    "USD", "EUR", "GBP", "JPY", "CHF", "CAD", "AUD", "NZD",
    "SEK", "NOK", "DKK", "PLN", "CZK", "HUF", "RON", "BGN",
    "TRY", "RUB", "INR", "CNY", "HKD", "SGD", "KRW", "THB",
    "MYR", "IDR", "PHP", "MXN", "BRL", "ARS", "CLP", "COP",
    "ZAR", "SAR", "AED", "ILS", "EGP", "NGN", "KES"
];

/// Immutable set of currency codes a deal may be booked in.
///
/// Built once at start-up and shared by reference; there is no mutation path.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    codes: HashSet<String>
}

impl CurrencyRegistry {
    /// Creates a registry from an arbitrary set of codes.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect()
        }
    }

    /// Exact, case-sensitive membership check.
    pub fn is_known(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::from_codes(DEFAULT_CODES)
    }
}
