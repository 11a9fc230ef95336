mod clock;
mod currency;

pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use clock::ManualClock;
pub use currency::CurrencyRegistry;

/// Surrogate key assigned by the store on the first successful write.
pub type DealId = u64;
