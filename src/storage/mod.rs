mod deal_storage;
mod errors;

use crate::models::{PersistedDeal, ValidatedDeal};

pub use deal_storage::DealStorage;
pub use errors::StoreError;

/// Durable, key-unique persistence for deals.
///
/// Implementations must make `commit` atomic for a single deal and must reject
/// a second deal with the same unique identifier with `StoreError::UniqueViolation`,
/// whatever `exists` said beforehand.
pub trait DealStore: Send + Sync + 'static {
    fn exists(&self, deal_unique_id: &str) -> Result<bool, StoreError>;
    /// Persists one candidate, assigning its surrogate id and import timestamp.
    fn commit(&self, candidate: ValidatedDeal) -> Result<PersistedDeal, StoreError>;
    fn find(&self, deal_unique_id: &str) -> Result<Option<PersistedDeal>, StoreError>;
    /// Every persisted deal, ordered by surrogate id.
    fn all(&self) -> Result<Vec<PersistedDeal>, StoreError>;
}
