use std::sync::Arc;

use moka::sync::Cache;

use crate::storage::{DealStore, StoreError};

/// Fast pre-flight check for identifiers that are already persisted.
///
/// Deals are never deleted, so a positive answer can be cached indefinitely;
/// negative answers always go back to the store. This is an optimisation only,
/// the store's uniqueness constraint remains the final arbiter.
pub struct DuplicateGuard<S: DealStore> {
    storage: Arc<S>,
    known: Cache<String, ()>
}

impl<S: DealStore> DuplicateGuard<S> {
    pub fn new(storage: Arc<S>, capacity: u64) -> Self {
        Self {
            storage,
            known: Cache::new(capacity)
        }
    }

    /// # Errors
    /// Propagates the store's error if the existence check itself fails.
    pub fn is_duplicate(&self, deal_unique_id: &str) -> Result<bool, StoreError> {
        if self.known.contains_key(deal_unique_id) {
            return Ok(true);
        }

        let exists = self.storage.exists(deal_unique_id)?;

        if exists {
            self.remember(deal_unique_id);
        }

        Ok(exists)
    }

    /// Marks an identifier as persisted after a successful commit.
    pub fn remember(&self, deal_unique_id: &str) {
        self.known.insert(deal_unique_id.to_string(), ());
    }
}
