use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::models::{PersistedDeal, ValidatedDeal};
use crate::storage::{DealStore, StoreError};
use crate::types::{Clock, DealId};

/// In-memory deal store keyed by the caller's unique identifier.
pub struct DealStorage {
    deals: DashMap<String, PersistedDeal>,
    sequence: Mutex<CommitSequence>,
    clock: Arc<dyn Clock>
}

struct CommitSequence {
    next_id: DealId,
    last_imported_at: Option<DateTime<Utc>>
}

impl CommitSequence {
    /// Import timestamps never run backwards in commit order, even if the clock does.
    fn stamp(&mut self, now: DateTime<Utc>) -> (DealId, DateTime<Utc>) {
        let imported_at = match self.last_imported_at {
            Some(last) if last > now => last,
            _ => now
        };
        let id = self.next_id;

        self.next_id += 1;
        self.last_imported_at = Some(imported_at);

        (id, imported_at)
    }
}

impl DealStorage {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            deals: DashMap::new(),
            sequence: Mutex::new(CommitSequence { next_id: 1, last_imported_at: None }),
            clock
        }
    }

    pub fn len(&self) -> usize {
        self.deals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }
}

impl DealStore for DealStorage {
    fn exists(&self, deal_unique_id: &str) -> Result<bool, StoreError> {
        Ok(self.deals.contains_key(deal_unique_id))
    }

    fn commit(&self, candidate: ValidatedDeal) -> Result<PersistedDeal, StoreError> {
        //NOTE: The sequence lock is held across the insert so ids and import timestamps follow write order.
        let mut sequence = self.sequence.lock()
            .map_err(|_| StoreError::Unavailable("commit sequence lock poisoned".to_string()))?;

        match self.deals.entry(candidate.deal_unique_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation { deal_unique_id: candidate.deal_unique_id }),
            Entry::Vacant(slot) => {
                let (id, imported_at) = sequence.stamp(self.clock.now());
                let deal = PersistedDeal::new(id, candidate, imported_at);

                slot.insert(deal.clone());
                debug!("Deal [{}] stored with id [{id}]", deal.deal_unique_id());

                Ok(deal)
            }
        }
    }

    fn find(&self, deal_unique_id: &str) -> Result<Option<PersistedDeal>, StoreError> {
        Ok(self.deals.get(deal_unique_id).map(|entry| entry.value().clone()))
    }

    fn all(&self) -> Result<Vec<PersistedDeal>, StoreError> {
        let mut deals: Vec<PersistedDeal> = self.deals.iter().map(|entry| entry.value().clone()).collect();
        deals.sort_by_key(PersistedDeal::id);

        Ok(deals)
    }
}
