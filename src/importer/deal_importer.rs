use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::importer::{log_rejection, DuplicateGuard};
use crate::models::{DealRecord, ImportError, PersistedDeal, ValidatedDeal};
use crate::storage::{DealStore, StoreError};
use crate::types::{Clock, CurrencyRegistry};
use crate::validation::{validate_domain, validate_structure};

const DEFAULT_GUARD_CAPACITY: u64 = 10_000;

/// Runs the import pipeline for single deals and sequential batches.
///
/// Every deal is its own unit of work: validation, the duplicate check and one
/// atomic commit. Nothing is shared between deals, so a failure never has to be
/// undone elsewhere.
pub struct DealImporter<S: DealStore> {
    storage: Arc<S>,
    registry: Arc<CurrencyRegistry>,
    clock: Arc<dyn Clock>,
    guard: DuplicateGuard<S>
}

impl<S: DealStore> DealImporter<S> {
    pub fn new(storage: Arc<S>, registry: Arc<CurrencyRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            guard: DuplicateGuard::new(storage.clone(), DEFAULT_GUARD_CAPACITY),
            storage,
            registry,
            clock
        }
    }

    /// Bounds how many known identifiers the duplicate guard keeps in memory.
    pub fn with_guard_capacity(mut self, capacity: u64) -> Self {
        self.guard = DuplicateGuard::new(self.storage.clone(), capacity);
        self
    }

    /// Imports exactly one deal.
    ///
    /// # Errors
    /// - `InvalidDeal` if the record fails structural or domain validation.
    /// - `DuplicateDeal` if the identifier is already persisted, whether the
    ///   pre-check or the store's constraint caught it.
    /// - `StoreFault` for any other store failure.
    pub fn import_one(&self, record: &DealRecord) -> Result<PersistedDeal, ImportError> {
        info!("Importing deal [{}]", record.identifier());

        let candidate = self.prepare(record)?;
        self.commit(candidate)
    }

    /// Validates a record and runs the duplicate pre-check, producing the
    /// candidate that `commit` persists.
    pub fn prepare(&self, record: &DealRecord) -> Result<ValidatedDeal, ImportError> {
        debug!("Validating deal [{}]", record.identifier());

        let candidate = validate_structure(record, self.clock.now())?;
        validate_domain(&candidate, &self.registry)?;

        let deal_unique_id = candidate.deal_unique_id.as_str();
        let is_duplicate = self.guard.is_duplicate(deal_unique_id)
            .map_err(|error| ImportError::from_store(deal_unique_id, error))?;

        if is_duplicate {
            warn!("Duplicate deal detected [{deal_unique_id}]");
            return Err(ImportError::duplicate(deal_unique_id));
        }

        Ok(candidate)
    }

    /// Persists a prepared candidate as one atomic write.
    ///
    /// Safe to retry on its own after a `StoreFault`; validation does not need
    /// to run again.
    pub fn commit(&self, candidate: ValidatedDeal) -> Result<PersistedDeal, ImportError> {
        let deal_unique_id = candidate.deal_unique_id.clone();

        let deal = self.storage.commit(candidate)
            .map_err(|error| ImportError::from_store(&deal_unique_id, error))?;

        self.guard.remember(&deal_unique_id);
        info!("Successfully imported deal [{deal_unique_id}] as [{}]", deal.id());

        Ok(deal)
    }

    /// Imports each record independently and returns the ones that were
    /// persisted, in input order.
    ///
    /// Never fails as a whole. Rejected records are logged and left out of the
    /// result; earlier successes are never rolled back.
    pub fn import_batch(&self, records: &[DealRecord]) -> Vec<PersistedDeal> {
        info!("Bulk importing {} deals", records.len());

        let mut imported = Vec::with_capacity(records.len());

        for record in records {
            match self.import_one(record) {
                Ok(deal) => imported.push(deal),
                Err(error) => log_rejection(&error)
            }
        }

        info!("Imported {}/{} deals", imported.len(), records.len());

        imported
    }

    pub fn all_deals(&self) -> Result<Vec<PersistedDeal>, StoreError> {
        self.storage.all()
    }
}
