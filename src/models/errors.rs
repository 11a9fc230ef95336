use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::models::{DealRecord, ValidatedDeal};
use crate::storage::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    Structural,
    Domain
}

/// Terminal rejection state of a record in the import pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    Structural,
    Domain,
    Duplicate,
    StoreFault
}

impl Display for RejectionKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            RejectionKind::Structural => "structural",
            RejectionKind::Domain => "domain",
            RejectionKind::Duplicate => "duplicate",
            RejectionKind::StoreFault => "store-fault"
        };
        formatter.write_str(label)
    }
}

/// Outcome line for a record that did not make it into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub deal_unique_id: String,
    pub kind: RejectionKind,
    pub reason: String
}

impl From<&ImportError> for Rejection {
    fn from(error: &ImportError) -> Self {
        Self {
            deal_unique_id: error.deal_unique_id().to_string(),
            kind: error.kind(),
            reason: error.to_string()
        }
    }
}

/// Field name to violation reason, ordered by field name for stable messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(BTreeMap<&'static str, String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a reason for `field`; the first reason recorded for a field wins.
    pub fn add(&mut self, field: &'static str, reason: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| reason.into());
    }

    pub fn single(field: &'static str, reason: impl Into<String>) -> Self {
        let mut violations = Self::new();
        violations.add(field, reason);
        violations
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, reason)| (*field, reason.as_str()))
    }
}

impl Display for Violations {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        for (index, (field, reason)) in self.iter().enumerate() {
            if index > 0 {
                formatter.write_str("; ")?;
            }
            write!(formatter, "{field}: {reason}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid deal [{deal_unique_id}]: {violations}")]
    InvalidDeal {
        deal_unique_id: String,
        stage: ValidationStage,
        violations: Violations
    },
    #[error("Deal with ID {deal_unique_id} already exists")]
    DuplicateDeal {
        deal_unique_id: String
    },
    #[error("Store fault for deal [{deal_unique_id}]: {source}")]
    StoreFault {
        deal_unique_id: String,
        #[source]
        source: StoreError
    }
}

impl ImportError {
    pub fn invalid_structure(record: &DealRecord, violations: Violations) -> Self {
        Self::InvalidDeal {
            deal_unique_id: record.identifier().to_string(),
            stage: ValidationStage::Structural,
            violations
        }
    }

    pub fn invalid_domain(deal: &ValidatedDeal, violations: Violations) -> Self {
        Self::InvalidDeal {
            deal_unique_id: deal.deal_unique_id.clone(),
            stage: ValidationStage::Domain,
            violations
        }
    }

    pub fn duplicate(deal_unique_id: &str) -> Self {
        Self::DuplicateDeal { deal_unique_id: deal_unique_id.to_string() }
    }

    /// Maps a store failure onto the import taxonomy. A uniqueness violation is a
    /// duplicate that slipped past the pre-check, not an infrastructure fault.
    pub fn from_store(deal_unique_id: &str, error: StoreError) -> Self {
        match error {
            StoreError::UniqueViolation { .. } => Self::duplicate(deal_unique_id),
            source => Self::StoreFault {
                deal_unique_id: deal_unique_id.to_string(),
                source
            }
        }
    }

    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::InvalidDeal { stage: ValidationStage::Structural, .. } => RejectionKind::Structural,
            Self::InvalidDeal { stage: ValidationStage::Domain, .. } => RejectionKind::Domain,
            Self::DuplicateDeal { .. } => RejectionKind::Duplicate,
            Self::StoreFault { .. } => RejectionKind::StoreFault
        }
    }

    pub fn deal_unique_id(&self) -> &str {
        match self {
            Self::InvalidDeal { deal_unique_id, .. }
            | Self::DuplicateDeal { deal_unique_id }
            | Self::StoreFault { deal_unique_id, .. } => deal_unique_id
        }
    }

    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Self::InvalidDeal { violations, .. } => Some(violations),
            _ => None
        }
    }
}
