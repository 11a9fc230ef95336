//! Record validation, split the way the pipeline runs it: a shape-level pass
//! that never looks outside the record, then business rules against the
//! currency registry.

mod domain;
mod structural;

pub use domain::validate_domain;
pub use structural::{validate_structure, MAX_DEAL_UNIQUE_ID_LENGTH, MAX_FRACTION_DIGITS, MAX_INTEGER_DIGITS};
