mod deal_importer;
mod duplicate_guard;

pub use deal_importer::DealImporter;
pub use duplicate_guard::DuplicateGuard;

use tracing::{error, warn};

use crate::models::{ImportError, RejectionKind};

/// Emits the per-record outcome line for a rejected deal. This log is the only
/// place batch callers can learn why a record is missing from the result.
pub(crate) fn log_rejection(error: &ImportError) {
    match error.kind() {
        RejectionKind::StoreFault => error!("Rejected deal [{}]:[{}] {error}", error.deal_unique_id(), error.kind()),
        kind => warn!("Rejected deal [{}]:[{kind}] {error}", error.deal_unique_id())
    }
}
