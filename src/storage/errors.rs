use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Unique constraint violated for deal [{deal_unique_id}]")]
    UniqueViolation {
        deal_unique_id: String
    },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String)
}
