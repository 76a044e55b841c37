use thiserror::Error;

/// Error taxonomy for every user-facing failure path.
///
/// Services return these directly; the HTTP layer maps each variant to a
/// status code and an `ApiResponse` envelope. Database errors are never
/// shown verbatim to the client.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found.")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    /// Invalid lifecycle transition, e.g. cancelling a non-pending
    /// appointment or double-booking a slot.
    #[error("{0}")]
    StateConflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sea_orm::TransactionError<DomainError>> for DomainError {
    fn from(err: sea_orm::TransactionError<DomainError>) -> Self {
        match err {
            sea_orm::TransactionError::Connection(e) => DomainError::Database(e),
            sea_orm::TransactionError::Transaction(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = DomainError::NotFound("Patient");
        assert_eq!(err.to_string(), "Patient not found.");
    }

    #[test]
    fn database_error_keeps_source_in_message() {
        let err = DomainError::Database(sea_orm::DbErr::Custom("boom".into()));
        assert!(err.to_string().starts_with("Database error:"));
    }
}
