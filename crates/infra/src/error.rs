use thiserror::Error;

use nexium_core::DomainError;
use nexium_geocoding::GeocodeError;

use crate::store::StoreError;

/// Errors surfaced by the application services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller input rejected before any write.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A read or write against the record store failed; nothing was applied.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// The external geocoding service failed.
    #[error("lookup failed: {0}")]
    Lookup(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound(what) => Self::NotFound(what),
            DomainError::Validation(msg)
            | DomainError::InvariantViolation(msg)
            | DomainError::InvalidId(msg) => Self::Validation(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { collection, id } => Self::NotFound(format!("{collection}/{id}")),
            other => Self::Persistence(other.to_string()),
        }
    }
}

impl From<GeocodeError> for ServiceError {
    fn from(value: GeocodeError) -> Self {
        match value {
            GeocodeError::Validation(msg) => Self::Validation(msg),
            GeocodeError::Lookup(msg) => Self::Lookup(msg),
        }
    }
}
