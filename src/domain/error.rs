use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Market data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("No position: {0}")]
    NoPosition(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::Persistence(s)
    }
}
