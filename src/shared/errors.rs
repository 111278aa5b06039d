use thiserror::Error;

/// Outcomes of the account use-cases.
///
/// The `Display` text of the business variants is part of the HTTP
/// contract: it is sent verbatim as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("E-mail already exists.")]
    UserAlreadyExists,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("User not found.")]
    UserNotFound,

    #[error("Resource not found.")]
    ResourceNotFound,

    #[error("User not allowed.")]
    UserNotAllowed,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl DomainError {
    /// Whether this error comes from a collaborator (store, hasher) rather
    /// than from a business rule.
    pub fn is_internal(&self) -> bool {
        matches!(self, DomainError::Storage(_) | DomainError::Crypto(_))
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Messaging error: {0}")]
    Messaging(#[from] lapin::Error),

    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfraError> for DomainError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Crypto(msg) => DomainError::Crypto(msg),
            other => DomainError::Storage(other.to_string()),
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_carry_contract_messages() {
        assert_eq!(DomainError::UserAlreadyExists.to_string(), "E-mail already exists.");
        assert_eq!(DomainError::InvalidCredentials.to_string(), "Invalid credentials.");
        assert_eq!(DomainError::UserNotAllowed.to_string(), "User not allowed.");
        assert!(!DomainError::UserNotFound.is_internal());
        assert!(DomainError::Storage("down".into()).is_internal());
    }

    #[test]
    fn infra_errors_convert_to_internal_domain_errors() {
        let err: DomainError = InfraError::Crypto("bad cost".into()).into();
        assert!(matches!(err, DomainError::Crypto(_)));

        let err: DomainError = InfraError::Config("x".into()).into();
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
