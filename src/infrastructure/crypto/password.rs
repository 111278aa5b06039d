//! Password hashing utilities

use crate::shared::InfraError;

/// bcrypt cost used when nothing is configured
pub const DEFAULT_BCRYPT_COST: u32 = 6;

/// bcrypt hasher with a configurable work factor
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password using bcrypt
    pub fn hash(&self, password: &str) -> Result<String, InfraError> {
        bcrypt::hash(password, self.cost).map_err(|e| InfraError::Crypto(e.to_string()))
    }

    /// Verify a password against a hash. A malformed hash never matches.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(4);
        let hashed = hasher.hash("123456").unwrap();

        assert_ne!(hashed, "123456");
        assert!(hasher.verify("123456", &hashed));
        assert!(!hasher.verify("wrong_password", &hashed));
    }

    #[test]
    fn malformed_hash_does_not_verify() {
        assert!(!PasswordHasher::default().verify("123456", "not-a-bcrypt-hash"));
    }

    #[test]
    fn invalid_cost_is_a_crypto_error() {
        let err = PasswordHasher::new(99).hash("123456").unwrap_err();
        assert!(matches!(err, InfraError::Crypto(_)));
    }
}
