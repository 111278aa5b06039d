//! JWT Token handling
//!
//! Short-lived access tokens travel in the `Authorization` header;
//! long-lived refresh tokens travel in the `refreshToken` cookie. Both are
//! HS256-signed with the same secret and told apart by the `kind` claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::UserRole;

/// JWT configuration
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Issuer claim
    pub issuer: String,
    /// Access token lifetime
    pub access_ttl_minutes: i64,
    /// Refresh token lifetime
    pub refresh_ttl_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "super-secret-key-change-in-production".to_string(),
            issuer: "register-service".to_string(),
            access_ttl_minutes: 60,
            refresh_ttl_days: 7,
        }
    }
}

impl JwtConfig {
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_days * 24 * 3600
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User role
    pub role: UserRole,
    pub kind: TokenKind,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl TokenClaims {
    pub fn new(user_id: &str, role: UserRole, kind: TokenKind, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => Duration::minutes(config.access_ttl_minutes),
            TokenKind::Refresh => Duration::days(config.refresh_ttl_days),
        };

        Self {
            sub: user_id.to_string(),
            role,
            kind,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Errors that can occur during token verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    WrongTokenKind,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingToken => write!(f, "Missing authentication token"),
            Self::InvalidToken => write!(f, "Invalid authentication token"),
            Self::ExpiredToken => write!(f, "Token has expired"),
            Self::WrongTokenKind => write!(f, "Token cannot be used here"),
        }
    }
}

impl std::error::Error for AuthError {}

fn sign(claims: &TokenClaims, config: &JwtConfig) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

pub fn create_access_token(
    user_id: &str,
    role: UserRole,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    sign(&TokenClaims::new(user_id, role, TokenKind::Access, config), config)
}

pub fn create_refresh_token(
    user_id: &str,
    role: UserRole,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    sign(&TokenClaims::new(user_id, role, TokenKind::Refresh, config), config)
}

/// Verify signature, issuer and expiry, then check the token kind.
pub fn verify_token(
    token: &str,
    expected: TokenKind,
    config: &JwtConfig,
) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.kind != expected {
        return Err(AuthError::WrongTokenKind);
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_verify_access_token() {
        let config = JwtConfig::default();
        let token = create_access_token("user-123", UserRole::Admin, &config).unwrap();

        let claims = verify_token(&token, TokenKind::Access, &config).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.role, UserRole::Admin);
        assert!(claims.is_admin());
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn refresh_token_lives_longer_and_is_not_an_access_token() {
        let config = JwtConfig::default();
        let token = create_refresh_token("user-123", UserRole::Member, &config).unwrap();

        let claims = verify_token(&token, TokenKind::Refresh, &config).unwrap();
        assert_eq!(claims.exp - claims.iat, config.refresh_ttl_seconds());

        assert_eq!(
            verify_token(&token, TokenKind::Access, &config).unwrap_err(),
            AuthError::WrongTokenKind
        );
    }

    #[test]
    fn test_invalid_token() {
        let config = JwtConfig::default();
        let result = verify_token("invalid-token", TokenKind::Access, &config);
        assert_eq!(result.unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let config = JwtConfig::default();
        let other = JwtConfig {
            secret: "another-secret".into(),
            ..JwtConfig::default()
        };
        let token = create_access_token("user-123", UserRole::Member, &other).unwrap();

        assert!(verify_token(&token, TokenKind::Access, &config).is_err());
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let config = JwtConfig {
            access_ttl_minutes: -10,
            ..JwtConfig::default()
        };
        let token = create_access_token("user-123", UserRole::Member, &config).unwrap();

        assert_eq!(
            verify_token(&token, TokenKind::Access, &config).unwrap_err(),
            AuthError::ExpiredToken
        );
    }
}
