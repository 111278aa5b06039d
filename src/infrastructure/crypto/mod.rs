//! Password hashing and JWT signing

pub mod jwt;
pub mod password;

pub use jwt::{
    create_access_token, create_refresh_token, verify_token, AuthError, JwtConfig, TokenClaims,
    TokenKind,
};
pub use password::PasswordHasher;
