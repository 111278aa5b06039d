//! Authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::domain::UserRole;
use crate::infrastructure::crypto::jwt::{verify_token, AuthError, JwtConfig, TokenClaims, TokenKind};
use crate::interfaces::http::common::ApiError;

/// Authentication state containing the JWT config
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Caller identity taken from a verified access token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authenticate(request: &Request<Body>, jwt_config: &JwtConfig) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = extract_token(auth_header).ok_or(AuthError::InvalidToken)?;
    let claims = verify_token(token, TokenKind::Access, jwt_config)?;

    Ok(AuthenticatedUser::from_claims(claims))
}

/// Bearer access-token middleware. Every failure answers 401.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&request, &auth_state.jwt_config) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(reason) => {
            debug!(uri = %request.uri(), "Rejected request: {}", reason);
            ApiError::not_allowed().into_response()
        }
    }
}
