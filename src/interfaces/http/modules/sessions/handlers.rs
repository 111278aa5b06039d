//! Session API handlers
//!
//! A successful login returns an access token in the body and a refresh
//! token in the `refreshToken` cookie. `PATCH /token/refresh` trades a
//! valid refresh cookie for a new pair.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, info};

use super::dto::{AuthenticateRequest, AuthenticateResponse, TokenResponse};
use crate::application::UseCaseFactory;
use crate::domain::UserRole;
use crate::infrastructure::crypto::jwt::{
    create_access_token, create_refresh_token, verify_token, JwtConfig, TokenKind,
};
use crate::interfaces::http::common::{ApiError, ErrorResponse, ValidatedJson};

pub const REFRESH_COOKIE: &str = "refreshToken";

#[derive(Clone)]
pub struct SessionHandlerState {
    pub use_cases: UseCaseFactory,
    pub jwt_config: JwtConfig,
    /// Adds `Secure` to the refresh cookie; off only for plain-HTTP setups
    pub secure_cookies: bool,
}

impl SessionHandlerState {
    fn refresh_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((REFRESH_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure_cookies)
            .max_age(time::Duration::seconds(self.jwt_config.refresh_ttl_seconds()))
            .build()
    }

    fn issue_tokens(&self, user_id: &str, role: UserRole) -> Result<(String, String), ApiError> {
        let access = create_access_token(user_id, role, &self.jwt_config).map_err(ApiError::internal)?;
        let refresh =
            create_refresh_token(user_id, role, &self.jwt_config).map_err(ApiError::internal)?;
        Ok((access, refresh))
    }
}

#[utoipa::path(
    post,
    path = "/sessions",
    tag = "Users",
    request_body = AuthenticateRequest,
    responses(
        (status = 200, description = "User authenticated successfully", body = AuthenticateResponse),
        (status = 400, description = "Invalid credentials or malformed body", body = ErrorResponse)
    )
)]
pub async fn authenticate(
    State(state): State<SessionHandlerState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<AuthenticateRequest>,
) -> Result<(CookieJar, Json<AuthenticateResponse>), ApiError> {
    let user = state
        .use_cases
        .authenticate()
        .execute(&req.email, &req.password)
        .await?;

    let (token, refresh) = state.issue_tokens(&user.id, user.role)?;

    Ok((
        jar.add(state.refresh_cookie(refresh)),
        Json(AuthenticateResponse {
            token,
            user: user.to_public(),
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/token/refresh",
    tag = "Users",
    responses(
        (status = 200, description = "New access token; the refresh cookie is rotated", body = TokenResponse),
        (status = 401, description = "User not allowed.", body = ErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<SessionHandlerState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let Some(cookie) = jar.get(REFRESH_COOKIE) else {
        debug!("Refresh rejected: no cookie");
        return Err(ApiError::not_allowed());
    };

    let claims = verify_token(cookie.value(), TokenKind::Refresh, &state.jwt_config).map_err(|e| {
        debug!("Refresh rejected: {}", e);
        ApiError::not_allowed()
    })?;

    let (token, refresh) = state.issue_tokens(&claims.sub, claims.role)?;
    info!(user_id = %claims.sub, "Tokens refreshed");

    Ok((jar.add(state.refresh_cookie(refresh)), Json(TokenResponse { token })))
}
