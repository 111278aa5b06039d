//! User API handlers
//!
//! Thin wrappers over the account use cases.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{RegisterRequest, UpdateRequest};
use crate::application::{DropActor, UseCaseFactory};
use crate::domain::PublicUser;
use crate::interfaces::http::common::{ApiError, ErrorResponse, ValidatedJson, ValidationErrorResponse};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct UserHandlerState {
    pub use_cases: UseCaseFactory,
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = PublicUser),
        (status = 400, description = "Validation error.", body = ValidationErrorResponse),
        (status = 409, description = "E-mail already exists.", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<UserHandlerState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let user = state
        .use_cases
        .register()
        .execute(&req.name, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user.to_public())))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Authenticated user's profile", body = PublicUser),
        (status = 401, description = "User not allowed.", body = ErrorResponse),
        (status = 404, description = "Resource not found.", body = ErrorResponse)
    )
)]
pub async fn profile(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .use_cases
        .get_user_profile()
        .execute(&auth.user_id)
        .await?;

    Ok(Json(user.to_public()))
}

#[utoipa::path(
    put,
    path = "/users",
    tag = "Users",
    security(("bearerAuth" = [])),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "User updated", body = PublicUser),
        (status = 400, description = "Validation error.", body = ValidationErrorResponse),
        (status = 401, description = "User not allowed.", body = ErrorResponse),
        (status = 404, description = "User not found.", body = ErrorResponse),
        (status = 409, description = "E-mail already exists.", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ValidatedJson(req): ValidatedJson<UpdateRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .use_cases
        .update()
        .execute(&auth.user_id, req.into())
        .await?;

    Ok(Json(user.to_public()))
}

#[utoipa::path(
    delete,
    path = "/users",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 201, description = "User dropped successfully"),
        (status = 401, description = "User not allowed.", body = ErrorResponse),
        (status = 404, description = "User not found.", body = ErrorResponse)
    )
)]
pub async fn drop_self(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<StatusCode, ApiError> {
    let actor = DropActor::new(auth.user_id.clone(), auth.role);
    state
        .use_cases
        .drop_user()
        .execute(&auth.user_id, &actor)
        .await?;

    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 201, description = "User dropped successfully"),
        (status = 401, description = "User not allowed.", body = ErrorResponse),
        (status = 404, description = "User not found.", body = ErrorResponse)
    )
)]
pub async fn drop_by_id(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let actor = DropActor::new(auth.user_id, auth.role);
    state.use_cases.drop_user().execute(&id, &actor).await?;

    Ok(StatusCode::CREATED)
}
