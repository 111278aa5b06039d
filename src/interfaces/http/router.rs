//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::UseCaseFactory;
use crate::domain::{PublicUser, UserRole};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ErrorResponse, ValidationErrorResponse};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::health::{self, ComponentHealth, HealthResponse, HealthState};
use crate::interfaces::http::modules::metrics::{self, http_metrics_middleware, MetricsState};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::sessions::{self, SessionHandlerState};
use crate::interfaces::http::modules::users::{self, UserHandlerState};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token returned by POST /sessions"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::register,
        users::profile,
        users::update,
        users::drop_self,
        users::drop_by_id,
        sessions::authenticate,
        sessions::refresh,
    ),
    components(
        schemas(
            PublicUser,
            UserRole,
            ErrorResponse,
            ValidationErrorResponse,
            HealthResponse,
            ComponentHealth,
            users::RegisterRequest,
            users::UpdateRequest,
            sessions::AuthenticateRequest,
            sessions::AuthenticateResponse,
            sessions::TokenResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Users", description = "Registration, sessions, profile and account removal"),
    ),
    info(
        title = "Register Service API",
        version = "1.0.0",
        description = "User accounts with JWT sessions"
    )
)]
pub struct ApiDoc;

/// Everything the HTTP layer needs from the outside
#[derive(Clone)]
pub struct ApiDependencies {
    pub use_cases: UseCaseFactory,
    pub jwt_config: JwtConfig,
    pub secure_cookies: bool,
    /// `None` when users live in memory
    pub db: Option<DatabaseConnection>,
    pub metrics_handle: PrometheusHandle,
}

/// Create the API router with all routes
pub fn create_api_router(deps: ApiDependencies) -> Router {
    let auth_layer = middleware::from_fn_with_state(
        AuthState {
            jwt_config: deps.jwt_config.clone(),
        },
        auth_middleware,
    );

    let user_state = UserHandlerState {
        use_cases: deps.use_cases.clone(),
    };

    // POST /users is public, the other methods need a bearer token
    let user_routes = Router::new()
        .route(
            "/users",
            get(users::profile)
                .put(users::update)
                .delete(users::drop_self)
                .route_layer(auth_layer.clone())
                .post(users::register),
        )
        .route(
            "/users/{id}",
            delete(users::drop_by_id).route_layer(auth_layer),
        )
        .with_state(user_state);

    let session_routes = Router::new()
        .route("/sessions", post(sessions::authenticate))
        .route("/token/refresh", patch(sessions::refresh))
        .with_state(SessionHandlerState {
            use_cases: deps.use_cases,
            jwt_config: deps.jwt_config,
            secure_cookies: deps.secure_cookies,
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            db: deps.db,
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(MetricsState {
            handle: deps.metrics_handle,
        });

    let swagger_routes =
        SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(user_routes)
        .merge(session_routes)
        // Runs after routing so the matched route template is known
        .route_layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
