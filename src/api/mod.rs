//! API handlers for ERMS REST endpoints

pub mod departments;
pub mod devices;
pub mod health;
pub mod inventory;
pub mod notifications;
pub mod openapi;
pub mod repairs;
pub mod reports;
pub mod settings;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Repair requests
        .route("/repairs", get(repairs::list_repairs).post(repairs::create_repair))
        .route(
            "/repairs/:id",
            get(repairs::get_repair)
                .put(repairs::update_repair)
                .delete(repairs::delete_repair),
        )
        .route("/repairs/:id/restore", post(repairs::restore_repair))
        .route("/repairs/:id/accept", post(repairs::accept_repair))
        .route("/repairs/:id/reject", post(repairs::reject_repair))
        .route("/repairs/:id/comments", post(repairs::add_comment))
        // Inventory
        .route("/inventory", get(inventory::list_parts).post(inventory::create_part))
        .route(
            "/inventory/:id",
            get(inventory::get_part)
                .put(inventory::update_part)
                .delete(inventory::delete_part),
        )
        .route("/inventory/:id/restock", post(inventory::restock_part))
        .route("/inventory/:id/consume", post(inventory::consume_part))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/:id/read", put(notifications::mark_read))
        // Devices
        .route("/devices", get(devices::list_devices).post(devices::create_device))
        .route(
            "/devices/:id",
            get(devices::get_device)
                .put(devices::update_device)
                .delete(devices::delete_device),
        )
        .route("/devices/:id/restore", post(devices::restore_device))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/me", get(users::me))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/:id/restore", post(users::restore_user))
        // Departments
        .route(
            "/departments",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/departments/:id",
            put(departments::update_department).delete(departments::delete_department),
        )
        // Settings
        .route("/settings", get(settings::get_settings).put(settings::update_settings))
        // Dashboard & reports
        .route("/dashboard", get(reports::dashboard))
        .route("/reports", get(reports::repairs_report))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
