//! Dashboard and report endpoints (admin only)

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::report::{DashboardStats, RepairsReport},
    AppState,
};

use super::AuthenticatedUser;

/// Admin dashboard
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counters, low-stock parts and recent requests", body = DashboardStats),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.reports.dashboard(&claims).await?;
    Ok(Json(stats))
}

/// Repairs grouped by status and by technician
#[utoipa::path(
    get,
    path = "/reports",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Repair aggregates", body = RepairsReport),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn repairs_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<RepairsReport>> {
    let report = state.services.reports.repairs(&claims).await?;
    Ok(Json(report))
}
