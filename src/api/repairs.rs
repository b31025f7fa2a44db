//! Repair request API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::repair_request::{AddComment, CreateRepairRequest, RepairPatch, RepairRequest},
    AppState,
};

use super::AuthenticatedUser;

/// List repair requests visible to the caller
#[utoipa::path(
    get,
    path = "/repairs",
    tag = "repairs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Repair requests, newest first", body = Vec<RepairRequest>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_repairs(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<RepairRequest>>> {
    let requests = state.services.repairs.list(&claims).await?;
    Ok(Json(requests))
}

/// Get a repair request
#[utoipa::path(
    get,
    path = "/repairs/{id}",
    tag = "repairs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Repair request ID")),
    responses(
        (status = 200, description = "Repair request details", body = RepairRequest),
        (status = 403, description = "Outside the caller's scope"),
        (status = 404, description = "Not found or deleted")
    )
)]
pub async fn get_repair(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RepairRequest>> {
    let request = state.services.repairs.get(&claims, id).await?;
    Ok(Json(request))
}

/// File a repair request
#[utoipa::path(
    post,
    path = "/repairs",
    tag = "repairs",
    security(("bearer_auth" = [])),
    request_body = CreateRepairRequest,
    responses(
        (status = 201, description = "Repair request created", body = RepairRequest),
        (status = 400, description = "Blank issue"),
        (status = 404, description = "Device not found"),
        (status = 422, description = "Device retired")
    )
)]
pub async fn create_repair(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateRepairRequest>,
) -> AppResult<(StatusCode, Json<RepairRequest>)> {
    let request = state.services.repairs.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Update a repair request
///
/// Accepted fields depend on the caller's role: requesters may cancel and
/// comment, the assigned technician may report progress, admins may change
/// anything.
#[utoipa::path(
    put,
    path = "/repairs/{id}",
    tag = "repairs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Repair request ID")),
    request_body = RepairPatch,
    responses(
        (status = 200, description = "Repair request updated", body = RepairRequest),
        (status = 403, description = "Field or request not allowed for this caller"),
        (status = 409, description = "Invalid transition, insufficient stock or concurrent change")
    )
)]
pub async fn update_repair(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(patch): Json<RepairPatch>,
) -> AppResult<Json<RepairRequest>> {
    let request = state.services.repairs.update(&claims, id, patch).await?;
    Ok(Json(request))
}

/// Soft delete a repair request
#[utoipa::path(
    delete,
    path = "/repairs/{id}",
    tag = "repairs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Repair request ID")),
    responses(
        (status = 204, description = "Repair request deleted")
    )
)]
pub async fn delete_repair(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.repairs.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Restore a soft-deleted repair request
#[utoipa::path(
    post,
    path = "/repairs/{id}/restore",
    tag = "repairs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Repair request ID")),
    responses(
        (status = 200, description = "Repair request restored", body = RepairRequest)
    )
)]
pub async fn restore_repair(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RepairRequest>> {
    let request = state.services.repairs.restore(&claims, id).await?;
    Ok(Json(request))
}

/// Accept an assignment
#[utoipa::path(
    post,
    path = "/repairs/{id}/accept",
    tag = "repairs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Repair request ID")),
    responses(
        (status = 200, description = "Assignment accepted", body = RepairRequest),
        (status = 403, description = "Caller is not the assignee")
    )
)]
pub async fn accept_repair(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RepairRequest>> {
    let request = state.services.repairs.accept(&claims, id).await?;
    Ok(Json(request))
}

/// Decline an assignment
#[utoipa::path(
    post,
    path = "/repairs/{id}/reject",
    tag = "repairs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Repair request ID")),
    responses(
        (status = 200, description = "Assignment declined", body = RepairRequest),
        (status = 403, description = "Caller is not the assignee")
    )
)]
pub async fn reject_repair(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RepairRequest>> {
    let request = state.services.repairs.reject(&claims, id).await?;
    Ok(Json(request))
}

/// Add a comment
#[utoipa::path(
    post,
    path = "/repairs/{id}/comments",
    tag = "repairs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Repair request ID")),
    request_body = AddComment,
    responses(
        (status = 201, description = "Comment added", body = RepairRequest),
        (status = 400, description = "Empty comment")
    )
)]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<AddComment>,
) -> AppResult<(StatusCode, Json<RepairRequest>)> {
    let request = state.services.repairs.add_comment(&claims, id, &data.text).await?;
    Ok((StatusCode::CREATED, Json(request)))
}
