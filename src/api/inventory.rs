//! Inventory API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::spare_part::{CreatePart, SparePart, StockMovement, UpdatePart},
    AppState,
};

use super::AuthenticatedUser;

/// List spare parts
#[utoipa::path(
    get,
    path = "/inventory",
    tag = "inventory",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Spare parts", body = Vec<SparePart>)
    )
)]
pub async fn list_parts(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<SparePart>>> {
    let parts = state.services.inventory.list(&claims).await?;
    Ok(Json(parts))
}

/// Get a spare part
#[utoipa::path(
    get,
    path = "/inventory/{id}",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Spare part ID")),
    responses(
        (status = 200, description = "Spare part", body = SparePart)
    )
)]
pub async fn get_part(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<SparePart>> {
    let part = state.services.inventory.get(&claims, id).await?;
    Ok(Json(part))
}

/// Add a spare part
#[utoipa::path(
    post,
    path = "/inventory",
    tag = "inventory",
    security(("bearer_auth" = [])),
    request_body = CreatePart,
    responses(
        (status = 201, description = "Spare part created", body = SparePart)
    )
)]
pub async fn create_part(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreatePart>,
) -> AppResult<(StatusCode, Json<SparePart>)> {
    let part = state.services.inventory.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(part)))
}

/// Update or restock a spare part
#[utoipa::path(
    put,
    path = "/inventory/{id}",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Spare part ID")),
    request_body = UpdatePart,
    responses(
        (status = 200, description = "Spare part updated", body = SparePart)
    )
)]
pub async fn update_part(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdatePart>,
) -> AppResult<Json<SparePart>> {
    let part = state.services.inventory.update(&claims, id, data).await?;
    Ok(Json(part))
}

/// Add stock
#[utoipa::path(
    post,
    path = "/inventory/{id}/restock",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Spare part ID")),
    request_body = StockMovement,
    responses(
        (status = 200, description = "Stock added", body = SparePart)
    )
)]
pub async fn restock_part(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(movement): Json<StockMovement>,
) -> AppResult<Json<SparePart>> {
    let part = state.services.inventory.restock(&claims, id, movement).await?;
    Ok(Json(part))
}

/// Take stock out of the ledger
#[utoipa::path(
    post,
    path = "/inventory/{id}/consume",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Spare part ID")),
    request_body = StockMovement,
    responses(
        (status = 200, description = "Stock consumed", body = SparePart),
        (status = 409, description = "Insufficient stock")
    )
)]
pub async fn consume_part(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(movement): Json<StockMovement>,
) -> AppResult<Json<SparePart>> {
    let part = state.services.inventory.consume(&claims, id, movement).await?;
    Ok(Json(part))
}

/// Remove a spare part from the catalog
#[utoipa::path(
    delete,
    path = "/inventory/{id}",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Spare part ID")),
    responses(
        (status = 204, description = "Spare part deleted")
    )
)]
pub async fn delete_part(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.inventory.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
