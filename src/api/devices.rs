//! Device endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::device::{CreateDevice, Device, UpdateDevice},
    AppState,
};

use super::AuthenticatedUser;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DeviceQuery {
    /// Include soft-deleted devices (admin only)
    pub deleted: Option<bool>,
}

/// List devices visible to the caller
#[utoipa::path(
    get,
    path = "/devices",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(DeviceQuery),
    responses(
        (status = 200, description = "Devices", body = Vec<Device>)
    )
)]
pub async fn list_devices(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DeviceQuery>,
) -> AppResult<Json<Vec<Device>>> {
    let devices = state
        .services
        .devices
        .list(&claims, query.deleted.unwrap_or(false))
        .await?;
    Ok(Json(devices))
}

/// Get device details
#[utoipa::path(
    get,
    path = "/devices/{id}",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device details", body = Device),
        (status = 403, description = "Outside the caller's scope"),
        (status = 404, description = "Device not found")
    )
)]
pub async fn get_device(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Device>> {
    let device = state.services.devices.get(&claims, id).await?;
    Ok(Json(device))
}

/// Register a device
#[utoipa::path(
    post,
    path = "/devices",
    tag = "devices",
    security(("bearer_auth" = [])),
    request_body = CreateDevice,
    responses(
        (status = 201, description = "Device registered", body = Device),
        (status = 409, description = "Serial number already registered")
    )
)]
pub async fn create_device(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateDevice>,
) -> AppResult<(StatusCode, Json<Device>)> {
    let device = state.services.devices.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// Update a device
#[utoipa::path(
    put,
    path = "/devices/{id}",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Device ID")),
    request_body = UpdateDevice,
    responses(
        (status = 200, description = "Device updated", body = Device)
    )
)]
pub async fn update_device(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateDevice>,
) -> AppResult<Json<Device>> {
    let device = state.services.devices.update(&claims, id, data).await?;
    Ok(Json(device))
}

/// Soft delete a device
#[utoipa::path(
    delete,
    path = "/devices/{id}",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Device ID")),
    responses(
        (status = 204, description = "Device deleted")
    )
)]
pub async fn delete_device(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.devices.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Restore a soft-deleted device
#[utoipa::path(
    post,
    path = "/devices/{id}/restore",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device restored", body = Device)
    )
)]
pub async fn restore_device(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Device>> {
    let device = state.services.devices.restore(&claims, id).await?;
    Ok(Json(device))
}
