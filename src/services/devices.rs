//! Device registry service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        device::{CreateDevice, Device, NewDevice, UpdateDevice},
        DeviceStatus, Role, UserClaims,
    },
    repository::Repository,
};

use super::access::{DeviceScope, RequestScope};

#[derive(Clone)]
pub struct DevicesService {
    repository: Repository,
}

impl DevicesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Devices visible to the caller; only admins may include deleted ones
    pub async fn list(&self, claims: &UserClaims, include_deleted: bool) -> AppResult<Vec<Device>> {
        let include_deleted = include_deleted && claims.is_admin();
        self.repository
            .devices
            .list(&DeviceScope::for_caller(claims), include_deleted)
            .await
    }

    pub async fn get(&self, claims: &UserClaims, id: i32) -> AppResult<Device> {
        let device = self.find_live(id).await?;
        let scope = DeviceScope::for_caller(claims);

        let assigned = match scope {
            DeviceScope::ServicedBy(tech_id) => {
                self.repository
                    .repairs
                    .list(&RequestScope::AssignedTo(tech_id))
                    .await?
            }
            _ => Vec::new(),
        };
        if !scope.permits(&device, &assigned) {
            return Err(AppError::Authorization(format!(
                "Not authorized to view device {}",
                id
            )));
        }
        Ok(device)
    }

    /// Admins register any device; users register their own
    pub async fn create(&self, claims: &UserClaims, data: CreateDevice) -> AppResult<Device> {
        claims.require_any(&[Role::Admin, Role::User])?;
        data.validate()?;

        let serial_number = data.serial_number.trim().to_string();
        if self.repository.devices.find_by_serial(&serial_number).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Serial number '{}' already registered",
                serial_number
            )));
        }

        let assigned_to_id = if claims.is_admin() {
            data.assigned_to_id
        } else {
            Some(claims.user_id)
        };
        if let Some(holder) = assigned_to_id {
            self.ensure_live_user(holder).await?;
        }

        let device = self
            .repository
            .devices
            .create(&NewDevice {
                device_name: data.device_name,
                serial_number,
                device_type: data.device_type,
                brand: data.brand,
                model: data.model,
                condition: data.condition,
                status: data.status.unwrap_or(DeviceStatus::Active),
                assigned_to_id,
            })
            .await?;
        tracing::info!("Device {} '{}' registered", device.id, device.serial_number);
        Ok(device)
    }

    pub async fn update(&self, claims: &UserClaims, id: i32, data: UpdateDevice) -> AppResult<Device> {
        claims.require_admin()?;
        let mut device = self.find_live(id).await?;

        if let Some(ref serial) = data.serial_number {
            let serial = serial.trim();
            if serial.is_empty() {
                return Err(AppError::Validation("Serial number is required".to_string()));
            }
            if let Some(existing) = self.repository.devices.find_by_serial(serial).await? {
                if existing.id != id {
                    return Err(AppError::Conflict(format!(
                        "Serial number '{}' already registered",
                        serial
                    )));
                }
            }
        }
        if let Some(Some(holder)) = data.assigned_to_id {
            self.ensure_live_user(holder).await?;
        }

        device.apply_update(&data);
        self.repository.devices.save(&device).await
    }

    pub async fn delete(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_admin()?;
        let mut device = self.find_live(id).await?;
        device.is_deleted = true;
        device.status = DeviceStatus::Retired;
        self.repository.devices.save(&device).await?;
        tracing::info!("Device {} deleted", id);
        Ok(())
    }

    pub async fn restore(&self, claims: &UserClaims, id: i32) -> AppResult<Device> {
        claims.require_admin()?;
        let mut device = self
            .repository
            .devices
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device {} not found", id)))?;
        if !device.is_deleted {
            return Ok(device);
        }
        device.is_deleted = false;
        device.status = DeviceStatus::Active;
        let device = self.repository.devices.save(&device).await?;
        tracing::info!("Device {} restored", id);
        Ok(device)
    }

    async fn find_live(&self, id: i32) -> AppResult<Device> {
        self.repository
            .devices
            .get(id)
            .await?
            .filter(|d| !d.is_deleted)
            .ok_or_else(|| AppError::NotFound(format!("Device {} not found", id)))
    }

    async fn ensure_live_user(&self, id: i32) -> AppResult<()> {
        match self.repository.users.get(id).await? {
            Some(user) if !user.is_deleted => Ok(()),
            _ => Err(AppError::Validation(format!("User {} does not exist", id))),
        }
    }
}
