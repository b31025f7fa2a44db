//! Device model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::DeviceStatus;

/// Physical asset tracked by the repair desk
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Device {
    pub id: i32,
    pub device_name: String,
    pub serial_number: String,
    /// Laptop, Phone, Printer...
    pub device_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: Option<String>,
    pub status: DeviceStatus,
    /// Holder of the device; may point at a soft-deleted user
    pub assigned_to_id: Option<i32>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    /// Whether new repair requests may reference this device
    pub fn accepts_requests(&self) -> bool {
        !self.is_deleted && self.status != DeviceStatus::Retired
    }
}

/// Create device request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDevice {
    #[validate(length(min = 1, message = "Device name is required"))]
    pub device_name: String,
    #[validate(length(min = 1, message = "Serial number is required"))]
    pub serial_number: String,
    #[validate(length(min = 1, message = "Device type is required"))]
    pub device_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: Option<String>,
    pub status: Option<DeviceStatus>,
    /// Ignored for self-registration (the device goes to the caller)
    pub assigned_to_id: Option<i32>,
}

/// Update device request (admin only)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDevice {
    pub device_name: Option<String>,
    pub serial_number: Option<String>,
    pub device_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: Option<String>,
    pub status: Option<DeviceStatus>,
    /// `null` unassigns the device
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub assigned_to_id: Option<Option<i32>>,
}

/// Insert payload handed to the store
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub device_name: String,
    pub serial_number: String,
    pub device_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: Option<String>,
    pub status: DeviceStatus,
    pub assigned_to_id: Option<i32>,
}

impl Device {
    pub fn apply_update(&mut self, data: &UpdateDevice) {
        if let Some(ref name) = data.device_name {
            self.device_name = name.clone();
        }
        if let Some(ref serial) = data.serial_number {
            self.serial_number = serial.trim().to_string();
        }
        if let Some(ref device_type) = data.device_type {
            self.device_type = device_type.clone();
        }
        if data.brand.is_some() {
            self.brand = data.brand.clone();
        }
        if data.model.is_some() {
            self.model = data.model.clone();
        }
        if data.condition.is_some() {
            self.condition = data.condition.clone();
        }
        if let Some(status) = data.status {
            self.status = status;
        }
        if let Some(assigned) = data.assigned_to_id {
            self.assigned_to_id = assigned;
        }
    }
}
