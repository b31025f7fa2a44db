//! System settings model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Singleton system settings row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SystemSettings {
    pub system_name: String,
    pub contact_email: Option<String>,
    pub maintenance_mode: bool,
    pub default_currency: String,
    /// When false, workflow events produce no notifications
    pub notifications_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            system_name: "ERMS".to_string(),
            contact_email: None,
            maintenance_mode: false,
            default_currency: "USD".to_string(),
            notifications_enabled: true,
            updated_at: Utc::now(),
        }
    }
}

/// Update settings request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSettings {
    pub system_name: Option<String>,
    pub contact_email: Option<String>,
    pub maintenance_mode: Option<bool>,
    pub default_currency: Option<String>,
    pub notifications_enabled: Option<bool>,
}

impl SystemSettings {
    pub fn apply_update(&mut self, data: &UpdateSettings) {
        if let Some(ref name) = data.system_name {
            self.system_name = name.clone();
        }
        if data.contact_email.is_some() {
            self.contact_email = data.contact_email.clone();
        }
        if let Some(mode) = data.maintenance_mode {
            self.maintenance_mode = mode;
        }
        if let Some(ref currency) = data.default_currency {
            self.default_currency = currency.to_uppercase();
        }
        if let Some(enabled) = data.notifications_enabled {
            self.notifications_enabled = enabled;
        }
    }
}
