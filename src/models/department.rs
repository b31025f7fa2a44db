//! Department model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Department record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub manager: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create department request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDepartment {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub manager: Option<String>,
    pub location: Option<String>,
}

/// Update department request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub description: Option<String>,
    pub manager: Option<String>,
    pub location: Option<String>,
}

impl Department {
    pub fn apply_update(&mut self, data: &UpdateDepartment) {
        if let Some(ref name) = data.name {
            self.name = name.trim().to_string();
        }
        if data.description.is_some() {
            self.description = data.description.clone();
        }
        if data.manager.is_some() {
            self.manager = data.manager.clone();
        }
        if data.location.is_some() {
            self.location = data.location.clone();
        }
    }
}
