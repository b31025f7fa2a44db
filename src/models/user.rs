//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{Role, UserStatus};
use crate::error::AppError;

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub email: String,
    /// Argon2 hash; never leaves the server
    #[serde(skip)]
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    /// Technician specialty (e.g. "Laptops", "Printers")
    pub specialty: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Live technicians are the only valid repair assignees
    pub fn is_assignable_technician(&self) -> bool {
        self.role == Role::Technician && self.status == UserStatus::Active && !self.is_deleted
    }
}

/// User query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    /// Case-insensitive match on name, email or username
    pub search: Option<String>,
    /// Include soft-deleted users
    pub deleted: Option<bool>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub specialty: Option<String>,
    pub role: Option<Role>,
}

/// Update user request (admin only)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub specialty: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

/// Insert payload handed to the store, with the password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub specialty: Option<String>,
    pub role: Role,
}

impl User {
    /// Apply an admin update in place (password handled by the caller)
    pub fn apply_update(&mut self, data: &UpdateUser) {
        if let Some(ref name) = data.name {
            self.name = name.clone();
        }
        if let Some(ref email) = data.email {
            self.email = email.trim().to_lowercase();
        }
        if data.phone.is_some() {
            self.phone = data.phone.clone();
        }
        if data.address.is_some() {
            self.address = data.address.clone();
        }
        if data.department.is_some() {
            self.department = data.department.clone();
        }
        if data.specialty.is_some() {
            self.specialty = data.specialty.clone();
        }
        if let Some(role) = data.role {
            self.role = role;
        }
        if let Some(status) = data.status {
            self.status = status;
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    /// Display name used in notification messages
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Build claims valid for `hours` from now
    pub fn new(user_id: i32, username: &str, name: &str, role: Role, hours: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: username.to_string(),
            user_id,
            role,
            name: name.to_string(),
            exp: now + hours * 3600,
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    /// Require one of the given roles
    pub fn require_any(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Role '{}' is not allowed to perform this operation",
                self.role
            )))
        }
    }
}
