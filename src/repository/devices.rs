//! Devices repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::{conflict_on_unique, DevicesStore};
use crate::{
    error::{AppError, AppResult},
    models::device::{Device, NewDevice},
    services::access::DeviceScope,
};

#[derive(Clone)]
pub struct DevicesRepository {
    pool: Pool<Postgres>,
}

impl DevicesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DevicesStore for DevicesRepository {
    async fn list(&self, scope: &DeviceScope, include_deleted: bool) -> AppResult<Vec<Device>> {
        let mut conditions = Vec::new();
        if !include_deleted {
            conditions.push("d.is_deleted = FALSE".to_string());
        }

        let owner = match *scope {
            DeviceScope::All => None,
            DeviceScope::HeldBy(user_id) => {
                conditions.push("d.assigned_to_id = $1".to_string());
                Some(user_id)
            }
            DeviceScope::ServicedBy(tech_id) => {
                conditions.push(
                    r#"EXISTS (
                        SELECT 1 FROM repair_requests r
                        WHERE r.device_id = d.id AND r.assigned_to_id = $1 AND r.is_deleted = FALSE
                    )"#
                    .to_string(),
                );
                Some(tech_id)
            }
        };

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!("SELECT d.* FROM devices d {} ORDER BY d.created_at DESC", where_clause);
        let mut builder = sqlx::query_as::<_, Device>(&query);
        if let Some(id) = owner {
            builder = builder.bind(id);
        }
        Ok(builder.fetch_all(&self.pool).await?)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Device>> {
        let device = sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(device)
    }

    async fn find_by_serial(&self, serial_number: &str) -> AppResult<Option<Device>> {
        let device = sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE serial_number = $1")
            .bind(serial_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(device)
    }

    async fn create(&self, data: &NewDevice) -> AppResult<Device> {
        let now = Utc::now();
        sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (
                device_name, serial_number, device_type, brand, model,
                condition, status, assigned_to_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(&data.device_name)
        .bind(&data.serial_number)
        .bind(&data.device_type)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.condition)
        .bind(data.status)
        .bind(data.assigned_to_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Serial number already registered"))
    }

    async fn save(&self, device: &Device) -> AppResult<Device> {
        sqlx::query_as::<_, Device>(
            r#"
            UPDATE devices SET
                device_name = $2, serial_number = $3, device_type = $4, brand = $5,
                model = $6, condition = $7, status = $8, assigned_to_id = $9,
                is_deleted = $10, updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(device.id)
        .bind(&device.device_name)
        .bind(&device.serial_number)
        .bind(&device.device_type)
        .bind(&device.brand)
        .bind(&device.model)
        .bind(&device.condition)
        .bind(device.status)
        .bind(device.assigned_to_id)
        .bind(device.is_deleted)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Serial number already registered"))?
        .ok_or_else(|| AppError::NotFound(format!("Device {} not found", device.id)))
    }
}
