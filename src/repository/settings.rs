//! System settings repository (single row, id = 1)

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::SettingsStore;
use crate::{error::AppResult, models::settings::SystemSettings};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: Pool<Postgres>,
}

impl SettingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for SettingsRepository {
    async fn get(&self) -> AppResult<SystemSettings> {
        let settings = sqlx::query_as::<_, SystemSettings>(
            r#"
            SELECT system_name, contact_email, maintenance_mode, default_currency,
                   notifications_enabled, updated_at
            FROM system_settings WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(settings.unwrap_or_default())
    }

    async fn save(&self, settings: &SystemSettings) -> AppResult<SystemSettings> {
        let saved = sqlx::query_as::<_, SystemSettings>(
            r#"
            INSERT INTO system_settings (
                id, system_name, contact_email, maintenance_mode, default_currency,
                notifications_enabled, updated_at
            ) VALUES (1, $1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                system_name = EXCLUDED.system_name,
                contact_email = EXCLUDED.contact_email,
                maintenance_mode = EXCLUDED.maintenance_mode,
                default_currency = EXCLUDED.default_currency,
                notifications_enabled = EXCLUDED.notifications_enabled,
                updated_at = EXCLUDED.updated_at
            RETURNING system_name, contact_email, maintenance_mode, default_currency,
                      notifications_enabled, updated_at
            "#,
        )
        .bind(&settings.system_name)
        .bind(&settings.contact_email)
        .bind(settings.maintenance_mode)
        .bind(&settings.default_currency)
        .bind(settings.notifications_enabled)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }
}
