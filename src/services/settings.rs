//! System settings service

use crate::{
    error::{AppError, AppResult},
    models::{
        settings::{SystemSettings, UpdateSettings},
        UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SettingsService {
    repository: Repository,
}

impl SettingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self) -> AppResult<SystemSettings> {
        self.repository.settings.get().await
    }

    pub async fn update(&self, claims: &UserClaims, data: UpdateSettings) -> AppResult<SystemSettings> {
        claims.require_admin()?;
        if matches!(data.system_name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(AppError::Validation("System name must not be empty".to_string()));
        }
        if matches!(data.default_currency.as_deref(), Some(c) if c.trim().len() != 3) {
            return Err(AppError::Validation("Currency must be a 3-letter code".to_string()));
        }

        let mut settings = self.repository.settings.get().await?;
        settings.apply_update(&data);
        let saved = self.repository.settings.save(&settings).await?;
        tracing::info!(
            "Settings updated (notifications {})",
            if saved.notifications_enabled { "enabled" } else { "disabled" }
        );
        Ok(saved)
    }
}
