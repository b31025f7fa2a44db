//! Business logic services

pub mod access;
pub mod departments;
pub mod devices;
pub mod inventory;
pub mod notifications;
pub mod repairs;
pub mod reports;
pub mod settings;
pub mod users;
pub mod workflow;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repairs: repairs::RepairsService,
    pub inventory: inventory::InventoryService,
    pub notifications: notifications::NotificationsService,
    pub dispatcher: notifications::NotificationDispatcher,
    pub users: users::UsersService,
    pub devices: devices::DevicesService,
    pub departments: departments::DepartmentsService,
    pub settings: settings::SettingsService,
    pub reports: reports::ReportsService,
}

impl Services {
    /// Create all services with the given repository
    pub async fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        // Fail early when the store is unreachable
        let settings = repository.settings.get().await?;
        tracing::info!(
            "Loaded settings for '{}', notifications {}",
            settings.system_name,
            if settings.notifications_enabled { "enabled" } else { "disabled" }
        );

        let dispatcher = notifications::NotificationDispatcher::new(&repository, &config.notifications);

        Ok(Self {
            repairs: repairs::RepairsService::new(repository.clone(), &config.workflow, dispatcher.clone()),
            inventory: inventory::InventoryService::new(repository.clone(), dispatcher.clone()),
            notifications: notifications::NotificationsService::new(repository.clone(), &config.notifications),
            dispatcher,
            users: users::UsersService::new(repository.clone()),
            devices: devices::DevicesService::new(repository.clone()),
            departments: departments::DepartmentsService::new(repository.clone()),
            settings: settings::SettingsService::new(repository.clone()),
            reports: reports::ReportsService::new(repository),
        })
    }
}
