//! Repository layer for database operations
//!
//! Each entity has a store trait; `Repository` bundles one implementation of
//! each. PostgreSQL is the production backend, `memory` the process-local one.

pub mod departments;
pub mod devices;
pub mod inventory;
pub mod memory;
pub mod notifications;
pub mod repairs;
pub mod reports;
pub mod settings;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        department::{CreateDepartment, Department},
        device::{Device, NewDevice},
        notification::{NewNotification, Notification},
        repair_request::{NewRepairRequest, RepairRequest},
        report::{DashboardCounts, StatusCount, TechnicianLoad},
        settings::SystemSettings,
        spare_part::{CreatePart, PartConsumption, SparePart},
        user::{NewUser, User, UserQuery},
        Role,
    },
    services::access::{DeviceScope, RequestScope},
};

#[async_trait]
pub trait UsersStore: Send + Sync {
    async fn list(&self, query: &UserQuery) -> AppResult<Vec<User>>;
    /// Includes soft-deleted users
    async fn get(&self, id: i32) -> AppResult<Option<User>>;
    /// User holding this username or email, if any
    async fn find_by_identity(&self, username: &str, email: &str) -> AppResult<Option<User>>;
    async fn create(&self, data: &NewUser) -> AppResult<User>;
    async fn save(&self, user: &User) -> AppResult<User>;
}

#[async_trait]
pub trait DevicesStore: Send + Sync {
    async fn list(&self, scope: &DeviceScope, include_deleted: bool) -> AppResult<Vec<Device>>;
    async fn get(&self, id: i32) -> AppResult<Option<Device>>;
    async fn find_by_serial(&self, serial_number: &str) -> AppResult<Option<Device>>;
    async fn create(&self, data: &NewDevice) -> AppResult<Device>;
    async fn save(&self, device: &Device) -> AppResult<Device>;
}

#[async_trait]
pub trait RepairsStore: Send + Sync {
    /// Non-deleted requests in scope, newest first
    async fn list(&self, scope: &RequestScope) -> AppResult<Vec<RepairRequest>>;
    /// Includes soft-deleted requests
    async fn get(&self, id: i32) -> AppResult<Option<RepairRequest>>;
    async fn create(&self, data: &NewRepairRequest) -> AppResult<RepairRequest>;
    /// Persist `request` and deduct `consumption` from the ledger as one unit.
    ///
    /// Fails with `Conflict` when the stored row no longer carries
    /// `request.updated_at`, and with `InsufficientStock` when any deduction
    /// would go below zero. On failure nothing is written.
    async fn save(
        &self,
        request: &RepairRequest,
        consumption: &[PartConsumption],
    ) -> AppResult<(RepairRequest, Vec<SparePart>)>;
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<SparePart>>;
    async fn get(&self, id: i32) -> AppResult<Option<SparePart>>;
    async fn get_many(&self, ids: &[i32]) -> AppResult<Vec<SparePart>>;
    async fn create(&self, data: &CreatePart) -> AppResult<SparePart>;
    async fn save(&self, part: &SparePart) -> AppResult<SparePart>;
    /// Decrement with a floor check in a single atomic step
    async fn consume(&self, id: i32, quantity: i32) -> AppResult<SparePart>;
    async fn restock(&self, id: i32, quantity: i32) -> AppResult<SparePart>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[async_trait]
pub trait NotificationsStore: Send + Sync {
    async fn create(&self, data: &NewNotification) -> AppResult<Notification>;
    /// Notifications for the user or their role, newest first
    async fn list_for(&self, user_id: i32, role: Role, limit: i64) -> AppResult<Vec<Notification>>;
    async fn get(&self, id: i32) -> AppResult<Option<Notification>>;
    async fn mark_read(&self, id: i32) -> AppResult<Notification>;
    async fn mark_all_read(&self, user_id: i32, role: Role) -> AppResult<u64>;
}

#[async_trait]
pub trait DepartmentsStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Department>>;
    async fn get(&self, id: i32) -> AppResult<Option<Department>>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Department>>;
    async fn create(&self, data: &CreateDepartment) -> AppResult<Department>;
    async fn save(&self, department: &Department) -> AppResult<Department>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self) -> AppResult<SystemSettings>;
    async fn save(&self, settings: &SystemSettings) -> AppResult<SystemSettings>;
}

#[async_trait]
pub trait ReportsStore: Send + Sync {
    async fn dashboard_counts(&self) -> AppResult<DashboardCounts>;
    async fn low_stock_parts(&self) -> AppResult<Vec<SparePart>>;
    async fn recent_requests(&self, limit: i64) -> AppResult<Vec<RepairRequest>>;
    async fn repairs_by_status(&self) -> AppResult<Vec<StatusCount>>;
    async fn repairs_by_technician(&self) -> AppResult<Vec<TechnicianLoad>>;
}

/// Main repository struct holding one store per entity
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UsersStore>,
    pub devices: Arc<dyn DevicesStore>,
    pub repairs: Arc<dyn RepairsStore>,
    pub inventory: Arc<dyn InventoryStore>,
    pub notifications: Arc<dyn NotificationsStore>,
    pub departments: Arc<dyn DepartmentsStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub reports: Arc<dyn ReportsStore>,
}

impl Repository {
    /// Create a PostgreSQL-backed repository with the given pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            devices: Arc::new(devices::DevicesRepository::new(pool.clone())),
            repairs: Arc::new(repairs::RepairsRepository::new(pool.clone())),
            inventory: Arc::new(inventory::InventoryRepository::new(pool.clone())),
            notifications: Arc::new(notifications::NotificationsRepository::new(pool.clone())),
            departments: Arc::new(departments::DepartmentsRepository::new(pool.clone())),
            settings: Arc::new(settings::SettingsRepository::new(pool.clone())),
            reports: Arc::new(reports::ReportsRepository::new(pool)),
        }
    }

    /// Create a process-local repository (nothing survives a restart)
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            users: store.clone(),
            devices: store.clone(),
            repairs: store.clone(),
            inventory: store.clone(),
            notifications: store.clone(),
            departments: store.clone(),
            settings: store.clone(),
            reports: store,
        }
    }
}

/// Turn a unique-constraint violation into a `Conflict`
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: impl Into<String>) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(message.into()),
        _ => AppError::Database(e),
    }
}
