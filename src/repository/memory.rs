//! Process-local backend
//!
//! All tables live behind one async mutex, so every trait method is a single
//! critical section. `RepairsStore::save` checks every deduction and the
//! version before writing anything.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use super::{
    inventory::restock_overflow, DepartmentsStore, DevicesStore, InventoryStore, NotificationsStore,
    RepairsStore, ReportsStore, SettingsStore, UsersStore,
};
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
        RepairStage, RepairStatus, Role, UserStatus,
    },
    services::access::{DeviceScope, RequestScope},
};

#[derive(Default)]
struct Tables {
    next_id: i32,
    users: Vec<User>,
    devices: Vec<Device>,
    repairs: Vec<RepairRequest>,
    parts: Vec<SparePart>,
    notifications: Vec<Notification>,
    departments: Vec<Department>,
    settings: Option<SystemSettings>,
}

impl Tables {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of every store trait
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

/// New version stamp, strictly after `previous`
fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i32)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn insufficient(part: &SparePart, quantity: i32) -> AppError {
    AppError::InsufficientStock(format!(
        "{} has {} in stock, {} requested",
        part.name, part.quantity, quantity
    ))
}

fn part_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Spare part {} not found", id))
}

#[async_trait]
impl UsersStore for MemoryStore {
    async fn list(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        let tables = self.tables.lock().await;
        let search = query.search.as_ref().map(|s| s.to_lowercase());
        let mut users: Vec<User> = tables
            .users
            .iter()
            .filter(|u| query.deleted.unwrap_or(false) || !u.is_deleted)
            .filter(|u| query.role.map_or(true, |r| u.role == r))
            .filter(|u| query.status.map_or(true, |s| u.status == s))
            .filter(|u| {
                search.as_ref().map_or(true, |s| {
                    u.name.to_lowercase().contains(s)
                        || u.email.to_lowercase().contains(s)
                        || u.username.to_lowercase().contains(s)
                })
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn get(&self, id: i32) -> AppResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_identity(&self, username: &str, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username) || u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, data: &NewUser) -> AppResult<User> {
        let mut tables = self.tables.lock().await;
        let taken = tables.users.iter().any(|u| {
            u.username.eq_ignore_ascii_case(&data.username) || u.email.eq_ignore_ascii_case(&data.email)
        });
        if taken {
            return Err(AppError::Conflict("Username or email already in use".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: tables.allocate_id(),
            name: data.name.clone(),
            username: data.username.clone(),
            email: data.email.clone(),
            password: data.password_hash.clone(),
            phone: data.phone.clone(),
            address: data.address.clone(),
            department: data.department.clone(),
            specialty: data.specialty.clone(),
            role: data.role,
            status: UserStatus::Active,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> AppResult<User> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .iter()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict("Username or email already in use".to_string()));
        }
        let stored = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user.id)))?;
        let updated_at = next_stamp(stored.updated_at);
        *stored = User {
            updated_at,
            ..user.clone()
        };
        Ok(stored.clone())
    }
}

#[async_trait]
impl DevicesStore for MemoryStore {
    async fn list(&self, scope: &DeviceScope, include_deleted: bool) -> AppResult<Vec<Device>> {
        let tables = self.tables.lock().await;
        let mut devices: Vec<Device> = tables
            .devices
            .iter()
            .filter(|d| include_deleted || !d.is_deleted)
            .filter(|d| match *scope {
                DeviceScope::All => true,
                DeviceScope::HeldBy(user_id) => d.assigned_to_id == Some(user_id),
                DeviceScope::ServicedBy(tech_id) => tables.repairs.iter().any(|r| {
                    !r.is_deleted && r.device_id == d.id && r.assigned_to_id == Some(tech_id)
                }),
            })
            .cloned()
            .collect();
        newest_first(&mut devices, |d| (d.created_at, d.id));
        Ok(devices)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Device>> {
        let tables = self.tables.lock().await;
        Ok(tables.devices.iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_serial(&self, serial_number: &str) -> AppResult<Option<Device>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .devices
            .iter()
            .find(|d| d.serial_number == serial_number)
            .cloned())
    }

    async fn create(&self, data: &NewDevice) -> AppResult<Device> {
        let mut tables = self.tables.lock().await;
        if tables.devices.iter().any(|d| d.serial_number == data.serial_number) {
            return Err(AppError::Conflict("Serial number already registered".to_string()));
        }
        let now = Utc::now();
        let device = Device {
            id: tables.allocate_id(),
            device_name: data.device_name.clone(),
            serial_number: data.serial_number.clone(),
            device_type: data.device_type.clone(),
            brand: data.brand.clone(),
            model: data.model.clone(),
            condition: data.condition.clone(),
            status: data.status,
            assigned_to_id: data.assigned_to_id,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        tables.devices.push(device.clone());
        Ok(device)
    }

    async fn save(&self, device: &Device) -> AppResult<Device> {
        let mut tables = self.tables.lock().await;
        if tables
            .devices
            .iter()
            .any(|d| d.id != device.id && d.serial_number == device.serial_number)
        {
            return Err(AppError::Conflict("Serial number already registered".to_string()));
        }
        let stored = tables
            .devices
            .iter_mut()
            .find(|d| d.id == device.id)
            .ok_or_else(|| AppError::NotFound(format!("Device {} not found", device.id)))?;
        let updated_at = next_stamp(stored.updated_at);
        *stored = Device {
            updated_at,
            ..device.clone()
        };
        Ok(stored.clone())
    }
}

#[async_trait]
impl RepairsStore for MemoryStore {
    async fn list(&self, scope: &RequestScope) -> AppResult<Vec<RepairRequest>> {
        let tables = self.tables.lock().await;
        let mut requests: Vec<RepairRequest> = tables
            .repairs
            .iter()
            .filter(|r| !r.is_deleted && scope.permits(r))
            .cloned()
            .collect();
        newest_first(&mut requests, |r| (r.created_at, r.id));
        Ok(requests)
    }

    async fn get(&self, id: i32) -> AppResult<Option<RepairRequest>> {
        let tables = self.tables.lock().await;
        Ok(tables.repairs.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, data: &NewRepairRequest) -> AppResult<RepairRequest> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let request = RepairRequest {
            id: tables.allocate_id(),
            device_id: data.device_id,
            requested_by_id: data.requested_by_id,
            assigned_to_id: data.assigned_to_id,
            issue: data.issue.clone(),
            detailed_description: data.detailed_description.clone(),
            problem_category: data.problem_category.clone(),
            service_type: data.service_type.clone(),
            address: data.address.clone(),
            deadline: data.deadline,
            admin_instructions: data.admin_instructions.clone(),
            status: RepairStatus::Pending,
            repair_stage: RepairStage::Diagnosing,
            priority: data.priority,
            accepted: false,
            is_paused: false,
            comments: Vec::new(),
            parts_used: Vec::new(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        tables.repairs.push(request.clone());
        Ok(request)
    }

    async fn save(
        &self,
        request: &RepairRequest,
        consumption: &[PartConsumption],
    ) -> AppResult<(RepairRequest, Vec<SparePart>)> {
        let mut tables = self.tables.lock().await;

        let position = tables
            .repairs
            .iter()
            .position(|r| r.id == request.id && r.updated_at == request.updated_at)
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Repair request {} was modified concurrently, reload and retry",
                    request.id
                ))
            })?;

        // Validate every deduction (summing repeats) before touching anything
        let mut totals: HashMap<i32, i32> = HashMap::new();
        for line in consumption {
            *totals.entry(line.part_id).or_default() += line.quantity;
        }
        for (&part_id, &quantity) in &totals {
            let part = tables
                .parts
                .iter()
                .find(|p| p.id == part_id)
                .ok_or_else(|| part_not_found(part_id))?;
            if part.quantity < quantity {
                return Err(insufficient(part, quantity));
            }
        }

        let now = Utc::now();
        let mut touched = Vec::with_capacity(consumption.len());
        for line in consumption {
            if let Some(part) = tables.parts.iter_mut().find(|p| p.id == line.part_id) {
                part.quantity -= line.quantity;
                part.updated_at = now;
                part.refresh_status();
                touched.push(part.clone());
            }
        }

        let stored = &mut tables.repairs[position];
        let updated_at = next_stamp(stored.updated_at);
        *stored = RepairRequest {
            updated_at,
            ..request.clone()
        };
        Ok((stored.clone(), touched))
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<SparePart>> {
        let tables = self.tables.lock().await;
        let mut parts = tables.parts.clone();
        parts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(parts)
    }

    async fn get(&self, id: i32) -> AppResult<Option<SparePart>> {
        let tables = self.tables.lock().await;
        Ok(tables.parts.iter().find(|p| p.id == id).cloned())
    }

    async fn get_many(&self, ids: &[i32]) -> AppResult<Vec<SparePart>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .parts
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn create(&self, data: &CreatePart) -> AppResult<SparePart> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let part = SparePart::new(
            tables.allocate_id(),
            data.name.trim().to_string(),
            data.category.clone(),
            data.quantity,
            data.min_stock,
            data.price,
            now,
            now,
        );
        tables.parts.push(part.clone());
        Ok(part)
    }

    async fn save(&self, part: &SparePart) -> AppResult<SparePart> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .parts
            .iter_mut()
            .find(|p| p.id == part.id)
            .ok_or_else(|| part_not_found(part.id))?;
        *stored = SparePart {
            updated_at: Utc::now(),
            ..part.clone()
        };
        stored.refresh_status();
        Ok(stored.clone())
    }

    async fn consume(&self, id: i32, quantity: i32) -> AppResult<SparePart> {
        let mut tables = self.tables.lock().await;
        let part = tables
            .parts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| part_not_found(id))?;
        if part.quantity < quantity {
            return Err(insufficient(part, quantity));
        }
        part.quantity -= quantity;
        part.updated_at = Utc::now();
        part.refresh_status();
        Ok(part.clone())
    }

    async fn restock(&self, id: i32, quantity: i32) -> AppResult<SparePart> {
        let mut tables = self.tables.lock().await;
        let part = tables
            .parts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| part_not_found(id))?;
        let on_hand = part.quantity;
        part.quantity = on_hand
            .checked_add(quantity)
            .ok_or_else(|| restock_overflow(id, on_hand, quantity))?;
        part.updated_at = Utc::now();
        part.refresh_status();
        Ok(part.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let before = tables.parts.len();
        tables.parts.retain(|p| p.id != id);
        if tables.parts.len() == before {
            return Err(part_not_found(id));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationsStore for MemoryStore {
    async fn create(&self, data: &NewNotification) -> AppResult<Notification> {
        let mut tables = self.tables.lock().await;
        let notification = Notification {
            id: tables.allocate_id(),
            target: data.target.clone(),
            kind: data.kind,
            message: data.message.clone(),
            read: false,
            related_id: data.related.map(|(_, id)| id),
            related_kind: data.related.map(|(kind, _)| kind),
            created_at: Utc::now(),
        };
        tables.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_for(&self, user_id: i32, role: Role, limit: i64) -> AppResult<Vec<Notification>> {
        let tables = self.tables.lock().await;
        let mut visible: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.target.includes(user_id, role))
            .cloned()
            .collect();
        newest_first(&mut visible, |n| (n.created_at, n.id));
        visible.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(visible)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Notification>> {
        let tables = self.tables.lock().await;
        Ok(tables.notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn mark_read(&self, id: i32) -> AppResult<Notification> {
        let mut tables = self.tables.lock().await;
        let notification = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;
        notification.read = true;
        Ok(notification.clone())
    }

    async fn mark_all_read(&self, user_id: i32, role: Role) -> AppResult<u64> {
        let mut tables = self.tables.lock().await;
        let mut updated = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| !n.read && n.target.includes(user_id, role))
        {
            n.read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl DepartmentsStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Department>> {
        let tables = self.tables.lock().await;
        let mut departments = tables.departments.clone();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Department>> {
        let tables = self.tables.lock().await;
        Ok(tables.departments.iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Department>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .departments
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn create(&self, data: &CreateDepartment) -> AppResult<Department> {
        let mut tables = self.tables.lock().await;
        let name = data.name.trim();
        if tables.departments.iter().any(|d| d.name.eq_ignore_ascii_case(name)) {
            return Err(AppError::Conflict("Department name already exists".to_string()));
        }
        let now = Utc::now();
        let department = Department {
            id: tables.allocate_id(),
            name: name.to_string(),
            description: data.description.clone(),
            manager: data.manager.clone(),
            location: data.location.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.departments.push(department.clone());
        Ok(department)
    }

    async fn save(&self, department: &Department) -> AppResult<Department> {
        let mut tables = self.tables.lock().await;
        if tables
            .departments
            .iter()
            .any(|d| d.id != department.id && d.name.eq_ignore_ascii_case(&department.name))
        {
            return Err(AppError::Conflict("Department name already exists".to_string()));
        }
        let stored = tables
            .departments
            .iter_mut()
            .find(|d| d.id == department.id)
            .ok_or_else(|| AppError::NotFound(format!("Department {} not found", department.id)))?;
        *stored = Department {
            updated_at: Utc::now(),
            ..department.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let before = tables.departments.len();
        tables.departments.retain(|d| d.id != id);
        if tables.departments.len() == before {
            return Err(AppError::NotFound(format!("Department {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self) -> AppResult<SystemSettings> {
        let tables = self.tables.lock().await;
        Ok(tables.settings.clone().unwrap_or_default())
    }

    async fn save(&self, settings: &SystemSettings) -> AppResult<SystemSettings> {
        let mut tables = self.tables.lock().await;
        let saved = SystemSettings {
            updated_at: Utc::now(),
            ..settings.clone()
        };
        tables.settings = Some(saved.clone());
        Ok(saved)
    }
}

#[async_trait]
impl ReportsStore for MemoryStore {
    async fn dashboard_counts(&self) -> AppResult<DashboardCounts> {
        let tables = self.tables.lock().await;
        let live_users: Vec<&User> = tables.users.iter().filter(|u| !u.is_deleted).collect();
        let live_repairs: Vec<&RepairRequest> = tables.repairs.iter().filter(|r| !r.is_deleted).collect();
        let with_status = |status: RepairStatus| {
            live_repairs.iter().filter(|r| r.status == status).count() as i64
        };

        Ok(DashboardCounts {
            users: live_users.len() as i64,
            technicians: live_users.iter().filter(|u| u.role == Role::Technician).count() as i64,
            devices: tables.devices.iter().filter(|d| !d.is_deleted).count() as i64,
            repairs: live_repairs.len() as i64,
            pending: with_status(RepairStatus::Pending),
            in_progress: with_status(RepairStatus::InProgress),
            completed: with_status(RepairStatus::Completed),
        })
    }

    async fn low_stock_parts(&self) -> AppResult<Vec<SparePart>> {
        let tables = self.tables.lock().await;
        let mut parts: Vec<SparePart> = tables
            .parts
            .iter()
            .filter(|p| p.status.needs_restock())
            .cloned()
            .collect();
        parts.sort_by(|a, b| a.quantity.cmp(&b.quantity).then_with(|| a.name.cmp(&b.name)));
        Ok(parts)
    }

    async fn recent_requests(&self, limit: i64) -> AppResult<Vec<RepairRequest>> {
        let tables = self.tables.lock().await;
        let mut requests: Vec<RepairRequest> =
            tables.repairs.iter().filter(|r| !r.is_deleted).cloned().collect();
        newest_first(&mut requests, |r| (r.created_at, r.id));
        requests.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(requests)
    }

    async fn repairs_by_status(&self) -> AppResult<Vec<StatusCount>> {
        let tables = self.tables.lock().await;
        let counts = RepairStatus::ALL
            .iter()
            .map(|&status| StatusCount {
                status,
                count: tables
                    .repairs
                    .iter()
                    .filter(|r| !r.is_deleted && r.status == status)
                    .count() as i64,
            })
            .filter(|c| c.count > 0)
            .collect();
        Ok(counts)
    }

    async fn repairs_by_technician(&self) -> AppResult<Vec<TechnicianLoad>> {
        let tables = self.tables.lock().await;
        let mut loads: Vec<TechnicianLoad> = tables
            .users
            .iter()
            .filter(|u| u.role == Role::Technician)
            .map(|u| TechnicianLoad {
                technician_id: u.id,
                name: u.name.clone(),
                count: tables
                    .repairs
                    .iter()
                    .filter(|r| !r.is_deleted && r.assigned_to_id == Some(u.id))
                    .count() as i64,
            })
            .filter(|l| l.count > 0)
            .collect();
        loads.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        Ok(loads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn part(name: &str, quantity: i32) -> CreatePart {
        CreatePart {
            name: name.to_string(),
            category: "Storage".to_string(),
            quantity,
            min_stock: 2,
            price: Decimal::new(4999, 2),
        }
    }

    #[tokio::test]
    async fn consume_never_goes_negative() {
        let store = MemoryStore::default();
        let ssd = InventoryStore::create(&store, &part("SSD", 3)).await.unwrap();

        let after = store.consume(ssd.id, 3).await.unwrap();
        assert_eq!(after.quantity, 0);

        let err = store.consume(ssd.id, 1).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(_)));
        let unchanged = InventoryStore::get(&store, ssd.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity, 0);
    }

    #[tokio::test]
    async fn failed_save_leaves_stock_and_request_untouched() {
        let store = MemoryStore::default();
        let ram = InventoryStore::create(&store, &part("RAM", 5)).await.unwrap();
        let ssd = InventoryStore::create(&store, &part("SSD", 1)).await.unwrap();
        let request = RepairsStore::create(
            &store,
            &NewRepairRequest {
                device_id: 1,
                requested_by_id: 1,
                assigned_to_id: None,
                issue: "No boot".to_string(),
                detailed_description: String::new(),
                problem_category: "Hardware".to_string(),
                service_type: "Repair".to_string(),
                address: String::new(),
                deadline: None,
                admin_instructions: None,
                priority: crate::models::Priority::Medium,
            },
        )
        .await
        .unwrap();

        let mut changed = request.clone();
        changed.is_paused = true;
        let consumption = [
            PartConsumption { part_id: ram.id, quantity: 2 },
            PartConsumption { part_id: ssd.id, quantity: 2 },
        ];
        let err = RepairsStore::save(&store, &changed, &consumption).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(_)));

        let ram_after = InventoryStore::get(&store, ram.id).await.unwrap().unwrap();
        assert_eq!(ram_after.quantity, 5);
        let stored = RepairsStore::get(&store, request.id).await.unwrap().unwrap();
        assert!(!stored.is_paused);
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let store = MemoryStore::default();
        let request = RepairsStore::create(
            &store,
            &NewRepairRequest {
                device_id: 1,
                requested_by_id: 1,
                assigned_to_id: None,
                issue: "Cracked screen".to_string(),
                detailed_description: String::new(),
                problem_category: "Hardware".to_string(),
                service_type: "Repair".to_string(),
                address: String::new(),
                deadline: None,
                admin_instructions: None,
                priority: crate::models::Priority::High,
            },
        )
        .await
        .unwrap();

        let (saved, _) = RepairsStore::save(&store, &request, &[]).await.unwrap();
        assert!(saved.updated_at > request.updated_at);

        let err = RepairsStore::save(&store, &request, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn role_notifications_are_visible_to_every_holder() {
        let store = MemoryStore::default();
        NotificationsStore::create(
            &store,
            &NewNotification::new(
                crate::models::NotificationTarget::role(Role::Admin),
                crate::models::NotificationKind::Info,
                "New repair request",
            ),
        )
        .await
        .unwrap();

        assert_eq!(store.list_for(1, Role::Admin, 50).await.unwrap().len(), 1);
        assert_eq!(store.list_for(2, Role::Admin, 50).await.unwrap().len(), 1);
        assert!(store.list_for(3, Role::User, 50).await.unwrap().is_empty());

        assert_eq!(store.mark_all_read(1, Role::Admin).await.unwrap(), 1);
        assert_eq!(store.mark_all_read(2, Role::Admin).await.unwrap(), 0);
    }
}
