//! Repair request service: loads, authorizes, runs the workflow engine,
//! persists atomically and dispatches the resulting notifications

use chrono::Utc;
use validator::Validate;

use crate::{
    config::WorkflowConfig,
    error::{AppError, AppResult},
    models::{
        repair_request::{CreateRepairRequest, NewRepairRequest, RepairPatch, RepairRequest},
        NewNotification, NotificationKind, NotificationTarget, Priority, RelatedKind, RepairStatus,
        Role, UserClaims,
    },
    repository::Repository,
};

use super::{
    access::RequestScope,
    inventory::low_stock_alert,
    notifications::NotificationDispatcher,
    workflow::{RepairCommand, Transition, WorkflowEngine, WorkflowEvent},
};

#[derive(Clone)]
pub struct RepairsService {
    repository: Repository,
    engine: WorkflowEngine,
    dispatcher: NotificationDispatcher,
}

impl RepairsService {
    pub fn new(repository: Repository, config: &WorkflowConfig, dispatcher: NotificationDispatcher) -> Self {
        Self {
            repository,
            engine: WorkflowEngine::new(config),
            dispatcher,
        }
    }

    /// Requests visible to the caller, newest first
    pub async fn list(&self, claims: &UserClaims) -> AppResult<Vec<RepairRequest>> {
        self.repository
            .repairs
            .list(&RequestScope::for_caller(claims))
            .await
    }

    pub async fn get(&self, claims: &UserClaims, id: i32) -> AppResult<RepairRequest> {
        let request = self.load_live(id).await?;
        RequestScope::for_caller(claims).ensure_visible(&request)?;
        Ok(request)
    }

    pub async fn create(&self, claims: &UserClaims, data: CreateRepairRequest) -> AppResult<RepairRequest> {
        claims.require_any(&[Role::User, Role::Admin])?;
        data.validate()
            .map_err(|_| AppError::Validation("Issue must not be empty".to_string()))?;

        if !claims.is_admin() {
            let mut admin_only = Vec::new();
            if data.requested_by_id.is_some() {
                admin_only.push("requested_by_id");
            }
            if data.assigned_to_id.is_some() {
                admin_only.push("assigned_to_id");
            }
            if data.deadline.is_some() {
                admin_only.push("deadline");
            }
            if data.admin_instructions.is_some() {
                admin_only.push("admin_instructions");
            }
            if !admin_only.is_empty() {
                return Err(AppError::Authorization(format!(
                    "Only admins may set: {}",
                    admin_only.join(", ")
                )));
            }
        }

        let requester_id = data.requested_by_id.unwrap_or(claims.user_id);
        let requester = self
            .repository
            .users
            .get(requester_id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", requester_id)))?;

        let device = self
            .repository
            .devices
            .get(data.device_id)
            .await?
            .filter(|d| !d.is_deleted)
            .ok_or_else(|| AppError::NotFound(format!("Device {} not found", data.device_id)))?;
        if !device.accepts_requests() {
            return Err(AppError::DeviceUnavailable(format!(
                "Device {} is {} and cannot be sent for repair",
                device.id, device.status
            )));
        }

        if let Some(technician_id) = data.assigned_to_id {
            self.ensure_assignable(technician_id).await?;
        }

        let new_request = NewRepairRequest {
            device_id: device.id,
            requested_by_id: requester.id,
            assigned_to_id: data.assigned_to_id,
            issue: data.issue.trim().to_string(),
            detailed_description: data.detailed_description.unwrap_or_default(),
            problem_category: data.problem_category.unwrap_or_else(|| "Hardware".to_string()),
            service_type: data.service_type.unwrap_or_else(|| "Repair".to_string()),
            address: data
                .address
                .or_else(|| requester.address.clone())
                .unwrap_or_default(),
            deadline: data.deadline,
            admin_instructions: data.admin_instructions,
            priority: data.priority.unwrap_or(Priority::Medium),
        };

        let request = self.repository.repairs.create(&new_request).await?;
        tracing::info!(
            "Repair request #{} created for device {} by user {}",
            request.id,
            request.device_id,
            requester.id
        );

        let mut outbound = vec![NewNotification::new(
            NotificationTarget::role(Role::Admin),
            NotificationKind::Info,
            format!("New repair request from {}: {}", requester.name, request.issue),
        )
        .about(RelatedKind::RepairRequest, request.id)];
        if let Some(technician_id) = request.assigned_to_id {
            outbound.push(assignment_notice(&request, technician_id));
        }
        self.dispatcher.notify_all(outbound).await;

        Ok(request)
    }

    /// Apply a role-dependent patch
    pub async fn update(&self, claims: &UserClaims, id: i32, patch: RepairPatch) -> AppResult<RepairRequest> {
        let current = self.load_live(id).await?;

        if claims.role == Role::Admin {
            if let Some(Some(technician_id)) = patch.assigned_to_id {
                if current.assigned_to_id != Some(technician_id) {
                    self.ensure_assignable(technician_id).await?;
                }
            }
        }

        let catalog = match patch.parts_used {
            Some(ref desired) => {
                let growing: Vec<i32> = desired
                    .iter()
                    .filter(|line| line.quantity > current.used_quantity(line.part_id))
                    .map(|line| line.part_id)
                    .collect();
                self.repository.inventory.get_many(&growing).await?
            }
            None => Vec::new(),
        };

        let transition = RepairCommand::from_patch(claims.role, patch)
            .and_then(|command| self.engine.apply(&current, claims, command, &catalog, Utc::now()))
            .map_err(|e| {
                tracing::debug!("Update of repair request #{} by user {} refused: {}", id, claims.user_id, e);
                e
            })?;

        self.commit(claims, transition).await
    }

    pub async fn accept(&self, claims: &UserClaims, id: i32) -> AppResult<RepairRequest> {
        let current = self.load_live(id).await?;
        let transition = self.engine.accept(&current, claims)?;
        tracing::info!("Technician {} accepted repair request #{}", claims.user_id, id);
        self.commit(claims, transition).await
    }

    pub async fn reject(&self, claims: &UserClaims, id: i32) -> AppResult<RepairRequest> {
        let current = self.load_live(id).await?;
        let transition = self.engine.reject(&current, claims, Utc::now())?;
        tracing::info!("Technician {} declined repair request #{}", claims.user_id, id);
        self.commit(claims, transition).await
    }

    pub async fn add_comment(&self, claims: &UserClaims, id: i32, text: &str) -> AppResult<RepairRequest> {
        let current = self.load_live(id).await?;
        let transition = self.engine.comment(&current, claims, text, Utc::now())?;
        self.commit(claims, transition).await
    }

    /// Soft delete (admin)
    pub async fn delete(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_admin()?;
        let mut request = self.load_live(id).await?;
        request.is_deleted = true;
        self.repository.repairs.save(&request, &[]).await?;
        tracing::info!("Repair request #{} deleted", id);
        Ok(())
    }

    /// Undo a soft delete (admin); the only path that loads deleted requests
    pub async fn restore(&self, claims: &UserClaims, id: i32) -> AppResult<RepairRequest> {
        claims.require_admin()?;
        let mut request = self
            .repository
            .repairs
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Repair request {} not found", id)))?;
        if !request.is_deleted {
            return Ok(request);
        }
        request.is_deleted = false;
        let (restored, _) = self.repository.repairs.save(&request, &[]).await?;
        tracing::info!("Repair request #{} restored", id);
        Ok(restored)
    }

    async fn load_live(&self, id: i32) -> AppResult<RepairRequest> {
        self.repository
            .repairs
            .get(id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| AppError::NotFound(format!("Repair request {} not found", id)))
    }

    async fn ensure_assignable(&self, technician_id: i32) -> AppResult<()> {
        let assignable = self
            .repository
            .users
            .get(technician_id)
            .await?
            .map_or(false, |u| u.is_assignable_technician());
        if !assignable {
            return Err(AppError::Validation(format!(
                "User {} is not an active technician",
                technician_id
            )));
        }
        Ok(())
    }

    /// Persist the transition, then notify. Notifications are only sent
    /// for writes that actually happened.
    async fn commit(&self, actor: &UserClaims, transition: Transition) -> AppResult<RepairRequest> {
        let (saved, parts) = self
            .repository
            .repairs
            .save(&transition.request, &transition.consumption)
            .await?;

        for line in &transition.consumption {
            tracing::info!(
                "Repair request #{} consumed {} of part {}",
                saved.id,
                line.quantity,
                line.part_id
            );
        }

        let mut outbound: Vec<NewNotification> = transition
            .events
            .iter()
            .filter_map(|event| event_notice(&saved, actor, event))
            .collect();
        outbound.extend(parts.iter().filter_map(low_stock_alert));
        self.dispatcher.notify_all(outbound).await;

        Ok(saved)
    }
}

fn assignment_notice(request: &RepairRequest, technician_id: i32) -> NewNotification {
    NewNotification::new(
        NotificationTarget::User(technician_id),
        NotificationKind::Info,
        format!("You have been assigned to repair request #{}", request.id),
    )
    .about(RelatedKind::RepairRequest, request.id)
}

fn event_notice(request: &RepairRequest, actor: &UserClaims, event: &WorkflowEvent) -> Option<NewNotification> {
    let notice = match *event {
        WorkflowEvent::StatusChanged(status) => {
            let kind = match status {
                RepairStatus::Completed => NotificationKind::Success,
                RepairStatus::Rejected | RepairStatus::Cancelled => NotificationKind::Warning,
                _ => NotificationKind::Info,
            };
            NewNotification::new(
                NotificationTarget::User(request.requested_by_id),
                kind,
                format!("Your repair request #{} status updated to {}", request.id, status),
            )
        }
        WorkflowEvent::Assigned(technician_id) => assignment_notice(request, technician_id),
        WorkflowEvent::CancelledByRequester => NewNotification::new(
            NotificationTarget::role(Role::Admin),
            NotificationKind::Warning,
            format!("Repair request #{} was cancelled by {}", request.id, actor.name),
        ),
        WorkflowEvent::Declined => NewNotification::new(
            NotificationTarget::role(Role::Admin),
            NotificationKind::Warning,
            format!("{} declined repair request #{}", actor.name, request.id),
        ),
    };
    Some(notice.about(RelatedKind::RepairRequest, request.id))
}
