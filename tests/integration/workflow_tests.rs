//! Repair workflow scenarios driven through the services against the
//! in-memory store

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use serde_json::json;

use erms_server::{
    error::{AppError, AppResult},
    models::{
        notification::{NewNotification, Notification},
        repair_request::{CreateRepairRequest, PartUsageInput, RepairPatch, RepairRequest},
        spare_part::StockMovement,
        RepairStage, RepairStatus, Role, StockStatus, UserClaims,
    },
    repository::{NotificationsStore, Repository},
    services::Services,
};

use common::{claims_for, seed_device, seed_part, seed_user, services_with};

struct Desk {
    repository: Repository,
    services: Services,
    admin: UserClaims,
    requester: UserClaims,
    technician: UserClaims,
    device_id: i32,
}

async fn desk_over(repository: Repository) -> Desk {
    let admin = seed_user(&repository, Role::Admin, "alice").await;
    let requester = seed_user(&repository, Role::User, "ursula").await;
    let technician = seed_user(&repository, Role::Technician, "tom").await;
    let device = seed_device(&repository, &requester).await;
    let services = services_with(repository.clone()).await;
    Desk {
        repository,
        services,
        admin: claims_for(&admin),
        requester: claims_for(&requester),
        technician: claims_for(&technician),
        device_id: device.id,
    }
}

async fn desk() -> Desk {
    desk_over(Repository::in_memory()).await
}

fn new_request(device_id: i32, issue: &str) -> CreateRepairRequest {
    serde_json::from_value(json!({ "device_id": device_id, "issue": issue })).unwrap()
}

async fn messages_for(desk: &Desk, claims: &UserClaims) -> Vec<String> {
    desk.services
        .notifications
        .list_for(claims)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.message)
        .collect()
}

/// Filed by the requester, assigned to the technician and accepted
async fn accepted_request(desk: &Desk) -> RepairRequest {
    let request = desk
        .services
        .repairs
        .create(&desk.requester, new_request(desk.device_id, "Screen flicker"))
        .await
        .unwrap();
    desk.services
        .repairs
        .update(
            &desk.admin,
            request.id,
            RepairPatch {
                assigned_to_id: Some(Some(desk.technician.user_id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    desk.services
        .repairs
        .accept(&desk.technician, request.id)
        .await
        .unwrap()
}

#[tokio::test]
async fn request_goes_from_filing_to_completion() {
    let desk = desk().await;
    let part = seed_part(&desk.repository, "LCD panel", 5, 2).await;

    let request = desk
        .services
        .repairs
        .create(&desk.requester, new_request(desk.device_id, "Screen flicker"))
        .await
        .unwrap();
    assert_eq!(request.status, RepairStatus::Pending);
    assert_eq!(request.requested_by_id, desk.requester.user_id);
    assert!(messages_for(&desk, &desk.admin)
        .await
        .iter()
        .any(|m| m.contains("New repair request") && m.contains("Screen flicker")));

    let assigned = desk
        .services
        .repairs
        .update(
            &desk.admin,
            request.id,
            RepairPatch {
                assigned_to_id: Some(Some(desk.technician.user_id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(assigned.assigned_to_id, Some(desk.technician.user_id));
    assert!(messages_for(&desk, &desk.technician)
        .await
        .contains(&format!("You have been assigned to repair request #{}", request.id)));

    let accepted = desk.services.repairs.accept(&desk.technician, request.id).await.unwrap();
    assert_eq!(accepted.status, RepairStatus::InProgress);
    assert!(accepted.accepted);

    let with_part = desk
        .services
        .repairs
        .update(
            &desk.technician,
            request.id,
            RepairPatch {
                parts_used: Some(vec![PartUsageInput {
                    part_id: part.id,
                    quantity: 1,
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(with_part.used_quantity(part.id), 1);
    let stocked = desk.repository.inventory.get(part.id).await.unwrap().unwrap();
    assert_eq!(stocked.quantity, 4);
    assert_eq!(stocked.status, StockStatus::InStock);

    let completed = desk
        .services
        .repairs
        .update(
            &desk.technician,
            request.id,
            RepairPatch {
                status: Some(RepairStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.status, RepairStatus::Completed);
    assert_eq!(completed.repair_stage, RepairStage::Completed);
    assert!(messages_for(&desk, &desk.requester).await.contains(&format!(
        "Your repair request #{} status updated to Completed",
        request.id
    )));
}

#[tokio::test]
async fn insufficient_stock_changes_nothing() {
    let desk = desk().await;
    let part = seed_part(&desk.repository, "Keyboard", 2, 5).await;
    let request = accepted_request(&desk).await;

    let admin_before = messages_for(&desk, &desk.admin).await.len();
    let requester_before = messages_for(&desk, &desk.requester).await.len();

    let err = desk
        .services
        .repairs
        .update(
            &desk.technician,
            request.id,
            RepairPatch {
                parts_used: Some(vec![PartUsageInput {
                    part_id: part.id,
                    quantity: 5,
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)), "got {:?}", err);

    let err = desk
        .services
        .inventory
        .consume(&desk.technician, part.id, StockMovement { quantity: 5 })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));

    let untouched = desk.repository.inventory.get(part.id).await.unwrap().unwrap();
    assert_eq!(untouched.quantity, 2);
    assert_eq!(untouched.status, StockStatus::LowStock);

    let stored = desk.services.repairs.get(&desk.admin, request.id).await.unwrap();
    assert!(stored.parts_used.is_empty());
    assert_eq!(stored.updated_at, request.updated_at);

    assert_eq!(messages_for(&desk, &desk.admin).await.len(), admin_before);
    assert_eq!(messages_for(&desk, &desk.requester).await.len(), requester_before);
}

#[tokio::test]
async fn requester_hears_of_every_status_change() {
    let desk = desk().await;
    let request = desk
        .services
        .repairs
        .create(&desk.admin, new_request(desk.device_id, "Paper jam"))
        .await
        .unwrap();

    desk.services
        .repairs
        .update(
            &desk.admin,
            request.id,
            RepairPatch {
                status: Some(RepairStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let expected = format!("Your repair request #{} status updated to Approved", request.id);
    assert!(messages_for(&desk, &desk.admin).await.contains(&expected));
}

#[tokio::test]
async fn second_cancel_is_an_invalid_transition() {
    let desk = desk().await;
    let request = desk
        .services
        .repairs
        .create(&desk.requester, new_request(desk.device_id, "Battery swollen"))
        .await
        .unwrap();
    let cancel = RepairPatch {
        status: Some(RepairStatus::Cancelled),
        ..Default::default()
    };

    let cancelled = desk
        .services
        .repairs
        .update(&desk.requester, request.id, cancel.clone())
        .await
        .unwrap();
    assert_eq!(cancelled.status, RepairStatus::Cancelled);
    assert!(messages_for(&desk, &desk.admin)
        .await
        .iter()
        .any(|m| m.contains("was cancelled by")));

    let err = desk
        .services
        .repairs
        .update(&desk.requester, request.id, cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)), "got {:?}", err);
}

#[tokio::test]
async fn requester_cannot_cancel_work_in_progress() {
    let desk = desk().await;
    let request = accepted_request(&desk).await;

    let err = desk
        .services
        .repairs
        .update(
            &desk.requester,
            request.id,
            RepairPatch {
                status: Some(RepairStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn technician_may_not_touch_admin_fields() {
    let desk = desk().await;
    let request = accepted_request(&desk).await;

    let err = desk
        .services
        .repairs
        .update(
            &desk.technician,
            request.id,
            RepairPatch {
                priority: Some(erms_server::models::Priority::Urgent),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "got {:?}", err);
}

#[tokio::test]
async fn declined_assignment_returns_to_the_pool() {
    let desk = desk().await;
    let request = desk
        .services
        .repairs
        .create(&desk.requester, new_request(desk.device_id, "No sound"))
        .await
        .unwrap();
    desk.services
        .repairs
        .update(
            &desk.admin,
            request.id,
            RepairPatch {
                assigned_to_id: Some(Some(desk.technician.user_id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let declined = desk.services.repairs.reject(&desk.technician, request.id).await.unwrap();
    assert_eq!(declined.status, RepairStatus::Pending);
    assert_eq!(declined.assigned_to_id, None);
    assert!(declined.comments.iter().any(|c| c.system && c.text.contains("declined")));
    assert!(messages_for(&desk, &desk.admin)
        .await
        .contains(&format!("{} declined repair request #{}", desk.technician.name, request.id)));
}

#[tokio::test]
async fn requests_outside_scope_are_forbidden() {
    let desk = desk().await;
    let request = desk
        .services
        .repairs
        .create(&desk.requester, new_request(desk.device_id, "Fan noise"))
        .await
        .unwrap();

    let err = desk.services.repairs.get(&desk.technician, request.id).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));
    assert!(desk.services.repairs.list(&desk.technician).await.unwrap().is_empty());
    assert_eq!(desk.services.repairs.list(&desk.requester).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleted_requests_disappear_until_restored() {
    let desk = desk().await;
    let request = desk
        .services
        .repairs
        .create(&desk.requester, new_request(desk.device_id, "Dead pixel"))
        .await
        .unwrap();

    desk.services.repairs.delete(&desk.admin, request.id).await.unwrap();
    let err = desk.services.repairs.get(&desk.admin, request.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(desk.services.repairs.list(&desk.admin).await.unwrap().is_empty());

    let restored = desk.services.repairs.restore(&desk.admin, request.id).await.unwrap();
    assert!(!restored.is_deleted);
    assert_eq!(restored.issue, "Dead pixel");
}

mock! {
    pub Outbox {}

    #[async_trait]
    impl NotificationsStore for Outbox {
        async fn create(&self, data: &NewNotification) -> AppResult<Notification>;
        async fn list_for(&self, user_id: i32, role: Role, limit: i64) -> AppResult<Vec<Notification>>;
        async fn get(&self, id: i32) -> AppResult<Option<Notification>>;
        async fn mark_read(&self, id: i32) -> AppResult<Notification>;
        async fn mark_all_read(&self, user_id: i32, role: Role) -> AppResult<u64>;
    }
}

#[tokio::test]
async fn workflow_survives_a_failing_notification_store() {
    let mut outbox = MockOutbox::new();
    outbox
        .expect_create()
        .returning(|_| Err(AppError::Internal("notification table unavailable".to_string())));

    let mut repository = Repository::in_memory();
    repository.notifications = Arc::new(outbox);
    let desk = desk_over(repository).await;

    let request = accepted_request(&desk).await;
    assert_eq!(request.status, RepairStatus::InProgress);

    let completed = desk
        .services
        .repairs
        .update(
            &desk.technician,
            request.id,
            RepairPatch {
                status: Some(RepairStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.status, RepairStatus::Completed);
}
