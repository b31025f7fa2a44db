//! Repair request workflow engine
//!
//! Pure state transitions: takes the current record, the caller and a
//! command, and returns the new record together with the ledger deductions
//! and the events the caller has to turn into notifications. Nothing here
//! touches storage.

use chrono::{DateTime, Utc};

use crate::{
    config::WorkflowConfig,
    error::{AppError, AppResult},
    models::{
        repair_request::{Comment, PartUsage, PartUsageInput, RepairPatch, RepairRequest},
        spare_part::{PartConsumption, SparePart},
        RepairStage, RepairStatus, Role, UserClaims,
    },
};

/// Status values a technician may move a request to
const TECHNICIAN_STATUSES: [RepairStatus; 3] = [
    RepairStatus::InProgress,
    RepairStatus::WaitingForParts,
    RepairStatus::Completed,
];

/// What a requester may change on their own request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequesterUpdate {
    pub cancel: bool,
    pub comment: Option<String>,
}

/// What the assigned technician may change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechnicianUpdate {
    pub status: Option<RepairStatus>,
    pub repair_stage: Option<RepairStage>,
    pub is_paused: Option<bool>,
    pub parts_used: Option<Vec<PartUsageInput>>,
    pub comment: Option<String>,
}

/// Role-specific form of a `PUT /repairs/{id}` body
#[derive(Debug, Clone)]
pub enum RepairCommand {
    Requester(RequesterUpdate),
    Technician(TechnicianUpdate),
    /// Admins may set every field
    Admin(RepairPatch),
}

impl RepairCommand {
    /// Check the patch against the role whitelist
    pub fn from_patch(role: Role, patch: RepairPatch) -> AppResult<Self> {
        let allowed: &[&str] = match role {
            Role::Admin => return Ok(RepairCommand::Admin(patch)),
            Role::Technician => &["status", "repair_stage", "is_paused", "parts_used", "comment"],
            Role::User => &["status", "comment"],
        };

        let rejected: Vec<&str> = patch_fields(&patch)
            .into_iter()
            .filter(|field| !allowed.contains(field))
            .collect();
        if !rejected.is_empty() {
            return Err(AppError::Authorization(format!(
                "Role '{}' may not change: {}",
                role,
                rejected.join(", ")
            )));
        }

        match role {
            Role::User => {
                let cancel = match patch.status {
                    None => false,
                    Some(RepairStatus::Cancelled) => true,
                    Some(other) => {
                        return Err(AppError::Authorization(format!(
                            "Requesters may only cancel, not set status '{}'",
                            other
                        )))
                    }
                };
                Ok(RepairCommand::Requester(RequesterUpdate {
                    cancel,
                    comment: patch.comment,
                }))
            }
            _ => {
                if let Some(status) = patch.status {
                    if !TECHNICIAN_STATUSES.contains(&status) {
                        return Err(AppError::Authorization(format!(
                            "Technicians may not set status '{}'",
                            status
                        )));
                    }
                }
                Ok(RepairCommand::Technician(TechnicianUpdate {
                    status: patch.status,
                    repair_stage: patch.repair_stage,
                    is_paused: patch.is_paused,
                    parts_used: patch.parts_used,
                    comment: patch.comment,
                }))
            }
        }
    }

    fn comment(&self) -> Option<&str> {
        match self {
            RepairCommand::Requester(u) => u.comment.as_deref(),
            RepairCommand::Technician(u) => u.comment.as_deref(),
            RepairCommand::Admin(p) => p.comment.as_deref(),
        }
    }

    /// Whether the command does nothing besides appending a comment
    fn is_comment_only(&self) -> bool {
        match self {
            RepairCommand::Requester(u) => !u.cancel,
            RepairCommand::Technician(u) => {
                u.status.is_none()
                    && u.repair_stage.is_none()
                    && u.is_paused.is_none()
                    && u.parts_used.is_none()
            }
            RepairCommand::Admin(p) => patch_fields(p).iter().all(|f| *f == "comment"),
        }
    }
}

/// Names of the fields present in a patch
fn patch_fields(patch: &RepairPatch) -> Vec<&'static str> {
    let mut fields = Vec::new();
    macro_rules! present {
        ($($field:ident),*) => {
            $(if patch.$field.is_some() { fields.push(stringify!($field)); })*
        };
    }
    present!(
        status,
        repair_stage,
        priority,
        assigned_to_id,
        accepted,
        is_paused,
        issue,
        detailed_description,
        problem_category,
        service_type,
        address,
        deadline,
        admin_instructions,
        parts_used,
        comment
    );
    fields
}

/// Something that happened to a request and deserves a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    StatusChanged(RepairStatus),
    Assigned(i32),
    CancelledByRequester,
    Declined,
}

/// Result of applying a command
#[derive(Debug, Clone)]
pub struct Transition {
    pub request: RepairRequest,
    pub consumption: Vec<PartConsumption>,
    pub events: Vec<WorkflowEvent>,
}

impl Transition {
    fn unchanged(request: RepairRequest) -> Self {
        Self {
            request,
            consumption: Vec::new(),
            events: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowEngine {
    admin_status_override: bool,
}

impl WorkflowEngine {
    pub fn new(config: &WorkflowConfig) -> Self {
        Self {
            admin_status_override: config.admin_status_override,
        }
    }

    /// Apply a role command to `current`.
    ///
    /// `catalog` must contain every part whose used quantity grows; it
    /// supplies the name and price snapshot for new lines.
    pub fn apply(
        &self,
        current: &RepairRequest,
        actor: &UserClaims,
        command: RepairCommand,
        catalog: &[SparePart],
        now: DateTime<Utc>,
    ) -> AppResult<Transition> {
        match &command {
            RepairCommand::Requester(_) if current.requested_by_id != actor.user_id => {
                return Err(AppError::Authorization(
                    "Only the requester may update this request".to_string(),
                ))
            }
            RepairCommand::Technician(_) if current.assigned_to_id != Some(actor.user_id) => {
                return Err(AppError::Authorization(
                    "Only the assigned technician may update this request".to_string(),
                ))
            }
            _ => {}
        }

        let admin_bypass = matches!(command, RepairCommand::Admin(_)) && self.admin_status_override;
        if current.status.is_terminal() && !command.is_comment_only() && !admin_bypass {
            return Err(AppError::InvalidTransition(format!(
                "Repair request #{} is {}; only comments are accepted",
                current.id, current.status
            )));
        }

        let mut transition = Transition::unchanged(current.clone());
        if let Some(text) = command.comment() {
            append_comment(&mut transition.request, actor, text, now)?;
        }

        match command {
            RepairCommand::Requester(update) => {
                if update.cancel {
                    if current.status != RepairStatus::Pending {
                        return Err(AppError::InvalidTransition(format!(
                            "Only pending requests can be cancelled; #{} is {}",
                            current.id, current.status
                        )));
                    }
                    transition.request.status = RepairStatus::Cancelled;
                    transition.events.push(WorkflowEvent::CancelledByRequester);
                }
            }
            RepairCommand::Technician(update) => {
                if let Some(ref desired) = update.parts_used {
                    transition.consumption = apply_parts(&mut transition.request, desired, catalog)?;
                }
                if let Some(stage) = update.repair_stage {
                    transition.request.repair_stage = stage;
                }
                if let Some(paused) = update.is_paused {
                    transition.request.is_paused = paused;
                }
                if let Some(status) = update.status {
                    self.change_status(&mut transition, status, false)?;
                }
            }
            RepairCommand::Admin(patch) => {
                self.apply_admin(&mut transition, patch, catalog)?;
            }
        }

        // A completed request always sits in the Completed stage
        if transition.request.status == RepairStatus::Completed {
            transition.request.repair_stage = RepairStage::Completed;
        }

        Ok(transition)
    }

    fn apply_admin(
        &self,
        transition: &mut Transition,
        patch: RepairPatch,
        catalog: &[SparePart],
    ) -> AppResult<()> {
        if let Some(ref desired) = patch.parts_used {
            transition.consumption = apply_parts(&mut transition.request, desired, catalog)?;
        }

        let request = &mut transition.request;
        if let Some(issue) = patch.issue {
            if issue.trim().is_empty() {
                return Err(AppError::Validation("Issue must not be empty".to_string()));
            }
            request.issue = issue;
        }
        if let Some(value) = patch.detailed_description {
            request.detailed_description = value;
        }
        if let Some(value) = patch.problem_category {
            request.problem_category = value;
        }
        if let Some(value) = patch.service_type {
            request.service_type = value;
        }
        if let Some(value) = patch.address {
            request.address = value;
        }
        if let Some(value) = patch.deadline {
            request.deadline = value;
        }
        if let Some(value) = patch.admin_instructions {
            request.admin_instructions = value;
        }
        if let Some(priority) = patch.priority {
            request.priority = priority;
        }
        if let Some(stage) = patch.repair_stage {
            request.repair_stage = stage;
        }
        if let Some(paused) = patch.is_paused {
            request.is_paused = paused;
        }

        if let Some(assignee) = patch.assigned_to_id {
            if assignee != request.assigned_to_id {
                request.assigned_to_id = assignee;
                request.accepted = false;
                if let Some(technician_id) = assignee {
                    transition.events.push(WorkflowEvent::Assigned(technician_id));
                }
            }
        }
        if let Some(accepted) = patch.accepted {
            transition.request.accepted = accepted;
        }

        if let Some(status) = patch.status {
            self.change_status(transition, status, true)?;
        }
        Ok(())
    }

    fn change_status(&self, transition: &mut Transition, status: RepairStatus, admin: bool) -> AppResult<()> {
        let from = transition.request.status;
        if from == status {
            return Ok(());
        }
        if !from.can_transition_to(status) {
            if admin && self.admin_status_override {
                tracing::info!(
                    "Admin override on repair request #{}: {} -> {}",
                    transition.request.id,
                    from,
                    status
                );
            } else {
                return Err(AppError::InvalidTransition(format!(
                    "Cannot move repair request #{} from {} to {}",
                    transition.request.id, from, status
                )));
            }
        }

        transition.request.status = status;
        if status == RepairStatus::Completed {
            transition.request.repair_stage = RepairStage::Completed;
        }
        transition.events.push(WorkflowEvent::StatusChanged(status));
        Ok(())
    }

    /// Assigned technician takes the job
    pub fn accept(&self, current: &RepairRequest, actor: &UserClaims) -> AppResult<Transition> {
        ensure_assignee(current, actor)?;
        ensure_open(current)?;

        let mut transition = Transition::unchanged(current.clone());
        transition.request.accepted = true;
        transition.request.repair_stage = RepairStage::Diagnosing;
        if matches!(current.status, RepairStatus::Pending | RepairStatus::Approved) {
            transition.request.status = RepairStatus::InProgress;
            transition
                .events
                .push(WorkflowEvent::StatusChanged(RepairStatus::InProgress));
        }
        Ok(transition)
    }

    /// Assigned technician hands the job back to the admins
    pub fn reject(&self, current: &RepairRequest, actor: &UserClaims, now: DateTime<Utc>) -> AppResult<Transition> {
        ensure_assignee(current, actor)?;
        ensure_open(current)?;

        let mut transition = Transition::unchanged(current.clone());
        let request = &mut transition.request;
        request.assigned_to_id = None;
        request.accepted = false;
        request.status = RepairStatus::Pending;
        request.comments.push(Comment {
            author_id: None,
            author_name: "System".to_string(),
            text: format!("{} declined the assignment", actor.name),
            created_at: now,
            system: true,
        });
        transition.events.push(WorkflowEvent::Declined);
        Ok(transition)
    }

    /// Append a comment; allowed in any status
    pub fn comment(
        &self,
        current: &RepairRequest,
        actor: &UserClaims,
        text: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Transition> {
        if actor.role != Role::Admin && !current.is_participant(actor.user_id) {
            return Err(AppError::Authorization(
                "Only the requester, the assignee or an admin may comment".to_string(),
            ));
        }
        let mut transition = Transition::unchanged(current.clone());
        append_comment(&mut transition.request, actor, text, now)?;
        Ok(transition)
    }
}

fn ensure_assignee(request: &RepairRequest, actor: &UserClaims) -> AppResult<()> {
    if actor.role == Role::Technician && request.assigned_to_id == Some(actor.user_id) {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Only the assigned technician may do this".to_string(),
        ))
    }
}

fn ensure_open(request: &RepairRequest) -> AppResult<()> {
    if request.status.is_terminal() {
        return Err(AppError::InvalidTransition(format!(
            "Repair request #{} is already {}",
            request.id, request.status
        )));
    }
    Ok(())
}

fn append_comment(request: &mut RepairRequest, actor: &UserClaims, text: &str, now: DateTime<Utc>) -> AppResult<()> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::EmptyComment);
    }
    request.comments.push(Comment {
        author_id: Some(actor.user_id),
        author_name: actor.name.clone(),
        text: text.to_string(),
        created_at: now,
        system: false,
    });
    Ok(())
}

/// Reconcile the recorded parts with the desired list and return the
/// deductions needed. Lines may only grow.
fn apply_parts(
    request: &mut RepairRequest,
    desired: &[PartUsageInput],
    catalog: &[SparePart],
) -> AppResult<Vec<PartConsumption>> {
    for (i, line) in desired.iter().enumerate() {
        if line.quantity <= 0 {
            return Err(AppError::Validation(format!(
                "Quantity for part {} must be positive",
                line.part_id
            )));
        }
        if desired[..i].iter().any(|other| other.part_id == line.part_id) {
            return Err(AppError::Validation(format!(
                "Part {} is listed more than once",
                line.part_id
            )));
        }
    }

    for recorded in &request.parts_used {
        let kept = desired
            .iter()
            .find(|line| line.part_id == recorded.part_id)
            .map_or(0, |line| line.quantity);
        if kept < recorded.quantity {
            return Err(AppError::Validation(format!(
                "Used quantity of {} cannot be reduced; restock the part instead",
                recorded.name
            )));
        }
    }

    let mut consumption = Vec::new();
    for line in desired {
        let delta = line.quantity - request.used_quantity(line.part_id);
        if delta == 0 {
            continue;
        }
        let part = catalog
            .iter()
            .find(|p| p.id == line.part_id)
            .ok_or_else(|| AppError::Validation(format!("Unknown spare part {}", line.part_id)))?;

        match request.parts_used.iter_mut().find(|u| u.part_id == line.part_id) {
            Some(existing) => existing.quantity = line.quantity,
            None => request.parts_used.push(PartUsage {
                part_id: part.id,
                name: part.name.clone(),
                quantity: line.quantity,
                unit_price: part.price,
            }),
        }
        consumption.push(PartConsumption {
            part_id: line.part_id,
            quantity: delta,
        });
    }
    Ok(consumption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use rust_decimal::Decimal;

    const REQUESTER: i32 = 10;
    const TECH: i32 = 20;
    const OTHER_TECH: i32 = 21;
    const ADMIN: i32 = 1;

    fn engine() -> WorkflowEngine {
        WorkflowEngine::new(&WorkflowConfig::default())
    }

    fn strict_engine() -> WorkflowEngine {
        WorkflowEngine::new(&WorkflowConfig {
            admin_status_override: false,
        })
    }

    fn claims(id: i32, role: Role) -> UserClaims {
        UserClaims::new(id, "login", &format!("Person {}", id), role, 1)
    }

    fn request(status: RepairStatus) -> RepairRequest {
        let now = Utc::now();
        RepairRequest {
            id: 7,
            device_id: 3,
            requested_by_id: REQUESTER,
            assigned_to_id: Some(TECH),
            issue: "Screen flicker".into(),
            detailed_description: String::new(),
            problem_category: "Hardware".into(),
            service_type: "Repair".into(),
            address: String::new(),
            deadline: None,
            admin_instructions: None,
            status,
            repair_stage: RepairStage::Diagnosing,
            priority: Priority::Medium,
            accepted: false,
            is_paused: false,
            comments: vec![],
            parts_used: vec![],
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn part(id: i32, quantity: i32) -> SparePart {
        let now = Utc::now();
        SparePart::new(id, format!("Part {}", id), "General".into(), quantity, 5, Decimal::new(2500, 2), now, now)
    }

    fn patch(json: &str) -> RepairPatch {
        serde_json::from_str(json).unwrap()
    }

    fn run(current: &RepairRequest, actor: &UserClaims, json: &str, catalog: &[SparePart]) -> AppResult<Transition> {
        let command = RepairCommand::from_patch(actor.role, patch(json))?;
        engine().apply(current, actor, command, catalog, Utc::now())
    }

    #[test]
    fn requester_cancels_pending_once() {
        let user = claims(REQUESTER, Role::User);
        let t = run(&request(RepairStatus::Pending), &user, r#"{"status":"Cancelled"}"#, &[]).unwrap();
        assert_eq!(t.request.status, RepairStatus::Cancelled);
        assert_eq!(t.events, vec![WorkflowEvent::CancelledByRequester]);

        let again = run(&t.request, &user, r#"{"status":"Cancelled"}"#, &[]);
        assert!(matches!(again, Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn requester_cannot_cancel_work_in_progress() {
        let user = claims(REQUESTER, Role::User);
        for status in [RepairStatus::InProgress, RepairStatus::Completed, RepairStatus::Approved] {
            let result = run(&request(status), &user, r#"{"status":"Cancelled"}"#, &[]);
            assert!(matches!(result, Err(AppError::InvalidTransition(_))), "{status}");
        }
    }

    #[test]
    fn requester_field_whitelist_is_enforced() {
        let user = claims(REQUESTER, Role::User);
        let result = run(&request(RepairStatus::Pending), &user, r#"{"priority":"Urgent"}"#, &[]);
        match result {
            Err(AppError::Authorization(msg)) => assert!(msg.contains("priority")),
            other => panic!("unexpected {other:?}"),
        }

        let result = run(&request(RepairStatus::Pending), &user, r#"{"status":"Completed"}"#, &[]);
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[test]
    fn only_the_requester_may_use_requester_commands() {
        let stranger = claims(99, Role::User);
        let result = run(&request(RepairStatus::Pending), &stranger, r#"{"comment":"hi"}"#, &[]);
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[test]
    fn unassigned_technician_is_forbidden() {
        let other = claims(OTHER_TECH, Role::Technician);
        let result = run(&request(RepairStatus::InProgress), &other, r#"{"repair_stage":"Testing"}"#, &[]);
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[test]
    fn technician_cannot_reassign_or_reprioritise() {
        let tech = claims(TECH, Role::Technician);
        let result = run(
            &request(RepairStatus::InProgress),
            &tech,
            r#"{"assigned_to_id":21,"priority":"High"}"#,
            &[],
        );
        match result {
            Err(AppError::Authorization(msg)) => {
                assert!(msg.contains("assigned_to_id"));
                assert!(msg.contains("priority"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn technician_progress_update_consumes_parts() {
        let tech = claims(TECH, Role::Technician);
        let catalog = [part(100, 5)];
        let t = run(
            &request(RepairStatus::InProgress),
            &tech,
            r#"{"repair_stage":"Repair in progress","parts_used":[{"part_id":100,"quantity":1}],"comment":"Replaced panel"}"#,
            &catalog,
        )
        .unwrap();

        assert_eq!(t.request.repair_stage, RepairStage::RepairInProgress);
        assert_eq!(t.consumption, vec![PartConsumption { part_id: 100, quantity: 1 }]);
        assert_eq!(t.request.parts_used.len(), 1);
        assert_eq!(t.request.parts_used[0].name, "Part 100");
        assert_eq!(t.request.parts_used[0].unit_price, Decimal::new(2500, 2));
        assert_eq!(t.request.comments.len(), 1);
        assert!(t.events.is_empty());
    }

    #[test]
    fn growing_a_line_consumes_only_the_delta() {
        let tech = claims(TECH, Role::Technician);
        let mut current = request(RepairStatus::InProgress);
        current.parts_used.push(PartUsage {
            part_id: 100,
            name: "Old name".into(),
            quantity: 2,
            unit_price: Decimal::new(1000, 2),
        });

        let t = run(&current, &tech, r#"{"parts_used":[{"part_id":100,"quantity":5}]}"#, &[part(100, 9)]).unwrap();
        assert_eq!(t.consumption, vec![PartConsumption { part_id: 100, quantity: 3 }]);
        // Snapshot taken at first use is kept
        assert_eq!(t.request.parts_used[0].name, "Old name");
        assert_eq!(t.request.parts_used[0].unit_price, Decimal::new(1000, 2));
        assert_eq!(t.request.parts_used[0].quantity, 5);
    }

    #[test]
    fn shrinking_or_unknown_parts_are_rejected() {
        let tech = claims(TECH, Role::Technician);
        let mut current = request(RepairStatus::InProgress);
        current.parts_used.push(PartUsage {
            part_id: 100,
            name: "Fan".into(),
            quantity: 2,
            unit_price: Decimal::ZERO,
        });

        let shrink = run(&current, &tech, r#"{"parts_used":[{"part_id":100,"quantity":1}]}"#, &[part(100, 5)]);
        assert!(matches!(shrink, Err(AppError::Validation(_))));

        let dropped = run(&current, &tech, r#"{"parts_used":[]}"#, &[]);
        assert!(matches!(dropped, Err(AppError::Validation(_))));

        let unknown = run(
            &current,
            &tech,
            r#"{"parts_used":[{"part_id":100,"quantity":2},{"part_id":555,"quantity":1}]}"#,
            &[part(100, 5)],
        );
        assert!(matches!(unknown, Err(AppError::Validation(_))));
    }

    #[test]
    fn completing_forces_the_completed_stage() {
        let tech = claims(TECH, Role::Technician);
        let t = run(&request(RepairStatus::InProgress), &tech, r#"{"status":"Completed"}"#, &[]).unwrap();
        assert_eq!(t.request.status, RepairStatus::Completed);
        assert_eq!(t.request.repair_stage, RepairStage::Completed);
        assert_eq!(t.events, vec![WorkflowEvent::StatusChanged(RepairStatus::Completed)]);
    }

    #[test]
    fn completed_requests_keep_the_completed_stage() {
        let admin = claims(ADMIN, Role::Admin);
        let mut done = request(RepairStatus::Completed);
        done.repair_stage = RepairStage::Completed;

        let t = run(&done, &admin, r#"{"repair_stage":"Diagnosing","priority":"High"}"#, &[]).unwrap();
        assert_eq!(t.request.status, RepairStatus::Completed);
        assert_eq!(t.request.repair_stage, RepairStage::Completed);
        assert_eq!(t.request.priority, Priority::High);
    }

    #[test]
    fn technician_follows_the_transition_table() {
        let tech = claims(TECH, Role::Technician);
        let result = run(&request(RepairStatus::Pending), &tech, r#"{"status":"Completed"}"#, &[]);
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));

        let result = run(&request(RepairStatus::Pending), &tech, r#"{"status":"Rejected"}"#, &[]);
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[test]
    fn same_status_is_a_no_op() {
        let tech = claims(TECH, Role::Technician);
        let t = run(&request(RepairStatus::InProgress), &tech, r#"{"status":"In Progress"}"#, &[]).unwrap();
        assert!(t.events.is_empty());
    }

    #[test]
    fn terminal_requests_only_take_comments() {
        let tech = claims(TECH, Role::Technician);
        let done = request(RepairStatus::Completed);
        let result = run(&done, &tech, r#"{"is_paused":true}"#, &[]);
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));

        let t = run(&done, &tech, r#"{"comment":"Picked up by owner"}"#, &[]).unwrap();
        assert_eq!(t.request.comments.len(), 1);
    }

    #[test]
    fn admin_reassignment_resets_acceptance_and_notifies() {
        let admin = claims(ADMIN, Role::Admin);
        let mut current = request(RepairStatus::InProgress);
        current.accepted = true;

        let t = run(&current, &admin, r#"{"assigned_to_id":21}"#, &[]).unwrap();
        assert_eq!(t.request.assigned_to_id, Some(OTHER_TECH));
        assert!(!t.request.accepted);
        assert_eq!(t.events, vec![WorkflowEvent::Assigned(OTHER_TECH)]);

        let t = run(&current, &admin, r#"{"assigned_to_id":null}"#, &[]).unwrap();
        assert_eq!(t.request.assigned_to_id, None);
        assert!(t.events.is_empty());
    }

    #[test]
    fn admin_override_is_configurable() {
        let admin = claims(ADMIN, Role::Admin);
        let done = request(RepairStatus::Completed);

        let command = RepairCommand::from_patch(Role::Admin, patch(r#"{"status":"In Progress"}"#)).unwrap();
        let t = engine().apply(&done, &admin, command.clone(), &[], Utc::now()).unwrap();
        assert_eq!(t.request.status, RepairStatus::InProgress);

        let strict = strict_engine().apply(&done, &admin, command, &[], Utc::now());
        assert!(matches!(strict, Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn accept_moves_pending_into_progress() {
        let tech = claims(TECH, Role::Technician);
        let t = engine().accept(&request(RepairStatus::Pending), &tech).unwrap();
        assert!(t.request.accepted);
        assert_eq!(t.request.status, RepairStatus::InProgress);
        assert_eq!(t.request.repair_stage, RepairStage::Diagnosing);

        let other = claims(OTHER_TECH, Role::Technician);
        assert!(matches!(
            engine().accept(&request(RepairStatus::Pending), &other),
            Err(AppError::Authorization(_))
        ));
        assert!(matches!(
            engine().accept(&request(RepairStatus::Cancelled), &tech),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn reject_returns_the_job_to_the_pool() {
        let tech = claims(TECH, Role::Technician);
        let mut current = request(RepairStatus::InProgress);
        current.accepted = true;

        let t = engine().reject(&current, &tech, Utc::now()).unwrap();
        assert_eq!(t.request.assigned_to_id, None);
        assert_eq!(t.request.status, RepairStatus::Pending);
        assert!(!t.request.accepted);
        assert!(!t.request.is_deleted);
        let note = t.request.comments.last().unwrap();
        assert!(note.system);
        assert_eq!(note.text, "Person 20 declined the assignment");
        assert_eq!(t.events, vec![WorkflowEvent::Declined]);
    }

    #[test]
    fn comments_need_text_and_participation() {
        let current = request(RepairStatus::Rejected);
        let requester = claims(REQUESTER, Role::User);
        assert!(matches!(
            engine().comment(&current, &requester, "   ", Utc::now()),
            Err(AppError::EmptyComment)
        ));
        assert!(matches!(
            engine().comment(&current, &claims(99, Role::User), "hello", Utc::now()),
            Err(AppError::Authorization(_))
        ));

        let t = engine().comment(&current, &requester, "  Thanks  ", Utc::now()).unwrap();
        assert_eq!(t.request.comments[0].text, "Thanks");
        assert_eq!(t.request.comments[0].author_id, Some(REQUESTER));
    }
}
