//! Repair request model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::enums::{Priority, RepairStage, RepairStatus};

/// One entry of the append-only comment thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    /// None for notes written by the system
    pub author_id: Option<i32>,
    pub author_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub system: bool,
}

/// Parts consumed by a request, one line per part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PartUsage {
    pub part_id: i32,
    /// Snapshot of the part name when first used
    pub name: String,
    pub quantity: i32,
    /// Unit price captured when the part was first used
    #[schema(value_type = String)]
    pub unit_price: Decimal,
}

/// Internal row structure (JSONB collections)
#[derive(Debug, Clone, FromRow)]
pub struct RepairRequestRow {
    id: i32,
    device_id: i32,
    requested_by_id: i32,
    assigned_to_id: Option<i32>,
    issue: String,
    detailed_description: String,
    problem_category: String,
    service_type: String,
    address: String,
    deadline: Option<NaiveDate>,
    admin_instructions: Option<String>,
    status: RepairStatus,
    repair_stage: RepairStage,
    priority: Priority,
    accepted: bool,
    is_paused: bool,
    comments: Json<Vec<Comment>>,
    parts_used: Json<Vec<PartUsage>>,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RepairRequestRow> for RepairRequest {
    fn from(row: RepairRequestRow) -> Self {
        RepairRequest {
            id: row.id,
            device_id: row.device_id,
            requested_by_id: row.requested_by_id,
            assigned_to_id: row.assigned_to_id,
            issue: row.issue,
            detailed_description: row.detailed_description,
            problem_category: row.problem_category,
            service_type: row.service_type,
            address: row.address,
            deadline: row.deadline,
            admin_instructions: row.admin_instructions,
            status: row.status,
            repair_stage: row.repair_stage,
            priority: row.priority,
            accepted: row.accepted,
            is_paused: row.is_paused,
            comments: row.comments.0,
            parts_used: row.parts_used.0,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repair request record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RepairRequest {
    pub id: i32,
    pub device_id: i32,
    pub requested_by_id: i32,
    pub assigned_to_id: Option<i32>,
    /// Short summary of the problem
    pub issue: String,
    pub detailed_description: String,
    pub problem_category: String,
    pub service_type: String,
    pub address: String,
    pub deadline: Option<NaiveDate>,
    pub admin_instructions: Option<String>,
    pub status: RepairStatus,
    pub repair_stage: RepairStage,
    pub priority: Priority,
    /// Technician has acknowledged the assignment
    pub accepted: bool,
    pub is_paused: bool,
    pub comments: Vec<Comment>,
    pub parts_used: Vec<PartUsage>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepairRequest {
    /// Requester, assignee and admins take part in the conversation
    pub fn is_participant(&self, user_id: i32) -> bool {
        self.requested_by_id == user_id || self.assigned_to_id == Some(user_id)
    }

    /// Quantity already recorded (and deducted) for a part
    pub fn used_quantity(&self, part_id: i32) -> i32 {
        self.parts_used
            .iter()
            .filter(|line| line.part_id == part_id)
            .map(|line| line.quantity)
            .sum()
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Create repair request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRepairRequest {
    pub device_id: i32,
    #[validate(custom(function = "not_blank"))]
    pub issue: String,
    pub detailed_description: Option<String>,
    pub priority: Option<Priority>,
    pub problem_category: Option<String>,
    pub service_type: Option<String>,
    /// Defaults to the requester's address
    pub address: Option<String>,
    /// Admin only: file on behalf of this user
    pub requested_by_id: Option<i32>,
    /// Admin only: assign a technician right away
    pub assigned_to_id: Option<i32>,
    /// Admin only
    pub deadline: Option<NaiveDate>,
    /// Admin only
    pub admin_instructions: Option<String>,
}

/// Insert payload handed to the store
#[derive(Debug, Clone)]
pub struct NewRepairRequest {
    pub device_id: i32,
    pub requested_by_id: i32,
    pub assigned_to_id: Option<i32>,
    pub issue: String,
    pub detailed_description: String,
    pub problem_category: String,
    pub service_type: String,
    pub address: String,
    pub deadline: Option<NaiveDate>,
    pub admin_instructions: Option<String>,
    pub priority: Priority,
}

/// Desired quantity of one part on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PartUsageInput {
    pub part_id: i32,
    pub quantity: i32,
}

/// Generic patch body of `PUT /repairs/{id}`
///
/// Which fields a caller may set depends on their role; the workflow engine
/// turns the patch into a role-specific command and rejects the rest.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RepairPatch {
    pub status: Option<RepairStatus>,
    pub repair_stage: Option<RepairStage>,
    pub priority: Option<Priority>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub assigned_to_id: Option<Option<i32>>,
    pub accepted: Option<bool>,
    pub is_paused: Option<bool>,
    pub issue: Option<String>,
    pub detailed_description: Option<String>,
    pub problem_category: Option<String>,
    pub service_type: Option<String>,
    pub address: Option<String>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub deadline: Option<Option<NaiveDate>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub admin_instructions: Option<Option<String>>,
    /// Full list of parts the request should have consumed
    pub parts_used: Option<Vec<PartUsageInput>>,
    /// Appended to the comment thread
    pub comment: Option<String>,
}

/// Add comment request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddComment {
    pub text: String,
}
