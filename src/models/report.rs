//! Dashboard and report aggregates

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{enums::RepairStatus, repair_request::RepairRequest, spare_part::SparePart};

/// Headline counters of the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, ToSchema)]
pub struct DashboardCounts {
    pub users: i64,
    pub technicians: i64,
    pub devices: i64,
    pub repairs: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub counts: DashboardCounts,
    /// Parts at or below their minimum stock
    pub low_stock: Vec<SparePart>,
    /// Five most recent requests
    pub recent_activity: Vec<RepairRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct StatusCount {
    pub status: RepairStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct TechnicianLoad {
    pub technician_id: i32,
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RepairsReport {
    pub repairs_by_status: Vec<StatusCount>,
    pub repairs_by_technician: Vec<TechnicianLoad>,
}
