//! Aggregate queries for the dashboard and reports

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::ReportsStore;
use crate::{
    error::AppResult,
    models::{
        repair_request::{RepairRequest, RepairRequestRow},
        report::{DashboardCounts, StatusCount, TechnicianLoad},
        spare_part::{SparePart, SparePartRow},
    },
};

#[derive(Clone)]
pub struct ReportsRepository {
    pool: Pool<Postgres>,
}

impl ReportsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportsStore for ReportsRepository {
    async fn dashboard_counts(&self) -> AppResult<DashboardCounts> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE is_deleted = FALSE) AS users,
                (SELECT COUNT(*) FROM users WHERE is_deleted = FALSE AND role = 'technician') AS technicians,
                (SELECT COUNT(*) FROM devices WHERE is_deleted = FALSE) AS devices,
                (SELECT COUNT(*) FROM repair_requests WHERE is_deleted = FALSE) AS repairs,
                (SELECT COUNT(*) FROM repair_requests WHERE is_deleted = FALSE AND status = 'Pending') AS pending,
                (SELECT COUNT(*) FROM repair_requests WHERE is_deleted = FALSE AND status = 'In Progress') AS in_progress,
                (SELECT COUNT(*) FROM repair_requests WHERE is_deleted = FALSE AND status = 'Completed') AS completed
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn low_stock_parts(&self) -> AppResult<Vec<SparePart>> {
        let rows = sqlx::query_as::<_, SparePartRow>(
            "SELECT * FROM spare_parts WHERE quantity <= min_stock ORDER BY quantity, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn recent_requests(&self, limit: i64) -> AppResult<Vec<RepairRequest>> {
        let rows = sqlx::query_as::<_, RepairRequestRow>(
            r#"
            SELECT * FROM repair_requests WHERE is_deleted = FALSE
            ORDER BY created_at DESC, id DESC LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn repairs_by_status(&self) -> AppResult<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status, COUNT(*) AS count FROM repair_requests
            WHERE is_deleted = FALSE
            GROUP BY status ORDER BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn repairs_by_technician(&self) -> AppResult<Vec<TechnicianLoad>> {
        let rows = sqlx::query_as::<_, TechnicianLoad>(
            r#"
            SELECT u.id AS technician_id, u.name, COUNT(r.id) AS count
            FROM users u
            JOIN repair_requests r ON r.assigned_to_id = u.id AND r.is_deleted = FALSE
            WHERE u.role = 'technician'
            GROUP BY u.id, u.name
            ORDER BY count DESC, u.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
