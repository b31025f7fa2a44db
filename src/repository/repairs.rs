//! Repair requests repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Pool, Postgres};

use super::{inventory::consume_on, RepairsStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        repair_request::{NewRepairRequest, RepairRequest, RepairRequestRow},
        spare_part::{PartConsumption, SparePart},
    },
    services::access::RequestScope,
};

#[derive(Clone)]
pub struct RepairsRepository {
    pool: Pool<Postgres>,
}

impl RepairsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepairsStore for RepairsRepository {
    async fn list(&self, scope: &RequestScope) -> AppResult<Vec<RepairRequest>> {
        let (filter, owner) = match *scope {
            RequestScope::All => ("", None),
            RequestScope::AssignedTo(id) => ("AND assigned_to_id = $1", Some(id)),
            RequestScope::RequestedBy(id) => ("AND requested_by_id = $1", Some(id)),
        };

        let query = format!(
            "SELECT * FROM repair_requests WHERE is_deleted = FALSE {} ORDER BY created_at DESC, id DESC",
            filter
        );
        let mut builder = sqlx::query_as::<_, RepairRequestRow>(&query);
        if let Some(id) = owner {
            builder = builder.bind(id);
        }
        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: i32) -> AppResult<Option<RepairRequest>> {
        let row = sqlx::query_as::<_, RepairRequestRow>("SELECT * FROM repair_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn create(&self, data: &NewRepairRequest) -> AppResult<RepairRequest> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, RepairRequestRow>(
            r#"
            INSERT INTO repair_requests (
                device_id, requested_by_id, assigned_to_id, issue, detailed_description,
                problem_category, service_type, address, deadline, admin_instructions,
                priority, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *
            "#,
        )
        .bind(data.device_id)
        .bind(data.requested_by_id)
        .bind(data.assigned_to_id)
        .bind(&data.issue)
        .bind(&data.detailed_description)
        .bind(&data.problem_category)
        .bind(&data.service_type)
        .bind(&data.address)
        .bind(data.deadline)
        .bind(&data.admin_instructions)
        .bind(data.priority)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn save(
        &self,
        request: &RepairRequest,
        consumption: &[PartConsumption],
    ) -> AppResult<(RepairRequest, Vec<SparePart>)> {
        let mut tx = self.pool.begin().await?;

        let mut parts = Vec::with_capacity(consumption.len());
        for line in consumption {
            parts.push(consume_on(&mut tx, line.part_id, line.quantity).await?);
        }

        let row = sqlx::query_as::<_, RepairRequestRow>(
            r#"
            UPDATE repair_requests SET
                assigned_to_id = $3, issue = $4, detailed_description = $5,
                problem_category = $6, service_type = $7, address = $8, deadline = $9,
                admin_instructions = $10, status = $11, repair_stage = $12, priority = $13,
                accepted = $14, is_paused = $15, comments = $16, parts_used = $17,
                is_deleted = $18, updated_at = $19
            WHERE id = $1 AND updated_at = $2
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.updated_at)
        .bind(request.assigned_to_id)
        .bind(&request.issue)
        .bind(&request.detailed_description)
        .bind(&request.problem_category)
        .bind(&request.service_type)
        .bind(&request.address)
        .bind(request.deadline)
        .bind(&request.admin_instructions)
        .bind(request.status)
        .bind(request.repair_stage)
        .bind(request.priority)
        .bind(request.accepted)
        .bind(request.is_paused)
        .bind(Json(&request.comments))
        .bind(Json(&request.parts_used))
        .bind(request.is_deleted)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        // Dropping the transaction rolls back the stock deductions
        let row = row.ok_or_else(|| {
            AppError::Conflict(format!(
                "Repair request {} was modified concurrently, reload and retry",
                request.id
            ))
        })?;

        tx.commit().await?;
        Ok((row.into(), parts))
    }
}
