//! Spare parts repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use super::InventoryStore;
use crate::{
    error::{AppError, AppResult},
    models::spare_part::{CreatePart, SparePart, SparePartRow},
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: Pool<Postgres>,
}

impl InventoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Decrement stock with a floor check; runs on a plain connection or inside
/// a caller's transaction.
pub(crate) async fn consume_on(conn: &mut PgConnection, id: i32, quantity: i32) -> AppResult<SparePart> {
    let row = sqlx::query_as::<_, SparePartRow>(
        r#"
        UPDATE spare_parts
        SET quantity = quantity - $2, updated_at = $3
        WHERE id = $1 AND quantity >= $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = row {
        return Ok(row.into());
    }

    // Nothing updated: either the part is gone or stock is short
    let available: Option<(String, i32)> =
        sqlx::query_as("SELECT name, quantity FROM spare_parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    match available {
        Some((name, on_hand)) => Err(AppError::InsufficientStock(format!(
            "{} has {} in stock, {} requested",
            name, on_hand, quantity
        ))),
        None => Err(AppError::NotFound(format!("Spare part {} not found", id))),
    }
}

pub(crate) fn restock_overflow(id: i32, on_hand: i32, quantity: i32) -> AppError {
    AppError::Validation(format!(
        "Restocking part {} by {} would exceed the maximum quantity (has {})",
        id, quantity, on_hand
    ))
}

#[async_trait]
impl InventoryStore for InventoryRepository {
    async fn list(&self) -> AppResult<Vec<SparePart>> {
        let rows = sqlx::query_as::<_, SparePartRow>("SELECT * FROM spare_parts ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: i32) -> AppResult<Option<SparePart>> {
        let row = sqlx::query_as::<_, SparePartRow>("SELECT * FROM spare_parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn get_many(&self, ids: &[i32]) -> AppResult<Vec<SparePart>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, SparePartRow>("SELECT * FROM spare_parts WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, data: &CreatePart) -> AppResult<SparePart> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, SparePartRow>(
            r#"
            INSERT INTO spare_parts (name, category, quantity, min_stock, price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(&data.category)
        .bind(data.quantity)
        .bind(data.min_stock)
        .bind(data.price)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn save(&self, part: &SparePart) -> AppResult<SparePart> {
        sqlx::query_as::<_, SparePartRow>(
            r#"
            UPDATE spare_parts SET
                name = $2, category = $3, quantity = $4, min_stock = $5, price = $6, updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(part.id)
        .bind(&part.name)
        .bind(&part.category)
        .bind(part.quantity)
        .bind(part.min_stock)
        .bind(part.price)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .map(Into::into)
        .ok_or_else(|| AppError::NotFound(format!("Spare part {} not found", part.id)))
    }

    async fn consume(&self, id: i32, quantity: i32) -> AppResult<SparePart> {
        let mut conn = self.pool.acquire().await?;
        consume_on(&mut conn, id, quantity).await
    }

    async fn restock(&self, id: i32, quantity: i32) -> AppResult<SparePart> {
        let row = sqlx::query_as::<_, SparePartRow>(
            r#"
            UPDATE spare_parts SET quantity = quantity + $2, updated_at = $3
            WHERE id = $1 AND quantity <= $4 - $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .bind(i32::MAX)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        let on_hand: Option<(i32,)> = sqlx::query_as("SELECT quantity FROM spare_parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match on_hand {
            Some((on_hand,)) => Err(restock_overflow(id, on_hand, quantity)),
            None => Err(AppError::NotFound(format!("Spare part {} not found", id))),
        }
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM spare_parts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Spare part {} not found", id)));
        }
        Ok(())
    }
}
