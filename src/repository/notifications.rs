//! Notifications repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::NotificationsStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        notification::{NewNotification, Notification, NotificationRow, NotificationTarget},
        Role,
    },
};

/// Visibility predicate shared by the read queries; $1 user id, $2 role
const VISIBLE_TO: &str = "(recipient_user_id = $1 OR $2 = ANY(recipient_roles))";

#[derive(Clone)]
pub struct NotificationsRepository {
    pool: Pool<Postgres>,
}

impl NotificationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationsStore for NotificationsRepository {
    async fn create(&self, data: &NewNotification) -> AppResult<Notification> {
        let (user_id, roles): (Option<i32>, Vec<String>) = match &data.target {
            NotificationTarget::User(id) => (Some(*id), Vec::new()),
            NotificationTarget::Roles(roles) => {
                (None, roles.iter().map(|r| r.as_str().to_string()).collect())
            }
        };
        let (related_kind, related_id) = match data.related {
            Some((kind, id)) => (Some(kind), Some(id)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (
                recipient_user_id, recipient_roles, kind, message, related_id, related_kind, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&roles)
        .bind(data.kind)
        .bind(&data.message)
        .bind(related_id)
        .bind(related_kind)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list_for(&self, user_id: i32, role: Role, limit: i64) -> AppResult<Vec<Notification>> {
        let query = format!(
            "SELECT * FROM notifications WHERE {} ORDER BY created_at DESC, id DESC LIMIT $3",
            VISIBLE_TO
        );
        let rows = sqlx::query_as::<_, NotificationRow>(&query)
            .bind(user_id)
            .bind(role.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: i32) -> AppResult<Option<Notification>> {
        let row = sqlx::query_as::<_, NotificationRow>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn mark_read(&self, id: i32) -> AppResult<Notification> {
        sqlx::query_as::<_, NotificationRow>(
            "UPDATE notifications SET read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Into::into)
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))
    }

    async fn mark_all_read(&self, user_id: i32, role: Role) -> AppResult<u64> {
        let query = format!(
            "UPDATE notifications SET read = TRUE WHERE read = FALSE AND {}",
            VISIBLE_TO
        );
        let result = sqlx::query(&query)
            .bind(user_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
