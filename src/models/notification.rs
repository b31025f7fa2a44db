//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{NotificationKind, RelatedKind, Role};

/// Who a notification is for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NotificationTarget {
    User(i32),
    /// Resolved to every holder of the roles at read time
    Roles(Vec<Role>),
}

impl NotificationTarget {
    pub fn role(role: Role) -> Self {
        NotificationTarget::Roles(vec![role])
    }

    pub fn includes(&self, user_id: i32, role: Role) -> bool {
        match self {
            NotificationTarget::User(id) => *id == user_id,
            NotificationTarget::Roles(roles) => roles.contains(&role),
        }
    }
}

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    id: i32,
    recipient_user_id: Option<i32>,
    recipient_roles: Vec<String>,
    kind: NotificationKind,
    message: String,
    read: bool,
    related_id: Option<i32>,
    related_kind: Option<RelatedKind>,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        let target = match row.recipient_user_id {
            Some(user_id) => NotificationTarget::User(user_id),
            None => NotificationTarget::Roles(
                row.recipient_roles
                    .iter()
                    .filter_map(|r| r.parse().ok())
                    .collect(),
            ),
        };
        Notification {
            id: row.id,
            target,
            kind: row.kind,
            message: row.message,
            read: row.read,
            related_id: row.related_id,
            related_kind: row.related_kind,
            created_at: row.created_at,
        }
    }
}

/// Stored notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub target: NotificationTarget,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub related_id: Option<i32>,
    pub related_kind: Option<RelatedKind>,
    pub created_at: DateTime<Utc>,
}

/// Outbound notification produced by a workflow event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub target: NotificationTarget,
    pub kind: NotificationKind,
    pub message: String,
    pub related: Option<(RelatedKind, i32)>,
}

impl NewNotification {
    pub fn new(target: NotificationTarget, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            target,
            kind,
            message: message.into(),
            related: None,
        }
    }

    pub fn about(mut self, kind: RelatedKind, id: i32) -> Self {
        self.related = Some((kind, id));
        self
    }
}

/// Result of a bulk mark-as-read
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
