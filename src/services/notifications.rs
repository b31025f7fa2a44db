//! Notification dispatcher and inbox queries

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    config::{DispatchMode, NotificationsConfig},
    error::{AppError, AppResult},
    models::{
        notification::{MarkAllReadResponse, NewNotification, Notification},
        UserClaims,
    },
    repository::{NotificationsStore, Repository, SettingsStore},
};

#[derive(Clone)]
enum Outbox {
    Inline,
    Queued(mpsc::Sender<NewNotification>),
}

/// Persists workflow notifications without ever failing the caller.
///
/// In queued mode a background task drains a bounded channel; a full or
/// closed queue drops the notification with a warning.
#[derive(Clone)]
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationsStore>,
    settings: Arc<dyn SettingsStore>,
    outbox: Outbox,
}

impl NotificationDispatcher {
    /// Must be called inside a tokio runtime when `config.dispatch` is queued
    pub fn new(repository: &Repository, config: &NotificationsConfig) -> Self {
        let store = repository.notifications.clone();
        let settings = repository.settings.clone();

        let outbox = match config.dispatch {
            DispatchMode::Inline => Outbox::Inline,
            DispatchMode::Queued => {
                let (tx, mut rx) = mpsc::channel::<NewNotification>(config.queue_capacity.max(1));
                let store = store.clone();
                let settings = settings.clone();
                tokio::spawn(async move {
                    while let Some(notification) = rx.recv().await {
                        persist(store.as_ref(), settings.as_ref(), notification).await;
                    }
                    tracing::debug!("Notification queue closed");
                });
                Outbox::Queued(tx)
            }
        };

        Self {
            store,
            settings,
            outbox,
        }
    }

    pub async fn notify(&self, notification: NewNotification) {
        match &self.outbox {
            Outbox::Inline => {
                persist(self.store.as_ref(), self.settings.as_ref(), notification).await
            }
            Outbox::Queued(tx) => {
                if let Err(e) = tx.try_send(notification) {
                    tracing::warn!("Dropping notification, queue unavailable: {}", e);
                }
            }
        }
    }

    pub async fn notify_all(&self, notifications: Vec<NewNotification>) {
        for notification in notifications {
            self.notify(notification).await;
        }
    }
}

async fn persist(store: &dyn NotificationsStore, settings: &dyn SettingsStore, notification: NewNotification) {
    match settings.get().await {
        Ok(s) if !s.notifications_enabled => {
            tracing::debug!("Notifications disabled, dropping: {}", notification.message);
            return;
        }
        Ok(_) => {}
        Err(e) => {
            // Deliver anyway; the settings row only gates delivery
            tracing::warn!("Could not read notification settings: {}", e);
        }
    }

    if let Err(e) = store.create(&notification).await {
        tracing::warn!(
            recipient = ?notification.target,
            "Failed to store notification '{}': {}",
            notification.message,
            e
        );
    }
}

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
    page_size: i64,
}

impl NotificationsService {
    pub fn new(repository: Repository, config: &NotificationsConfig) -> Self {
        Self {
            repository,
            page_size: config.page_size,
        }
    }

    /// Newest notifications for the caller and their role
    pub async fn list_for(&self, claims: &UserClaims) -> AppResult<Vec<Notification>> {
        self.repository
            .notifications
            .list_for(claims.user_id, claims.role, self.page_size)
            .await
    }

    /// Idempotent; notifications the caller cannot see are reported missing
    pub async fn mark_read(&self, claims: &UserClaims, id: i32) -> AppResult<Notification> {
        let notification = self
            .repository
            .notifications
            .get(id)
            .await?
            .filter(|n| n.target.includes(claims.user_id, claims.role))
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;

        if notification.read {
            return Ok(notification);
        }
        self.repository.notifications.mark_read(id).await
    }

    pub async fn mark_all_read(&self, claims: &UserClaims) -> AppResult<MarkAllReadResponse> {
        let updated = self
            .repository
            .notifications
            .mark_all_read(claims.user_id, claims.role)
            .await?;
        Ok(MarkAllReadResponse { updated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotificationKind, NotificationTarget, Role};
    use std::time::Duration;

    fn inline() -> NotificationsConfig {
        NotificationsConfig {
            dispatch: DispatchMode::Inline,
            ..NotificationsConfig::default()
        }
    }

    #[tokio::test]
    async fn mark_read_is_idempotent_and_scoped() {
        let repository = Repository::in_memory();
        let dispatcher = NotificationDispatcher::new(&repository, &inline());
        let service = NotificationsService::new(repository, &inline());

        dispatcher
            .notify(NewNotification::new(NotificationTarget::User(5), NotificationKind::Info, "hello"))
            .await;

        let owner = UserClaims::new(5, "u5", "U5", Role::User, 1);
        let id = service.list_for(&owner).await.unwrap()[0].id;

        let first = service.mark_read(&owner, id).await.unwrap();
        let second = service.mark_read(&owner, id).await.unwrap();
        assert!(first.read && second.read);

        let stranger = UserClaims::new(6, "u6", "U6", Role::User, 1);
        assert!(matches!(
            service.mark_read(&stranger, id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn disabled_setting_drops_notifications() {
        let repository = Repository::in_memory();
        let mut settings = repository.settings.get().await.unwrap();
        settings.notifications_enabled = false;
        repository.settings.save(&settings).await.unwrap();

        let dispatcher = NotificationDispatcher::new(&repository, &inline());
        dispatcher
            .notify(NewNotification::new(NotificationTarget::role(Role::Admin), NotificationKind::Info, "x"))
            .await;

        let inbox = repository.notifications.list_for(1, Role::Admin, 50).await.unwrap();
        assert!(inbox.is_empty());
    }

    #[tokio::test]
    async fn queued_dispatch_is_drained_in_the_background() {
        let repository = Repository::in_memory();
        let dispatcher = NotificationDispatcher::new(&repository, &NotificationsConfig::default());
        dispatcher
            .notify(NewNotification::new(NotificationTarget::User(3), NotificationKind::Success, "done"))
            .await;

        let mut delivered = Vec::new();
        for _ in 0..50 {
            delivered = repository.notifications.list_for(3, Role::User, 50).await.unwrap();
            if !delivered.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].message, "done");
    }
}
