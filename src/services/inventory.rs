//! Inventory ledger service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        spare_part::{CreatePart, SparePart, StockMovement, UpdatePart},
        NewNotification, NotificationKind, NotificationTarget, RelatedKind, Role, UserClaims,
    },
    repository::Repository,
};

use super::notifications::NotificationDispatcher;

const STOCK_ROLES: [Role; 2] = [Role::Admin, Role::Technician];

/// Admin alert for a part at or below its minimum stock, if any
pub(crate) fn low_stock_alert(part: &SparePart) -> Option<NewNotification> {
    if !part.status.needs_restock() {
        return None;
    }
    Some(
        NewNotification::new(
            NotificationTarget::role(Role::Admin),
            NotificationKind::Warning,
            format!("Low stock alert: {} is down to {}", part.name, part.quantity),
        )
        .about(RelatedKind::Inventory, part.id),
    )
}

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
    dispatcher: NotificationDispatcher,
}

impl InventoryService {
    pub fn new(repository: Repository, dispatcher: NotificationDispatcher) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    pub async fn list(&self, claims: &UserClaims) -> AppResult<Vec<SparePart>> {
        claims.require_any(&STOCK_ROLES)?;
        self.repository.inventory.list().await
    }

    pub async fn get(&self, claims: &UserClaims, id: i32) -> AppResult<SparePart> {
        claims.require_any(&STOCK_ROLES)?;
        self.find(id).await
    }

    pub async fn create(&self, claims: &UserClaims, data: CreatePart) -> AppResult<SparePart> {
        claims.require_admin()?;
        data.validate()?;
        let part = self.repository.inventory.create(&data).await?;
        tracing::info!("Spare part {} '{}' added with {} units", part.id, part.name, part.quantity);
        Ok(part)
    }

    /// Admins edit any field; technicians may only restock
    pub async fn update(&self, claims: &UserClaims, id: i32, data: UpdatePart) -> AppResult<SparePart> {
        claims.require_any(&STOCK_ROLES)?;
        data.validate()?;

        if claims.role == Role::Technician && data.touches_catalog_fields() {
            return Err(AppError::Authorization(
                "Technicians may only restock parts".to_string(),
            ));
        }

        let mut part = self.find(id).await?;
        if data.touches_catalog_fields() {
            if let Some(ref name) = data.name {
                if name.trim().is_empty() {
                    return Err(AppError::Validation("Name is required".to_string()));
                }
                part.name = name.trim().to_string();
            }
            if let Some(ref category) = data.category {
                part.category = category.clone();
            }
            if let Some(quantity) = data.quantity {
                part.quantity = quantity;
            }
            if let Some(min_stock) = data.min_stock {
                part.min_stock = min_stock;
            }
            if let Some(price) = data.price {
                part.price = price;
            }
            part.refresh_status();
            part = self.repository.inventory.save(&part).await?;
        }

        if let Some(amount) = data.restock {
            part = self.repository.inventory.restock(id, amount).await?;
        }

        if let Some(alert) = low_stock_alert(&part) {
            self.dispatcher.notify(alert).await;
        }
        Ok(part)
    }

    pub async fn restock(&self, claims: &UserClaims, id: i32, movement: StockMovement) -> AppResult<SparePart> {
        claims.require_any(&STOCK_ROLES)?;
        movement.validate()?;
        let part = self.repository.inventory.restock(id, movement.quantity).await?;
        tracing::info!("Restocked part {} by {}, now {}", id, movement.quantity, part.quantity);
        Ok(part)
    }

    /// Direct ledger deduction outside of a repair request
    pub async fn consume(&self, claims: &UserClaims, id: i32, movement: StockMovement) -> AppResult<SparePart> {
        claims.require_any(&STOCK_ROLES)?;
        movement.validate()?;
        let part = self
            .repository
            .inventory
            .consume(id, movement.quantity)
            .await
            .map_err(|e| {
                tracing::debug!("Consume of {} x{} refused: {}", id, movement.quantity, e);
                e
            })?;
        tracing::info!("Consumed {} of part {}, {} left", movement.quantity, id, part.quantity);

        if let Some(alert) = low_stock_alert(&part) {
            self.dispatcher.notify(alert).await;
        }
        Ok(part)
    }

    pub async fn delete(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_admin()?;
        self.repository.inventory.delete(id).await?;
        tracing::info!("Spare part {} deleted", id);
        Ok(())
    }

    async fn find(&self, id: i32) -> AppResult<SparePart> {
        self.repository
            .inventory
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Spare part {} not found", id)))
    }
}
