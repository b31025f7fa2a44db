//! Spare part (inventory) model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::StockStatus;

/// Internal row structure; the stock status is not a column
#[derive(Debug, Clone, FromRow)]
pub struct SparePartRow {
    id: i32,
    name: String,
    category: String,
    quantity: i32,
    min_stock: i32,
    price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SparePartRow> for SparePart {
    fn from(row: SparePartRow) -> Self {
        SparePart::new(
            row.id,
            row.name,
            row.category,
            row.quantity,
            row.min_stock,
            row.price,
            row.created_at,
            row.updated_at,
        )
    }
}

/// Inventory item
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SparePart {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub min_stock: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    /// Derived from quantity and min_stock
    pub status: StockStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SparePart {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i32,
        name: String,
        category: String,
        quantity: i32,
        min_stock: i32,
        price: Decimal,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            category,
            quantity,
            min_stock,
            price,
            status: StockStatus::classify(quantity, min_stock),
            created_at,
            updated_at,
        }
    }

    /// Recompute the derived status after a quantity or threshold change
    pub fn refresh_status(&mut self) {
        self.status = StockStatus::classify(self.quantity, self.min_stock);
    }
}

fn default_min_stock() -> i32 {
    5
}

/// Create part request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePart {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    #[serde(default)]
    pub quantity: i32,
    #[validate(range(min = 0, message = "Minimum stock cannot be negative"))]
    #[serde(default = "default_min_stock")]
    pub min_stock: i32,
    #[schema(value_type = String)]
    #[serde(default)]
    pub price: Decimal,
}

/// Update part request
///
/// Technicians may only send `restock`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePart {
    pub name: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0, message = "Minimum stock cannot be negative"))]
    pub min_stock: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    /// Units to add on top of the current quantity
    #[validate(range(min = 1, message = "Restock amount must be positive"))]
    pub restock: Option<i32>,
}

impl UpdatePart {
    /// Whether anything other than a restock was requested
    pub fn touches_catalog_fields(&self) -> bool {
        self.name.is_some()
            || self.category.is_some()
            || self.quantity.is_some()
            || self.min_stock.is_some()
            || self.price.is_some()
    }
}

/// Ledger movement request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StockMovement {
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,
}

/// One ledger deduction performed as part of a repair request update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartConsumption {
    pub part_id: i32,
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_recomputed_not_stored() {
        let now = Utc::now();
        let mut part = SparePart::new(1, "Fan".into(), "Cooling".into(), 6, 5, Decimal::new(1250, 2), now, now);
        assert_eq!(part.status, StockStatus::InStock);

        part.quantity = 5;
        part.refresh_status();
        assert_eq!(part.status, StockStatus::LowStock);

        part.quantity = 0;
        part.refresh_status();
        assert_eq!(part.status, StockStatus::OutOfStock);
    }
}
