//! Shared domain enums
//!
//! Every enum here is stored as TEXT and serialized with the same label the
//! clients display ("In Progress", "Low Stock", ...).

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&'r str as Decode<'r, Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

text_enum! {
    /// Caller role. Every permission decision dispatches on this.
    pub enum Role {
        Admin => "admin",
        Technician => "technician",
        User => "user",
    }
}

text_enum! {
    /// Account status
    pub enum UserStatus {
        Active => "Active",
        Suspended => "Suspended",
    }
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

text_enum! {
    /// Device lifecycle status
    pub enum DeviceStatus {
        Active => "Active",
        InRepair => "In Repair",
        /// Decommissioned; no new repair requests can be filed
        Retired => "Retired",
    }
}

// ---------------------------------------------------------------------------
// Repair requests
// ---------------------------------------------------------------------------

text_enum! {
    /// Externally visible workflow state of a repair request
    pub enum RepairStatus {
        Pending => "Pending",
        Approved => "Approved",
        InProgress => "In Progress",
        WaitingForParts => "Waiting for Parts",
        Completed => "Completed",
        Rejected => "Rejected",
        Cancelled => "Cancelled",
    }
}

impl RepairStatus {
    /// Terminal statuses accept comments only
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RepairStatus::Completed | RepairStatus::Rejected | RepairStatus::Cancelled
        )
    }

    /// Statuses reachable from this one
    pub fn successors(&self) -> &'static [RepairStatus] {
        use RepairStatus::*;
        match self {
            Pending => &[Approved, InProgress, Rejected, Cancelled],
            Approved => &[InProgress, Cancelled],
            InProgress => &[WaitingForParts, Completed, Cancelled],
            WaitingForParts => &[InProgress, Cancelled],
            Completed | Rejected | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: RepairStatus) -> bool {
        self.successors().contains(&next)
    }
}

text_enum! {
    /// Technician-facing progress marker nested inside the status
    pub enum RepairStage {
        Diagnosing => "Diagnosing",
        WaitingForParts => "Waiting for parts",
        RepairInProgress => "Repair in progress",
        Testing => "Testing",
        Completed => "Completed",
    }
}

text_enum! {
    pub enum Priority {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Urgent => "Urgent",
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

text_enum! {
    /// Stock classification, always derived from quantity and threshold
    pub enum StockStatus {
        InStock => "In Stock",
        LowStock => "Low Stock",
        OutOfStock => "Out of Stock",
    }
}

impl StockStatus {
    pub fn classify(quantity: i32, min_stock: i32) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity <= min_stock {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn needs_restock(&self) -> bool {
        !matches!(self, StockStatus::InStock)
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

text_enum! {
    pub enum NotificationKind {
        Info => "info",
        Success => "success",
        Warning => "warning",
        Error => "error",
    }
}

text_enum! {
    /// Kind of entity a notification points at
    pub enum RelatedKind {
        RepairRequest => "RepairRequest",
        Device => "Device",
        Inventory => "Inventory",
    }
}
