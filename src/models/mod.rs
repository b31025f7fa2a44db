//! Data models for ERMS

pub mod department;
pub mod device;
pub mod enums;
pub mod notification;
pub mod repair_request;
pub mod report;
pub mod settings;
pub mod spare_part;
pub mod user;

// Re-export commonly used types
pub use department::Department;
pub use device::Device;
pub use enums::{
    DeviceStatus, NotificationKind, Priority, RelatedKind, RepairStage, RepairStatus, Role,
    StockStatus, UserStatus,
};
pub use notification::{NewNotification, Notification, NotificationTarget};
pub use repair_request::{Comment, PartUsage, RepairPatch, RepairRequest};
pub use settings::SystemSettings;
pub use spare_part::SparePart;
pub use user::{User, UserClaims};
