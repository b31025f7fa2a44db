//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    departments, devices, health, inventory, notifications, repairs, reports, settings, users,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ERMS API",
        version = "1.0.0",
        description = "Equipment Repair Management System REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Repair requests
        repairs::list_repairs,
        repairs::get_repair,
        repairs::create_repair,
        repairs::update_repair,
        repairs::delete_repair,
        repairs::restore_repair,
        repairs::accept_repair,
        repairs::reject_repair,
        repairs::add_comment,
        // Inventory
        inventory::list_parts,
        inventory::get_part,
        inventory::create_part,
        inventory::update_part,
        inventory::restock_part,
        inventory::consume_part,
        inventory::delete_part,
        // Notifications
        notifications::list_notifications,
        notifications::mark_read,
        notifications::mark_all_read,
        // Devices
        devices::list_devices,
        devices::get_device,
        devices::create_device,
        devices::update_device,
        devices::delete_device,
        devices::restore_device,
        // Users
        users::list_users,
        users::me,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::restore_user,
        // Departments
        departments::list_departments,
        departments::create_department,
        departments::update_department,
        departments::delete_department,
        // Settings
        settings::get_settings,
        settings::update_settings,
        // Reports
        reports::dashboard,
        reports::repairs_report,
    ),
    components(
        schemas(
            // Enums
            crate::models::enums::Role,
            crate::models::enums::UserStatus,
            crate::models::enums::DeviceStatus,
            crate::models::enums::RepairStatus,
            crate::models::enums::RepairStage,
            crate::models::enums::Priority,
            crate::models::enums::StockStatus,
            crate::models::enums::NotificationKind,
            crate::models::enums::RelatedKind,
            // Repair requests
            crate::models::repair_request::RepairRequest,
            crate::models::repair_request::Comment,
            crate::models::repair_request::PartUsage,
            crate::models::repair_request::PartUsageInput,
            crate::models::repair_request::CreateRepairRequest,
            crate::models::repair_request::RepairPatch,
            crate::models::repair_request::AddComment,
            // Inventory
            crate::models::spare_part::SparePart,
            crate::models::spare_part::CreatePart,
            crate::models::spare_part::UpdatePart,
            crate::models::spare_part::StockMovement,
            // Notifications
            crate::models::notification::Notification,
            crate::models::notification::NotificationTarget,
            crate::models::notification::MarkAllReadResponse,
            // Devices
            crate::models::device::Device,
            crate::models::device::CreateDevice,
            crate::models::device::UpdateDevice,
            // Users
            crate::models::user::User,
            crate::models::user::UserQuery,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Departments
            crate::models::department::Department,
            crate::models::department::CreateDepartment,
            crate::models::department::UpdateDepartment,
            // Settings
            crate::models::settings::SystemSettings,
            crate::models::settings::UpdateSettings,
            // Reports
            crate::models::report::DashboardCounts,
            crate::models::report::DashboardStats,
            crate::models::report::StatusCount,
            crate::models::report::TechnicianLoad,
            crate::models::report::RepairsReport,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "repairs", description = "Repair request workflow"),
        (name = "inventory", description = "Spare parts ledger"),
        (name = "notifications", description = "In-app notifications"),
        (name = "devices", description = "Device registry"),
        (name = "users", description = "User management"),
        (name = "departments", description = "Departments"),
        (name = "settings", description = "System settings"),
        (name = "reports", description = "Dashboard and reports")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
