//! Access scoping: which requests and devices a caller may see

use crate::{
    error::{AppError, AppResult},
    models::{Device, RepairRequest, Role, UserClaims},
};

/// Visible subset of repair requests for a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    /// Every non-deleted request
    All,
    /// Requests assigned to this technician
    AssignedTo(i32),
    /// Requests filed by this user
    RequestedBy(i32),
}

impl RequestScope {
    pub fn for_caller(claims: &UserClaims) -> Self {
        match claims.role {
            Role::Admin => RequestScope::All,
            Role::Technician => RequestScope::AssignedTo(claims.user_id),
            Role::User => RequestScope::RequestedBy(claims.user_id),
        }
    }

    pub fn permits(&self, request: &RepairRequest) -> bool {
        match *self {
            RequestScope::All => true,
            RequestScope::AssignedTo(id) => request.assigned_to_id == Some(id),
            RequestScope::RequestedBy(id) => request.requested_by_id == id,
        }
    }

    /// Existing but out-of-scope records are reported as forbidden, not missing
    pub fn ensure_visible(&self, request: &RepairRequest) -> AppResult<()> {
        if self.permits(request) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Not authorized to view repair request {}",
                request.id
            )))
        }
    }
}

/// Visible subset of devices for a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceScope {
    All,
    /// Devices held by this user
    HeldBy(i32),
    /// Devices referenced by requests assigned to this technician
    ServicedBy(i32),
}

impl DeviceScope {
    pub fn for_caller(claims: &UserClaims) -> Self {
        match claims.role {
            Role::Admin => DeviceScope::All,
            Role::Technician => DeviceScope::ServicedBy(claims.user_id),
            Role::User => DeviceScope::HeldBy(claims.user_id),
        }
    }

    /// Decide visibility given the technician's assigned requests
    pub fn permits(&self, device: &Device, assigned_requests: &[RepairRequest]) -> bool {
        match *self {
            DeviceScope::All => true,
            DeviceScope::HeldBy(id) => device.assigned_to_id == Some(id),
            DeviceScope::ServicedBy(id) => assigned_requests
                .iter()
                .any(|r| r.device_id == device.id && r.assigned_to_id == Some(id)),
        }
    }
}
