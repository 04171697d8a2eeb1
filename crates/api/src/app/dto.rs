//! Request bodies and query strings that are HTTP-specific.
//!
//! Domain request shapes (`ListUsersFilter`, ...) are deserialized directly
//! where the wire format matches; these types cover the rest.

use serde::{Deserialize, Serialize};

use copydesk_auth::{AssignRoleRequest, Permission, Role, RoleName, UpdateUserPermissionsRequest};
use copydesk_core::{CompanyId, UserId};

pub const DEFAULT_COMPANY_LIMIT: u32 = 20;
pub const MAX_COMPANY_LIMIT: u32 = 100;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `PUT /admin/users/:id/role`; the target comes from the path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleBody {
    pub role: RoleName,
    #[serde(default)]
    pub custom_permissions: Option<Vec<String>>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

impl AssignRoleBody {
    pub fn into_request(self, user_id: UserId) -> AssignRoleRequest {
        AssignRoleRequest {
            user_id,
            role: self.role,
            custom_permissions: self.custom_permissions,
            company_id: self.company_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePermissionsBody {
    pub permissions: Vec<String>,
}

impl UpdatePermissionsBody {
    pub fn into_request(self, user_id: UserId) -> UpdateUserPermissionsRequest {
        UpdateUserPermissionsRequest {
            user_id,
            permissions: self.permissions,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CanQuery {
    pub action: String,
    pub resource: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompanySearchQuery {
    pub search: Option<String>,
    pub limit: Option<u32>,
}

impl CompanySearchQuery {
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_COMPANY_LIMIT)
            .clamp(1, MAX_COMPANY_LIMIT)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyPermissionsResponse {
    pub user_id: UserId,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CanResponse {
    pub action: String,
    pub resource: Option<String>,
    pub allowed: bool,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<Role>,
}

#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize)]
pub struct RolePermissionsResponse {
    pub role: RoleName,
    pub permissions: Vec<Permission>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_limit_is_clamped() {
        let q = |limit| CompanySearchQuery { search: None, limit };
        assert_eq!(q(None).limit(), DEFAULT_COMPANY_LIMIT);
        assert_eq!(q(Some(0)).limit(), 1);
        assert_eq!(q(Some(10_000)).limit(), MAX_COMPANY_LIMIT);
    }

    #[test]
    fn assign_role_body_takes_target_from_path() {
        let body: AssignRoleBody = serde_json::from_value(serde_json::json!({
            "role": "reviewer",
            "customPermissions": ["content:read"],
        }))
        .unwrap();
        let target = UserId::new();
        let req = body.into_request(target);

        assert_eq!(req.user_id, target);
        assert_eq!(req.role, RoleName::Reviewer);
        assert_eq!(req.custom_permissions, Some(vec!["content:read".to_string()]));
    }
}
