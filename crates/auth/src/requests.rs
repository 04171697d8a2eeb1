//! Typed request/response shapes for the administrative operations.

use serde::{Deserialize, Serialize};

use copydesk_core::{CompanyId, DomainError, DomainResult, UserId};

use crate::roles::RoleName;
use crate::user::UserView;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

fn ensure_no_blank_entries(field: &str, entries: &[String]) -> DomainResult<()> {
    if entries.iter().any(|p| p.trim().is_empty()) {
        return Err(DomainError::validation(format!(
            "{field} must not contain blank entries"
        )));
    }
    Ok(())
}

/// Give a user a new role, optionally with explicit custom permissions.
///
/// Omitting `custom_permissions` resets the user's overrides to the full
/// default set of the new role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub user_id: UserId,
    pub role: RoleName,
    #[serde(default)]
    pub custom_permissions: Option<Vec<String>>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

impl AssignRoleRequest {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(custom) = &self.custom_permissions {
            ensure_no_blank_entries("customPermissions", custom)?;
        }
        Ok(())
    }
}

/// Replace a user's custom permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPermissionsRequest {
    pub user_id: UserId,
    pub permissions: Vec<String>,
}

impl UpdateUserPermissionsRequest {
    pub fn validate(&self) -> DomainResult<()> {
        ensure_no_blank_entries("permissions", &self.permissions)
    }
}

/// Filter for the admin user listing. Every field is optional; present
/// fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersFilter {
    pub search: Option<String>,
    pub role: Option<RoleName>,
    pub company_id: Option<CompanyId>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListUsersFilter {
    pub fn validate(&self) -> DomainResult<()> {
        if self.page == Some(0) {
            return Err(DomainError::validation("page must be at least 1"));
        }
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_LIMIT {
                return Err(DomainError::validation(format!(
                    "limit must be between 1 and {MAX_LIMIT}"
                )));
            }
        }
        Ok(())
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page().saturating_sub(1)) * u64::from(self.limit())
    }

    /// Search term with surrounding whitespace removed; blank counts as absent.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// One page of the admin user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedUsers {
    pub users: Vec<UserView>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

pub fn total_pages(total_count: u64, limit: u32) -> u64 {
    total_count.div_ceil(u64::from(limit.max(1)))
}
