//! The permission authority: effective permissions and permission-gated
//! administration of users.
//!
//! The authority is stateless per call apart from the immutable catalog. The
//! permission pre-check and the follow-up store update are separate store
//! calls, so a concurrent admin can interleave between them (last write wins).

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use copydesk_core::UserId;

use crate::catalog::RbacCatalog;
use crate::error::AccessError;
use crate::permissions::{self, Permission};
use crate::requests::{
    total_pages, AssignRoleRequest, ListUsersFilter, PaginatedUsers, UpdateUserPermissionsRequest,
};
use crate::roles::{Role, RoleName};
use crate::store::{CompanyStore, UserQuery, UserStore};
use crate::user::{UserPatch, UserView};

pub struct PermissionAuthority {
    catalog: Arc<RbacCatalog>,
    users: Arc<dyn UserStore>,
    companies: Arc<dyn CompanyStore>,
}

impl PermissionAuthority {
    pub fn new(
        catalog: Arc<RbacCatalog>,
        users: Arc<dyn UserStore>,
        companies: Arc<dyn CompanyStore>,
    ) -> Self {
        Self {
            catalog,
            users,
            companies,
        }
    }

    pub fn catalog(&self) -> &RbacCatalog {
        &self.catalog
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Checks
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether `user_id` may perform `action`.
    ///
    /// Unknown and inactive users simply have no permissions. `resource` is
    /// recorded for tracing but does not narrow the decision: actions that
    /// share a resource are gated independently by action identity.
    #[instrument(skip(self, user_id), fields(user_id = %user_id), err)]
    pub async fn can_perform(
        &self,
        user_id: UserId,
        action: &str,
        resource: Option<&str>,
    ) -> Result<bool, AccessError> {
        if !self.catalog.contains_action(action) {
            debug!(action, "action is not in the permission catalog");
        }

        let Some(record) = self.users.find_user_with_company(user_id).await? else {
            debug!("unknown user has no permissions");
            return Ok(false);
        };

        let allowed = record
            .user
            .effective_permissions(&self.catalog)
            .contains(action);

        debug!(allowed, is_active = record.user.is_active, "permission check");
        Ok(allowed)
    }

    /// Like [`can_perform`](Self::can_perform), but a negative answer is an
    /// [`AccessError::Forbidden`].
    pub async fn require_permission(
        &self,
        user_id: UserId,
        action: &str,
        resource: Option<&str>,
    ) -> Result<(), AccessError> {
        if self.can_perform(user_id, action, resource).await? {
            Ok(())
        } else {
            warn!(%user_id, action, resource, "permission denied");
            Err(AccessError::forbidden(action, resource))
        }
    }

    /// The caller's own effective permission set (∅ when inactive).
    pub async fn effective_permissions(
        &self,
        user_id: UserId,
    ) -> Result<BTreeSet<String>, AccessError> {
        let user = self
            .users
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AccessError::not_found("user", user_id))?;
        Ok(user.effective_permissions(&self.catalog))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────────────────────

    /// Set a user's role. Without explicit custom permissions, the user's
    /// overrides are reset to the new role's full default set.
    #[instrument(skip(self, request), fields(target = %request.user_id, role = %request.role), err)]
    pub async fn assign_role(
        &self,
        request: AssignRoleRequest,
        acting_admin: UserId,
    ) -> Result<(), AccessError> {
        self.require_permission(acting_admin, permissions::USERS_ASSIGN_ROLES.as_str(), None)
            .await?;
        request.validate()?;

        if self.users.find_user_by_id(request.user_id).await?.is_none() {
            return Err(AccessError::not_found("user", request.user_id));
        }

        if let Some(company_id) = request.company_id {
            if self.companies.find_company_by_id(company_id).await?.is_none() {
                return Err(AccessError::not_found("company", company_id));
            }
        }

        let permissions = request.custom_permissions.unwrap_or_else(|| {
            self.catalog
                .role_actions(request.role)
                .iter()
                .map(|a| a.as_str().to_string())
                .collect()
        });

        let patch = UserPatch {
            role: Some(request.role),
            permissions: Some(permissions),
            company_id: request.company_id,
            ..Default::default()
        };
        self.users.update_user(request.user_id, patch).await?;

        debug!("role assigned");
        Ok(())
    }

    /// Replace a user's custom permissions. Every entry must already be one of
    /// the user's current role defaults.
    #[instrument(skip(self, request), fields(target = %request.user_id), err)]
    pub async fn update_user_permissions(
        &self,
        request: UpdateUserPermissionsRequest,
        acting_admin: UserId,
    ) -> Result<(), AccessError> {
        self.require_permission(acting_admin, permissions::USERS_UPDATE.as_str(), None)
            .await?;
        request.validate()?;

        let user = self
            .users
            .find_user_by_id(request.user_id)
            .await?
            .ok_or_else(|| AccessError::not_found("user", request.user_id))?;

        let allowed = self.catalog.role_actions(user.role);
        let invalid: Vec<String> = request
            .permissions
            .iter()
            .filter(|p| !allowed.contains(p.as_str()))
            .cloned()
            .collect();

        if !invalid.is_empty() {
            return Err(AccessError::PermissionsOutsideRole {
                role: user.role,
                invalid,
            });
        }

        let patch = UserPatch {
            permissions: Some(request.permissions),
            ..Default::default()
        };
        self.users.update_user(request.user_id, patch).await?;
        Ok(())
    }

    #[instrument(skip(self, filter), err)]
    pub async fn list_users(
        &self,
        filter: ListUsersFilter,
        acting_admin: UserId,
    ) -> Result<PaginatedUsers, AccessError> {
        self.require_permission(acting_admin, permissions::USERS_READ.as_str(), None)
            .await?;
        filter.validate()?;

        let page = filter.page();
        let limit = filter.limit();
        let query = UserQuery {
            search: filter.search_term().map(str::to_string),
            role: filter.role,
            company_id: filter.company_id,
            is_active: filter.is_active,
            offset: filter.offset(),
            limit,
        };

        let result = self.users.query_users(&query).await?;
        let users = result
            .users
            .into_iter()
            .map(|record| UserView::from_record(record, &self.catalog))
            .collect();

        Ok(PaginatedUsers {
            users,
            total_count: result.total_count,
            total_pages: total_pages(result.total_count, limit),
            current_page: page,
        })
    }

    /// Reactivate a user. An unknown target is a silent no-op.
    pub async fn activate_user(&self, user_id: UserId, acting_admin: UserId) -> Result<(), AccessError> {
        self.set_active(user_id, true, acting_admin).await
    }

    /// Deactivate a user. An unknown target is a silent no-op.
    pub async fn deactivate_user(&self, user_id: UserId, acting_admin: UserId) -> Result<(), AccessError> {
        self.set_active(user_id, false, acting_admin).await
    }

    #[instrument(skip(self), fields(target = %user_id), err)]
    async fn set_active(
        &self,
        user_id: UserId,
        is_active: bool,
        acting_admin: UserId,
    ) -> Result<(), AccessError> {
        self.require_permission(acting_admin, permissions::USERS_UPDATE.as_str(), None)
            .await?;

        let matched = self
            .users
            .update_user(user_id, UserPatch::activation(is_active))
            .await?;
        if !matched {
            debug!("activation change matched no user");
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog reads (ungated)
    // ─────────────────────────────────────────────────────────────────────────

    pub fn roles(&self) -> Vec<Role> {
        self.catalog.roles().cloned().collect()
    }

    pub fn permissions(&self) -> Vec<Permission> {
        self.catalog.permissions().to_vec()
    }

    pub fn role_permissions(&self, role: RoleName) -> Vec<Permission> {
        self.catalog.role_permissions(role)
    }
}
