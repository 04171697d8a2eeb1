//! Immutable RBAC catalog: permissions, roles and the role → actions table.
//!
//! The catalog is assembled once at process start and shared by `Arc`. It never
//! changes afterwards, so readers need no synchronisation.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::permissions::{builtin_permissions, Action, Permission};
use crate::roles::{builtin_role_table, Role, RoleName};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("role '{role}' references unknown action '{action}'")]
    UnknownAction { role: RoleName, action: String },

    #[error("action '{0}' is declared more than once")]
    DuplicateAction(String),

    #[error("role '{0}' has no entry in the role table")]
    MissingRole(RoleName),
}

/// The permission catalog plus every role's default action set.
#[derive(Debug, Clone)]
pub struct RbacCatalog {
    permissions: Vec<Permission>,
    roles: BTreeMap<RoleName, Role>,
}

impl RbacCatalog {
    /// The catalog shipped with the product: 38 permissions, four roles.
    ///
    /// Admin is granted every action in the permission catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        let permissions = builtin_permissions();
        let mut table = builtin_role_table();
        table.push((
            RoleName::Admin,
            permissions.iter().map(|p| p.action.clone()).collect(),
        ));
        Self::new(permissions, table, Utc::now())
    }

    /// Assemble a catalog, enforcing referential integrity between role
    /// tables and the permission list.
    pub fn new(
        permissions: Vec<Permission>,
        role_table: Vec<(RoleName, Vec<Action>)>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CatalogError> {
        let mut known: HashSet<&str> = HashSet::with_capacity(permissions.len());
        for p in &permissions {
            if !known.insert(p.action.as_str()) {
                return Err(CatalogError::DuplicateAction(p.action.to_string()));
            }
        }

        let mut roles = BTreeMap::new();
        for (name, actions) in role_table {
            if let Some(unknown) = actions.iter().find(|a| !known.contains(a.as_str())) {
                return Err(CatalogError::UnknownAction {
                    role: name,
                    action: unknown.to_string(),
                });
            }
            let set: BTreeSet<Action> = actions.into_iter().collect();
            roles.insert(name, Role::system(name, set, created_at));
        }

        if let Some(missing) = RoleName::ALL.into_iter().find(|r| !roles.contains_key(r)) {
            return Err(CatalogError::MissingRole(missing));
        }

        Ok(Self { permissions, roles })
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Roles in a stable order (admin, editor, reviewer, guest).
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    pub fn role(&self, name: RoleName) -> Option<&Role> {
        self.roles.get(&name)
    }

    /// The default action set for a role.
    pub fn role_actions(&self, name: RoleName) -> &BTreeSet<Action> {
        static NO_ACTIONS: BTreeSet<Action> = BTreeSet::new();
        // Construction guarantees every RoleName has an entry.
        self.role(name).map_or(&NO_ACTIONS, |r| &r.permissions)
    }

    /// Catalog entries granted to a role, in catalog order.
    pub fn role_permissions(&self, name: RoleName) -> Vec<Permission> {
        let actions = self.role_actions(name);
        self.permissions
            .iter()
            .filter(|p| actions.contains(p.action.as_str()))
            .cloned()
            .collect()
    }

    pub fn contains_action(&self, action: &str) -> bool {
        self.permissions.iter().any(|p| p.action.as_str() == action)
    }
}
