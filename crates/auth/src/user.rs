//! User and company records as seen by the permission authority.
//!
//! The records themselves are owned by the user/company stores; this module
//! only defines their shape and the effective-permission rule.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use copydesk_core::{CompanyId, Entity, UserId};

use crate::catalog::RbacCatalog;
use crate::roles::RoleName;

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// A user account.
///
/// `permissions` holds custom overrides granted on top of the role defaults.
/// Deactivation does not clear them; it is enforced at check time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: RoleName,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub company_id: Option<CompanyId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh, active user with no custom permissions.
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: RoleName) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into().trim().to_lowercase(),
            role,
            permissions: Vec::new(),
            is_active: true,
            company_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Role defaults ∪ custom overrides, or ∅ for an inactive user.
    pub fn effective_permissions(&self, catalog: &RbacCatalog) -> BTreeSet<String> {
        if !self.is_active {
            return BTreeSet::new();
        }

        catalog
            .role_actions(self.role)
            .iter()
            .map(|a| a.as_str().to_string())
            .chain(self.permissions.iter().cloned())
            .collect()
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CompanyId::new(),
            name: name.into(),
            industry: None,
            website: None,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Company {
    type Id = CompanyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A user joined with the company it belongs to (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithCompany {
    pub user: User,
    pub company: Option<Company>,
}

/// Partial update applied to a single user row in one store call.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub role: Option<RoleName>,
    pub permissions: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub company_id: Option<CompanyId>,
}

impl UserPatch {
    pub fn activation(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Default::default()
        }
    }

    /// Apply this patch to an in-memory record, bumping `updated_at`.
    pub fn apply_to(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(permissions) = &self.permissions {
            user.permissions = permissions.clone();
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
        if let Some(company_id) = self.company_id {
            user.company_id = Some(company_id);
        }
        user.updated_at = now;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Views
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    pub id: CompanyId,
    pub name: String,
}

/// Admin-facing projection of a user. Carries no credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: RoleName,
    /// Role defaults ∪ custom overrides, sorted.
    pub permissions: Vec<String>,
    pub custom_permissions: Vec<String>,
    pub is_active: bool,
    pub company: Option<CompanyRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserView {
    /// Build the view. Effective permissions here ignore `is_active` so admins
    /// can see what a deactivated user would regain on reactivation.
    pub fn from_record(record: UserWithCompany, catalog: &RbacCatalog) -> Self {
        let UserWithCompany { user, company } = record;

        let permissions: BTreeSet<String> = catalog
            .role_actions(user.role)
            .iter()
            .map(|a| a.as_str().to_string())
            .chain(user.permissions.iter().cloned())
            .collect();

        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            permissions: permissions.into_iter().collect(),
            custom_permissions: user.permissions,
            is_active: user.is_active,
            company: company.map(|c| CompanyRef { id: c.id, name: c.name }),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions;

    fn catalog() -> RbacCatalog {
        RbacCatalog::builtin().unwrap()
    }

    #[test]
    fn effective_permissions_union_role_and_custom() {
        let catalog = catalog();
        let mut user = User::new("Eddie", "eddie@example.com", RoleName::Editor);
        user.permissions = vec!["library:read".to_string(), "content:create".to_string()];

        let effective = user.effective_permissions(&catalog);
        let mut expected: BTreeSet<String> = catalog
            .role_actions(RoleName::Editor)
            .iter()
            .map(|a| a.to_string())
            .collect();
        expected.insert("library:read".to_string());

        assert_eq!(effective, expected);
    }

    #[test]
    fn inactive_user_has_no_effective_permissions() {
        let mut user = User::new("Ada", "ada@example.com", RoleName::Admin);
        user.permissions = vec![permissions::AUDIT_READ.to_string()];
        user.is_active = false;

        assert!(user.effective_permissions(&catalog()).is_empty());
        // Stored overrides are untouched.
        assert_eq!(user.permissions.len(), 1);
    }

    #[test]
    fn email_is_normalized() {
        let user = User::new("Bo", "  Bo@Example.COM ", RoleName::Guest);
        assert_eq!(user.email, "bo@example.com");
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut user = User::new("Cy", "cy@example.com", RoleName::Guest);
        user.permissions = vec!["comments:read".to_string()];
        let later = user.updated_at + chrono::Duration::seconds(5);

        UserPatch::activation(false).apply_to(&mut user, later);

        assert!(!user.is_active);
        assert_eq!(user.role, RoleName::Guest);
        assert_eq!(user.permissions, vec!["comments:read".to_string()]);
        assert_eq!(user.updated_at, later);
    }

    #[test]
    fn view_denormalizes_company_and_sorts_permissions() {
        let catalog = catalog();
        let company = Company::new("Acme Roasters");
        let mut user = User::new("Di", "di@example.com", RoleName::Guest);
        user.company_id = Some(company.id);
        user.permissions = vec!["analytics:read".to_string()];

        let view = UserView::from_record(
            UserWithCompany {
                user,
                company: Some(company.clone()),
            },
            &catalog,
        );

        assert_eq!(view.company, Some(CompanyRef { id: company.id, name: company.name }));
        assert_eq!(
            view.permissions,
            vec!["analytics:read", "comments:read", "companies:read", "content:read"]
        );
        assert_eq!(view.custom_permissions, vec!["analytics:read"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_role() -> impl Strategy<Value = RoleName> {
            prop::sample::select(RoleName::ALL.to_vec())
        }

        fn any_overrides() -> impl Strategy<Value = Vec<String>> {
            let actions: Vec<String> = crate::permissions::builtin_permissions()
                .into_iter()
                .map(|p| p.action.to_string())
                .collect();
            prop::sample::subsequence(actions.clone(), 0..actions.len())
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 128,
                ..ProptestConfig::default()
            })]

            /// An inactive user holds nothing, whatever the role or overrides.
            #[test]
            fn inactive_users_hold_nothing(role in any_role(), overrides in any_overrides()) {
                let catalog = catalog();
                let mut user = User::new("p", "p@example.com", role);
                user.permissions = overrides;
                user.is_active = false;

                prop_assert!(user.effective_permissions(&catalog).is_empty());
            }

            /// An active user always holds every default of their role, and
            /// every override.
            #[test]
            fn active_users_hold_role_defaults_and_overrides(
                role in any_role(),
                overrides in any_overrides(),
            ) {
                let catalog = catalog();
                let mut user = User::new("p", "p@example.com", role);
                user.permissions = overrides.clone();

                let effective = user.effective_permissions(&catalog);
                for action in catalog.role_actions(role) {
                    prop_assert!(effective.contains(action.as_str()));
                }
                for o in &overrides {
                    prop_assert!(effective.contains(o));
                }
            }
        }
    }
}
