//! Built-in roles and the static role → actions table.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::permissions::{self, Action};

/// Name of one of the four built-in roles.
///
/// This is a closed set: a request naming any other role fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Admin,
    Editor,
    Reviewer,
    Guest,
}

impl RoleName {
    pub const ALL: [RoleName; 4] = [
        RoleName::Admin,
        RoleName::Editor,
        RoleName::Reviewer,
        RoleName::Guest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "admin",
            RoleName::Editor => "editor",
            RoleName::Reviewer => "reviewer",
            RoleName::Guest => "guest",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RoleName::Admin => "Administrator",
            RoleName::Editor => "Editor",
            RoleName::Reviewer => "Reviewer",
            RoleName::Guest => "Guest",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RoleName::Admin => "Full access, including user and role administration",
            RoleName::Editor => "Creates, generates and publishes content for their companies",
            RoleName::Reviewer => "Reviews drafts and approves or rejects them",
            RoleName::Guest => "Read-only access to published content",
        }
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for RoleName {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleName::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

/// A named, immutable bundle of default actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: String,
    pub name: RoleName,
    pub display_name: String,
    pub description: String,
    pub permissions: BTreeSet<Action>,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn system(name: RoleName, permissions: BTreeSet<Action>, at: DateTime<Utc>) -> Self {
        Self {
            id: format!("role_{}", name.as_str()),
            name,
            display_name: name.display_name().to_string(),
            description: name.description().to_string(),
            permissions,
            is_system: true,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Default actions for every non-admin role.
///
/// Admin is not listed: it is granted the entire permission catalog when the
/// catalog is assembled.
pub fn builtin_role_table() -> Vec<(RoleName, Vec<Action>)> {
    use permissions::*;

    vec![
        (
            RoleName::Editor,
            vec![
                CONTENT_CREATE,
                CONTENT_READ,
                CONTENT_UPDATE,
                CONTENT_DELETE,
                CONTENT_PUBLISH,
                CONTENT_GENERATE,
                TEMPLATES_READ,
                COMPANIES_READ,
                CAMPAIGNS_CREATE,
                CAMPAIGNS_READ,
                CAMPAIGNS_UPDATE,
                ANALYTICS_READ,
                COMMENTS_CREATE,
                COMMENTS_READ,
                COMMENTS_UPDATE,
                COMMENTS_DELETE,
                WORKFLOW_READ,
                NOTIFICATIONS_READ,
            ],
        ),
        (
            RoleName::Reviewer,
            vec![
                CONTENT_READ,
                CONTENT_REVIEW,
                CONTENT_APPROVE,
                CONTENT_REJECT,
                COMPANIES_READ,
                CAMPAIGNS_READ,
                COMMENTS_CREATE,
                COMMENTS_READ,
                COMMENTS_UPDATE,
                WORKFLOW_READ,
                NOTIFICATIONS_READ,
            ],
        ),
        (
            RoleName::Guest,
            vec![CONTENT_READ, COMPANIES_READ, COMMENTS_READ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_parse_case_insensitively() {
        assert_eq!("Editor".parse::<RoleName>().unwrap(), RoleName::Editor);
        assert_eq!(" guest ".parse::<RoleName>().unwrap(), RoleName::Guest);
        assert!("owner".parse::<RoleName>().is_err());
    }

    #[test]
    fn role_names_serialize_lowercase() {
        let json = serde_json::to_string(&RoleName::Reviewer).unwrap();
        assert_eq!(json, "\"reviewer\"");
        assert!(serde_json::from_str::<RoleName>("\"superuser\"").is_err());
    }

    #[test]
    fn reviewer_cannot_create_content() {
        let table = builtin_role_table();
        let (_, reviewer) = table.iter().find(|(r, _)| *r == RoleName::Reviewer).unwrap();
        assert!(!reviewer.contains(&permissions::CONTENT_CREATE));
    }
}
