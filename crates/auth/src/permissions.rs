//! Permission catalog: the fixed list of actions known to the system.

use std::borrow::{Borrow, Cow};

use serde::{Deserialize, Serialize};

/// Action identifier.
///
/// Actions are opaque strings of the shape `"<domain>:<verb>"`
/// (e.g. `"content:create"`). Membership checks compare actions by value only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Action {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Grouping used by the admin UI when listing permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    Content,
    Management,
    Collaboration,
    Administration,
}

/// An atomic capability in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub action: Action,
    /// Object-kind the action applies to; `None` means resource-agnostic.
    pub resource: Option<String>,
    pub description: String,
    pub category: PermissionCategory,
}

impl Permission {
    pub fn new(
        action: Action,
        resource: Option<&str>,
        description: impl Into<String>,
        category: PermissionCategory,
    ) -> Self {
        Self {
            id: format!("perm_{}", action.as_str().replace(':', "_")),
            action,
            resource: resource.map(str::to_string),
            description: description.into(),
            category,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Action constants
// ─────────────────────────────────────────────────────────────────────────────

pub const CONTENT_CREATE: Action = Action::from_static("content:create");
pub const CONTENT_READ: Action = Action::from_static("content:read");
pub const CONTENT_UPDATE: Action = Action::from_static("content:update");
pub const CONTENT_DELETE: Action = Action::from_static("content:delete");
pub const CONTENT_PUBLISH: Action = Action::from_static("content:publish");
pub const CONTENT_GENERATE: Action = Action::from_static("content:generate");
pub const CONTENT_REVIEW: Action = Action::from_static("content:review");
pub const CONTENT_APPROVE: Action = Action::from_static("content:approve");
pub const CONTENT_REJECT: Action = Action::from_static("content:reject");
pub const LIBRARY_READ: Action = Action::from_static("library:read");
pub const LIBRARY_WRITE: Action = Action::from_static("library:write");
pub const TEMPLATES_READ: Action = Action::from_static("templates:read");
pub const TEMPLATES_WRITE: Action = Action::from_static("templates:write");

pub const COMPANIES_CREATE: Action = Action::from_static("companies:create");
pub const COMPANIES_READ: Action = Action::from_static("companies:read");
pub const COMPANIES_UPDATE: Action = Action::from_static("companies:update");
pub const COMPANIES_DELETE: Action = Action::from_static("companies:delete");
pub const CAMPAIGNS_CREATE: Action = Action::from_static("campaigns:create");
pub const CAMPAIGNS_READ: Action = Action::from_static("campaigns:read");
pub const CAMPAIGNS_UPDATE: Action = Action::from_static("campaigns:update");
pub const CAMPAIGNS_DELETE: Action = Action::from_static("campaigns:delete");
pub const ANALYTICS_READ: Action = Action::from_static("analytics:read");

pub const COMMENTS_CREATE: Action = Action::from_static("comments:create");
pub const COMMENTS_READ: Action = Action::from_static("comments:read");
pub const COMMENTS_UPDATE: Action = Action::from_static("comments:update");
pub const COMMENTS_DELETE: Action = Action::from_static("comments:delete");
pub const WORKFLOW_ASSIGN: Action = Action::from_static("workflow:assign");
pub const WORKFLOW_READ: Action = Action::from_static("workflow:read");
pub const NOTIFICATIONS_READ: Action = Action::from_static("notifications:read");

pub const USERS_CREATE: Action = Action::from_static("users:create");
pub const USERS_READ: Action = Action::from_static("users:read");
pub const USERS_UPDATE: Action = Action::from_static("users:update");
pub const USERS_DELETE: Action = Action::from_static("users:delete");
pub const USERS_ASSIGN_ROLES: Action = Action::from_static("users:assign_roles");
pub const ROLES_READ: Action = Action::from_static("roles:read");
pub const SETTINGS_READ: Action = Action::from_static("settings:read");
pub const SETTINGS_UPDATE: Action = Action::from_static("settings:update");
pub const AUDIT_READ: Action = Action::from_static("audit:read");

/// The built-in permission catalog, in display order.
pub fn builtin_permissions() -> Vec<Permission> {
    use PermissionCategory::*;

    let entries: [(Action, Option<&str>, &str, PermissionCategory); 38] = [
        (CONTENT_CREATE, Some("blog_posts"), "Create blog posts", Content),
        (CONTENT_READ, Some("blog_posts"), "View blog posts", Content),
        (CONTENT_UPDATE, Some("blog_posts"), "Edit blog posts", Content),
        (CONTENT_DELETE, Some("blog_posts"), "Delete blog posts", Content),
        (CONTENT_PUBLISH, Some("blog_posts"), "Publish approved blog posts", Content),
        (CONTENT_GENERATE, Some("blog_posts"), "Generate drafts with the AI writer", Content),
        (CONTENT_REVIEW, Some("blog_posts"), "Leave review notes on drafts", Content),
        (CONTENT_APPROVE, Some("blog_posts"), "Approve drafts for publishing", Content),
        (CONTENT_REJECT, Some("blog_posts"), "Send drafts back to the author", Content),
        (LIBRARY_READ, Some("content_library"), "Browse the content library", Content),
        (LIBRARY_WRITE, Some("content_library"), "Add and curate library items", Content),
        (TEMPLATES_READ, Some("templates"), "Use content templates", Content),
        (TEMPLATES_WRITE, Some("templates"), "Create and edit content templates", Content),
        (COMPANIES_CREATE, Some("companies"), "Register companies", Management),
        (COMPANIES_READ, Some("companies"), "Search and view companies", Management),
        (COMPANIES_UPDATE, Some("companies"), "Edit company profiles", Management),
        (COMPANIES_DELETE, Some("companies"), "Archive companies", Management),
        (CAMPAIGNS_CREATE, Some("campaigns"), "Create campaigns", Management),
        (CAMPAIGNS_READ, Some("campaigns"), "View campaigns", Management),
        (CAMPAIGNS_UPDATE, Some("campaigns"), "Edit campaigns", Management),
        (CAMPAIGNS_DELETE, Some("campaigns"), "Delete campaigns", Management),
        (ANALYTICS_READ, Some("analytics"), "View content performance analytics", Management),
        (COMMENTS_CREATE, Some("comments"), "Comment on content", Collaboration),
        (COMMENTS_READ, Some("comments"), "Read comments", Collaboration),
        (COMMENTS_UPDATE, Some("comments"), "Edit comments", Collaboration),
        (COMMENTS_DELETE, Some("comments"), "Delete comments", Collaboration),
        (WORKFLOW_ASSIGN, Some("workflows"), "Assign content to reviewers", Collaboration),
        (WORKFLOW_READ, Some("workflows"), "View workflow status", Collaboration),
        (NOTIFICATIONS_READ, None, "Receive notifications", Collaboration),
        (USERS_CREATE, Some("users"), "Invite users", Administration),
        (USERS_READ, Some("users"), "List and view users", Administration),
        (USERS_UPDATE, Some("users"), "Edit users, permissions and activation", Administration),
        (USERS_DELETE, Some("users"), "Remove users", Administration),
        (USERS_ASSIGN_ROLES, Some("users"), "Assign roles to users", Administration),
        (ROLES_READ, Some("roles"), "View role definitions", Administration),
        (SETTINGS_READ, Some("settings"), "View workspace settings", Administration),
        (SETTINGS_UPDATE, Some("settings"), "Change workspace settings", Administration),
        (AUDIT_READ, Some("audit_logs"), "Read the audit log", Administration),
    ];

    entries
        .into_iter()
        .map(|(action, resource, description, category)| {
            Permission::new(action, resource, description, category)
        })
        .collect()
}
