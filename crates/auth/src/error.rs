//! Errors surfaced by the permission authority.

use thiserror::Error;

use copydesk_core::DomainError;

use crate::roles::RoleName;
use crate::store::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("forbidden: missing permission '{action}'{}", resource_suffix(.resource))]
    Forbidden {
        action: String,
        resource: Option<String>,
    },

    #[error("forbidden: permissions not allowed for role '{role}': {}", .invalid.join(", "))]
    PermissionsOutsideRole { role: RoleName, invalid: Vec<String> },

    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn resource_suffix(resource: &Option<String>) -> String {
    match resource {
        Some(r) => format!(" on resource '{r}'"),
        None => String::new(),
    }
}

impl AccessError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(action: &str, resource: Option<&str>) -> Self {
        Self::Forbidden {
            action: action.to_string(),
            resource: resource.map(str::to_string),
        }
    }

    /// Both denial kinds map to the same caller-facing category.
    pub fn is_denied(&self) -> bool {
        matches!(
            self,
            AccessError::Forbidden { .. } | AccessError::PermissionsOutsideRole { .. }
        )
    }
}

impl From<DomainError> for AccessError {
    fn from(value: DomainError) -> Self {
        AccessError::Validation(value.to_string())
    }
}
