//! Declarative permission requirements for protected operations.

use serde::Serialize;

use crate::permissions::Action;

/// Static `{action, resource?}` pair attached to a protected operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionRequirement {
    pub action: Action,
    pub resource: Option<&'static str>,
}

impl PermissionRequirement {
    pub const fn new(action: Action) -> Self {
        Self {
            action,
            resource: None,
        }
    }

    pub const fn scoped(action: Action, resource: &'static str) -> Self {
        Self {
            action,
            resource: Some(resource),
        }
    }
}

/// Operation-side authorization contract (checked at the request boundary).
///
/// Implement this on operations that require a permission. The HTTP gate
/// enforces the requirement before dispatching; `None` means the operation is
/// unguarded.
pub trait RequiresPermission {
    fn required_permission(&self) -> Option<&PermissionRequirement>;
}
