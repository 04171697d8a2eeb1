//! API-side permission gate.
//!
//! Operations declare what they need through [`RequiresPermission`]; the gate
//! asks the permission authority before the handler does any work.

use copydesk_auth::{AccessError, PermissionAuthority, RequiresPermission};

use crate::context::PrincipalContext;

/// Check the operation's requirement for the current caller.
///
/// An operation without a requirement is allowed.
pub async fn authorize_operation<O: RequiresPermission + ?Sized>(
    authority: &PermissionAuthority,
    principal: &PrincipalContext,
    operation: &O,
) -> Result<(), AccessError> {
    match operation.required_permission() {
        Some(requirement) => {
            authority
                .require_permission(
                    principal.user_id(),
                    requirement.action.as_str(),
                    requirement.resource,
                )
                .await
        }
        None => Ok(()),
    }
}
