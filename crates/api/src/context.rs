use copydesk_core::UserId;

/// Authenticated caller of a request.
///
/// Carries identity only; permissions are resolved per check by the
/// permission authority.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
}

impl PrincipalContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
