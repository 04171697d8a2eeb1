use copydesk_auth::{PermissionRequirement, RequiresPermission};

/// Small helper wrapper to associate a permission requirement with a request.
pub struct Guarded<Q> {
    pub inner: Q,
    pub required: Option<PermissionRequirement>,
}

impl<Q> Guarded<Q> {
    pub fn new(inner: Q, required: PermissionRequirement) -> Self {
        Self {
            inner,
            required: Some(required),
        }
    }
}

impl<Q> RequiresPermission for Guarded<Q> {
    fn required_permission(&self) -> Option<&PermissionRequirement> {
        self.required.as_ref()
    }
}
