//! Read-only catalog endpoints.
//!
//! Any authenticated caller may inspect roles and permissions; the catalog
//! is not sensitive and UIs need it to render role pickers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use copydesk_auth::RoleName;

use crate::app::dto::{PermissionsResponse, RolePermissionsResponse, RolesResponse};
use crate::app::{errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles/:name/permissions", get(role_permissions))
        .route("/permissions", get(list_permissions))
}

/// GET /rbac/roles - All roles with their default actions
pub async fn list_roles(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    Json(RolesResponse {
        roles: services.authority.roles(),
    })
    .into_response()
}

/// GET /rbac/permissions - The full permission catalog
pub async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    Json(PermissionsResponse {
        permissions: services.authority.permissions(),
    })
    .into_response()
}

/// GET /rbac/roles/:name/permissions - Catalog entries granted to one role
pub async fn role_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let Ok(role) = name.parse::<RoleName>() else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", format!("role '{name}' not found"));
    };

    Json(RolePermissionsResponse {
        role,
        permissions: services.authority.role_permissions(role),
    })
    .into_response()
}
