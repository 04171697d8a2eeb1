//! Self-service permission queries for the authenticated caller.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::dto::{CanQuery, CanResponse, MyPermissionsResponse};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/permissions", get(my_permissions))
        .route("/can", get(can))
}

/// GET /me/permissions - The caller's effective permissions
pub async fn my_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.authority.effective_permissions(principal.user_id()).await {
        Ok(permissions) => Json(MyPermissionsResponse {
            user_id: principal.user_id(),
            permissions: permissions.into_iter().collect(),
        })
        .into_response(),
        Err(e) => errors::access_error_to_response(e),
    }
}

/// GET /me/can?action=&resource= - Whether the caller may perform an action
pub async fn can(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    query: Result<Query<CanQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text())
        }
    };

    let result = services
        .authority
        .can_perform(principal.user_id(), &query.action, query.resource.as_deref())
        .await;

    match result {
        Ok(allowed) => Json(CanResponse {
            action: query.action,
            resource: query.resource,
            allowed,
        })
        .into_response(),
        Err(e) => errors::access_error_to_response(e),
    }
}
