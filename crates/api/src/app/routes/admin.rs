//! Admin routes for user administration.
//!
//! Handlers only translate HTTP to authority calls. The authority enforces
//! the admin permission for each operation, so the check cannot be skipped by
//! a route that forgets it.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use copydesk_auth::ListUsersFilter;
use copydesk_core::UserId;

use crate::app::dto::{AssignRoleBody, UpdatePermissionsBody};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/role", put(assign_role))
        .route("/users/:id/permissions", put(update_permissions))
        .route("/users/:id/activate", post(activate_user))
        .route("/users/:id/deactivate", post(deactivate_user))
}

fn parse_user_id(raw: &str) -> Result<UserId, axum::response::Response> {
    raw.parse().map_err(|_| errors::invalid_id("user", raw))
}

fn bad_request(message: String) -> axum::response::Response {
    errors::json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

fn no_content_or_error(result: Result<(), copydesk_auth::AccessError>) -> axum::response::Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::access_error_to_response(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /admin/users - Paginated, filtered user listing
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    filter: Result<Query<ListUsersFilter>, QueryRejection>,
) -> axum::response::Response {
    let Query(filter) = match filter {
        Ok(q) => q,
        Err(e) => return bad_request(e.body_text()),
    };

    match services.authority.list_users(filter, principal.user_id()).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => errors::access_error_to_response(e),
    }
}

/// PUT /admin/users/:id/role - Assign a role (and optionally overrides/company)
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<AssignRoleBody>, JsonRejection>,
) -> axum::response::Response {
    let user_id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return bad_request(e.body_text()),
    };

    let result = services
        .authority
        .assign_role(body.into_request(user_id), principal.user_id())
        .await;
    no_content_or_error(result)
}

/// PUT /admin/users/:id/permissions - Replace custom permissions
pub async fn update_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePermissionsBody>, JsonRejection>,
) -> axum::response::Response {
    let user_id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return bad_request(e.body_text()),
    };

    let result = services
        .authority
        .update_user_permissions(body.into_request(user_id), principal.user_id())
        .await;
    no_content_or_error(result)
}

/// POST /admin/users/:id/activate
pub async fn activate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    no_content_or_error(services.authority.activate_user(user_id, principal.user_id()).await)
}

/// POST /admin/users/:id/deactivate
pub async fn deactivate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    no_content_or_error(services.authority.deactivate_user(user_id, principal.user_id()).await)
}
