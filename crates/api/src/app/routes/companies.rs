//! Company lookup, gated on `companies:read`.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    Json,
};

use copydesk_auth::{permissions, PermissionRequirement};

use crate::app::dto::CompanySearchQuery;
use crate::app::routes::common::Guarded;
use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

const READ_COMPANIES: PermissionRequirement =
    PermissionRequirement::scoped(permissions::COMPANIES_READ, "companies");

/// GET /companies?search=&limit= - Companies by name
pub async fn search_companies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<CompanySearchQuery>,
) -> axum::response::Response {
    let guarded = Guarded::new(query, READ_COMPANIES);
    if let Err(e) = authz::authorize_operation(&services.authority, &principal, &guarded).await {
        return errors::access_error_to_response(e);
    }

    let query = guarded.inner;
    let search = query.search.as_deref();
    match services.companies.search_companies(search, query.limit()).await {
        Ok(companies) => Json(serde_json::json!({ "companies": companies })).into_response(),
        Err(e) => errors::access_error_to_response(e.into()),
    }
}
