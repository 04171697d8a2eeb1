use axum::{routing::get, Router};

pub mod admin;
pub mod common;
pub mod companies;
pub mod me;
pub mod rbac;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/companies", get(companies::search_companies))
        .nest("/me", me::router())
        .nest("/rbac", rbac::router())
        .nest("/admin", admin::router())
}
