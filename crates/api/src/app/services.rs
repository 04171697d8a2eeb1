//! Service wiring: catalog, directory backend, and the permission authority.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use copydesk_auth::{
    CompanyStore, Hs256JwtValidator, JwtClaims, PermissionAuthority, RbacCatalog, User, UserStore,
};
use copydesk_infra::{seed, InMemoryDirectory, PgDirectory};

use crate::config::ApiConfig;

const DEV_TOKEN_TTL_HOURS: i64 = 12;
const PG_MAX_CONNECTIONS: u32 = 10;

#[derive(Clone)]
pub struct AppServices {
    pub authority: Arc<PermissionAuthority>,
    pub companies: Arc<dyn CompanyStore>,
}

impl AppServices {
    pub fn new(
        catalog: Arc<RbacCatalog>,
        users: Arc<dyn UserStore>,
        companies: Arc<dyn CompanyStore>,
    ) -> Self {
        let authority = Arc::new(PermissionAuthority::new(catalog, users, companies.clone()));
        Self {
            authority,
            companies,
        }
    }

    /// Services over an in-memory directory (dev/test).
    pub fn in_memory(directory: Arc<InMemoryDirectory>) -> anyhow::Result<Self> {
        let catalog = Arc::new(RbacCatalog::builtin().context("built-in RBAC catalog is inconsistent")?);
        Ok(Self::new(catalog, directory.clone(), directory))
    }
}

/// Build services from configuration.
///
/// Without `DATABASE_URL` the directory lives in memory and is seeded with a
/// bootstrap admin; with it, Postgres is used and the admin is only inserted
/// into an empty `users` table.
pub async fn build_services(config: &ApiConfig, jwt: &Hs256JwtValidator) -> anyhow::Result<AppServices> {
    let Some(database_url) = config.database_url.as_deref() else {
        let directory = Arc::new(InMemoryDirectory::new());
        let admin = seed::seed_in_memory(&directory, &config.bootstrap_admin_email)
            .context("failed to seed in-memory directory")?;
        announce_bootstrap_admin(&admin, jwt);
        return AppServices::in_memory(directory);
    };

    let pool = PgPoolOptions::new()
        .max_connections(PG_MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;

    let directory = Arc::new(PgDirectory::new(pool));
    directory
        .ensure_schema()
        .await
        .context("failed to create directory schema")?;

    if let Some(admin) = seed::seed_postgres(&directory, &config.bootstrap_admin_email)
        .await
        .context("failed to insert bootstrap admin")?
    {
        announce_bootstrap_admin(&admin, jwt);
    }

    let catalog = Arc::new(RbacCatalog::builtin().context("built-in RBAC catalog is inconsistent")?);
    info!("using Postgres directory");
    Ok(AppServices::new(catalog, directory.clone(), directory))
}

/// Log a short-lived token for the bootstrap admin so a fresh deployment can
/// be administered without a separate identity provider.
fn announce_bootstrap_admin(admin: &User, jwt: &Hs256JwtValidator) {
    let claims = JwtClaims::for_user(admin.id, Utc::now(), Duration::hours(DEV_TOKEN_TTL_HOURS));
    match jwt.issue(&claims) {
        Ok(token) => warn!(
            admin_id = %admin.id,
            email = %admin.email,
            token = %token,
            "bootstrap admin created; use this bearer token to administer users"
        ),
        Err(e) => warn!(error = %e, "could not issue bootstrap admin token"),
    }
}
