//! Bootstrap data for an empty directory.
//!
//! A fresh deployment has no admin, and every administrative operation is
//! gated on an admin permission, so the first admin has to be written
//! directly into the store.

use tracing::info;

use copydesk_auth::{Company, RoleName, StoreError, User, UserQuery, UserStore};

use crate::directory::{InMemoryDirectory, PgDirectory};

pub const DEFAULT_BOOTSTRAP_ADMIN_EMAIL: &str = "admin@copydesk.local";

pub fn bootstrap_admin(email: &str) -> User {
    User::new("Bootstrap Admin", email, RoleName::Admin)
}

/// Companies available in a development directory.
pub fn sample_companies() -> Vec<Company> {
    [
        ("Acme Roasters", "Food & Beverage", "https://acme-roasters.example"),
        ("Northwind Outfitters", "Retail", "https://northwind.example"),
        ("Globex Health", "Healthcare", "https://globex-health.example"),
    ]
    .into_iter()
    .map(|(name, industry, website)| Company {
        industry: Some(industry.to_string()),
        website: Some(website.to_string()),
        ..Company::new(name)
    })
    .collect()
}

/// Seed an in-memory directory with an admin and the sample companies.
pub fn seed_in_memory(directory: &InMemoryDirectory, admin_email: &str) -> Result<User, StoreError> {
    for company in sample_companies() {
        directory.insert_company(company)?;
    }
    let admin = bootstrap_admin(admin_email);
    directory.insert_user(admin.clone())?;
    info!(admin_id = %admin.id, email = %admin.email, "seeded in-memory directory");
    Ok(admin)
}

/// Insert a bootstrap admin when the `users` table is empty.
///
/// Returns the inserted admin, or `None` when users already exist.
pub async fn seed_postgres(directory: &PgDirectory, admin_email: &str) -> Result<Option<User>, StoreError> {
    let any_user = UserQuery {
        limit: 1,
        ..Default::default()
    };
    if directory.query_users(&any_user).await?.total_count > 0 {
        return Ok(None);
    }

    let admin = bootstrap_admin(admin_email);
    directory.insert_user(&admin).await?;
    info!(admin_id = %admin.id, email = %admin.email, "inserted bootstrap admin");
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use copydesk_auth::CompanyStore;

    #[tokio::test]
    async fn in_memory_seed_creates_an_active_admin() {
        let dir = InMemoryDirectory::new();
        let admin = seed_in_memory(&dir, "Root@Copydesk.Local").unwrap();

        let stored = dir.find_user_by_id(admin.id).await.unwrap().unwrap();
        assert_eq!(stored.role, RoleName::Admin);
        assert!(stored.is_active);
        assert_eq!(stored.email, "root@copydesk.local");

        let companies = dir.search_companies(None, 10).await.unwrap();
        assert_eq!(companies.len(), sample_companies().len());
    }
}
