//! Storage ports consumed by the permission authority.
//!
//! Implementations live in `copydesk-infra`. Each call is assumed to be
//! individually atomic (single-row read or single-row update); calls are not
//! composed into transactions.

use async_trait::async_trait;
use thiserror::Error;

use copydesk_core::{CompanyId, UserId};

use crate::roles::RoleName;
use crate::user::{Company, User, UserPatch, UserWithCompany};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("stored record is malformed: {0}")]
    Corrupt(String),
}

/// Predicate, ordering and window for a user query.
///
/// Filters are applied only when present. Results are ordered by
/// `created_at` descending, ties broken by id descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Case-insensitive substring matched against name OR email.
    pub search: Option<String>,
    pub role: Option<RoleName>,
    pub company_id: Option<CompanyId>,
    pub is_active: Option<bool>,
    pub offset: u64,
    pub limit: u32,
}

/// A window of matching users plus the unwindowed match count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQueryPage {
    pub users: Vec<UserWithCompany>,
    pub total_count: u64,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_user_with_company(
        &self,
        id: UserId,
    ) -> Result<Option<UserWithCompany>, StoreError>;

    /// Apply `patch` to one user. Returns whether a row matched; an unknown id
    /// is not an error.
    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<bool, StoreError>;

    async fn query_users(&self, query: &UserQuery) -> Result<UserQueryPage, StoreError>;
}

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn find_company_by_id(&self, id: CompanyId) -> Result<Option<Company>, StoreError>;

    /// Companies whose name contains `search` (case-insensitive), by name.
    async fn search_companies(
        &self,
        search: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Company>, StoreError>;
}
