use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use copydesk_auth::{
    Company, CompanyStore, StoreError, User, UserPatch, UserQuery, UserQueryPage, UserStore,
    UserWithCompany,
};
use copydesk_core::{CompanyId, Entity, UserId};

/// In-memory user/company directory for tests/dev.
///
/// Both maps sit behind one lock so a join always sees a consistent snapshot.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    companies: HashMap<CompanyId, Company>,
}

impl Tables {
    fn join(&self, user: &User) -> UserWithCompany {
        UserWithCompany {
            user: user.clone(),
            company: user
                .company_id
                .and_then(|id| self.companies.get(&id))
                .cloned(),
        }
    }
}

/// Insert or replace a record under its own id.
fn upsert<E: Entity>(table: &mut HashMap<E::Id, E>, record: E) {
    table.insert(record.id().clone(), record);
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory directory lock poisoned".to_string())
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        upsert(&mut tables.users, user);
        Ok(())
    }

    pub fn insert_company(&self, company: Company) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        upsert(&mut tables.companies, company);
        Ok(())
    }

    pub fn user_count(&self) -> usize {
        self.inner.read().map(|t| t.users.len()).unwrap_or(0)
    }
}

fn query_matches(user: &User, query: &UserQuery, needle: Option<&str>) -> bool {
    if let Some(needle) = needle {
        let hit = user.name.to_lowercase().contains(needle)
            || user.email.to_lowercase().contains(needle);
        if !hit {
            return false;
        }
    }
    if query.role.is_some_and(|r| r != user.role) {
        return false;
    }
    if query.company_id.is_some() && query.company_id != user.company_id {
        return false;
    }
    if query.is_active.is_some_and(|a| a != user.is_active) {
        return false;
    }
    true
}

#[async_trait]
impl UserStore for InMemoryDirectory {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_user_with_company(
        &self,
        id: UserId,
    ) -> Result<Option<UserWithCompany>, StoreError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables.users.get(&id).map(|u| tables.join(u)))
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        match tables.users.get_mut(&id) {
            Some(user) => {
                patch.apply_to(user, Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn query_users(&self, query: &UserQuery) -> Result<UserQueryPage, StoreError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut hits: Vec<&User> = tables
            .users
            .values()
            .filter(|u| query_matches(u, query, needle.as_deref()))
            .collect();

        hits.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total_count = hits.len() as u64;
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let users = hits
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .map(|u| tables.join(u))
            .collect();

        Ok(UserQueryPage { users, total_count })
    }
}

#[async_trait]
impl CompanyStore for InMemoryDirectory {
    async fn find_company_by_id(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables.companies.get(&id).cloned())
    }

    async fn search_companies(
        &self,
        search: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Company>, StoreError> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        let needle = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());

        let mut hits: Vec<Company> = tables
            .companies
            .values()
            .filter(|c| {
                needle
                    .as_deref()
                    .is_none_or(|n| c.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();

        hits.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(limit as usize);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use copydesk_auth::RoleName;

    fn user_at(name: &str, minutes_ago: i64) -> User {
        let mut user = User::new(name, format!("{}@example.com", name.to_lowercase()), RoleName::Editor);
        user.created_at = Utc::now() - Duration::minutes(minutes_ago);
        user
    }

    fn page_of(limit: u32) -> UserQuery {
        UserQuery {
            limit,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn query_orders_newest_first() {
        let dir = InMemoryDirectory::new();
        dir.insert_user(user_at("Old", 30)).unwrap();
        dir.insert_user(user_at("New", 1)).unwrap();
        dir.insert_user(user_at("Mid", 10)).unwrap();

        let page = dir.query_users(&page_of(10)).await.unwrap();
        let names: Vec<_> = page.users.iter().map(|r| r.user.name.as_str()).collect();
        assert_eq!(names, vec!["New", "Mid", "Old"]);
        assert_eq!(page.total_count, 3);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_name_or_email() {
        let dir = InMemoryDirectory::new();
        let mut by_email = user_at("Zed", 1);
        by_email.email = "marketing-lead@acme.io".to_string();
        dir.insert_user(by_email).unwrap();
        dir.insert_user(user_at("Maria Lead", 2)).unwrap();
        dir.insert_user(user_at("Other", 3)).unwrap();

        let query = UserQuery {
            search: Some("LEAD".to_string()),
            ..page_of(10)
        };
        let page = dir.query_users(&query).await.unwrap();
        assert_eq!(page.total_count, 2);
    }

    #[tokio::test]
    async fn explicit_false_activity_filter_applies() {
        let dir = InMemoryDirectory::new();
        let mut inactive = user_at("Idle", 1);
        inactive.is_active = false;
        dir.insert_user(inactive).unwrap();
        dir.insert_user(user_at("Busy", 2)).unwrap();

        let query = UserQuery {
            is_active: Some(false),
            ..page_of(10)
        };
        let page = dir.query_users(&query).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.users[0].user.name, "Idle");
    }

    #[tokio::test]
    async fn update_of_unknown_user_matches_nothing() {
        let dir = InMemoryDirectory::new();
        let matched = dir
            .update_user(UserId::new(), UserPatch::activation(false))
            .await
            .unwrap();
        assert!(!matched);
        assert_eq!(dir.user_count(), 0);
    }

    #[tokio::test]
    async fn join_attaches_company() {
        let dir = InMemoryDirectory::new();
        let company = Company::new("Northwind");
        let mut user = user_at("Ann", 1);
        user.company_id = Some(company.id);
        let id = user.id;
        dir.insert_company(company.clone()).unwrap();
        dir.insert_user(user).unwrap();

        let record = dir.find_user_with_company(id).await.unwrap().unwrap();
        assert_eq!(record.company, Some(company));
    }

    #[tokio::test]
    async fn company_search_sorts_by_name_and_limits() {
        let dir = InMemoryDirectory::new();
        for name in ["Globex", "Acme Foods", "Acme Labs", "Initech"] {
            dir.insert_company(Company::new(name)).unwrap();
        }

        let hits = dir.search_companies(Some("acme"), 10).await.unwrap();
        let names: Vec<_> = hits.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Acme Foods", "Acme Labs"]);

        let all = dir.search_companies(None, 2).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Acme Foods");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn block_on<F: std::future::Future>(f: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(f)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 64,
                ..ProptestConfig::default()
            })]

            /// Walking every page yields each user exactly once, newest first.
            #[test]
            fn pages_partition_the_ordered_result(
                ages in prop::collection::vec(0i64..500, 0..60),
                limit in 1u32..25,
            ) {
                let dir = InMemoryDirectory::new();
                for (i, age) in ages.iter().enumerate() {
                    dir.insert_user(user_at(&format!("u{i}"), *age)).unwrap();
                }

                let everything = block_on(dir.query_users(&page_of(1_000))).unwrap();
                let mut walked = Vec::new();
                let mut offset = 0u64;
                loop {
                    let query = UserQuery { offset, ..page_of(limit) };
                    let page = block_on(dir.query_users(&query)).unwrap();
                    prop_assert_eq!(page.total_count, ages.len() as u64);
                    if page.users.is_empty() {
                        break;
                    }
                    offset += page.users.len() as u64;
                    walked.extend(page.users);
                }

                prop_assert_eq!(&walked, &everything.users);
                for pair in walked.windows(2) {
                    prop_assert!(pair[0].user.created_at >= pair[1].user.created_at);
                }
            }
        }
    }
}
