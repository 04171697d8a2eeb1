//! Postgres-backed user/company directory.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError::Backend` with the failing operation
//! in the message. Rows that cannot be decoded into domain records (for
//! example an unknown role name) map to `StoreError::Corrupt`.
//!
//! ## Atomicity
//!
//! Every trait method issues one statement (the listing issues one count and
//! one page query). Updates are single-row `UPDATE ... WHERE id = $1`, so a
//! patch is applied atomically, and the last writer wins.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row};
use tracing::instrument;
use uuid::Uuid;

use copydesk_auth::{
    Company, CompanyStore, RoleName, StoreError, User, UserPatch, UserQuery, UserQueryPage,
    UserStore, UserWithCompany,
};
use copydesk_core::{CompanyId, UserId};

use super::schema;

// Optional filters use `($n::type IS NULL OR ...)` so one parameterized
// statement serves every filter combination.
const USER_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR u.name ILIKE $1 OR u.email ILIKE $1)
        AND ($2::text IS NULL OR u.role = $2)
        AND ($3::uuid IS NULL OR u.company_id = $3)
        AND ($4::boolean IS NULL OR u.is_active = $4)
"#;

const USER_COLUMNS: &str = r#"
    u.id, u.name, u.email, u.role, u.permissions, u.is_active, u.company_id,
    u.created_at, u.updated_at,
    c.id AS c_id, c.name AS c_name, c.industry AS c_industry,
    c.website AS c_website, c.created_at AS c_created_at
"#;

/// Directory stored in the `users` and `companies` tables.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: Arc<PgPool>,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in schema::STATEMENTS {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, permissions, is_active, company_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.permissions)
        .bind(user.is_active)
        .bind(user.company_id.map(Uuid::from))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    pub async fn insert_company(&self, company: &Company) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO companies (id, name, industry, website, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(company.id.as_uuid())
        .bind(&company.name)
        .bind(&company.industry)
        .bind(&company.website)
        .bind(company.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_company", e))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

fn decode<T>(row: &PgRow, column: &str) -> Result<T, StoreError>
where
    T: for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Corrupt(format!("column {column}: {e}")))
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = decode(row, "role")?;
    let role = role
        .parse::<RoleName>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;

    Ok(User {
        id: UserId::from_uuid(decode(row, "id")?),
        name: decode(row, "name")?,
        email: decode(row, "email")?,
        role,
        permissions: decode(row, "permissions")?,
        is_active: decode(row, "is_active")?,
        company_id: decode::<Option<Uuid>>(row, "company_id")?.map(CompanyId::from_uuid),
        created_at: decode(row, "created_at")?,
        updated_at: decode(row, "updated_at")?,
    })
}

fn joined_company_from_row(row: &PgRow) -> Result<Option<Company>, StoreError> {
    let Some(id) = decode::<Option<Uuid>>(row, "c_id")? else {
        return Ok(None);
    };
    Ok(Some(Company {
        id: CompanyId::from_uuid(id),
        name: decode(row, "c_name")?,
        industry: decode(row, "c_industry")?,
        website: decode(row, "c_website")?,
        created_at: decode::<DateTime<Utc>>(row, "c_created_at")?,
    }))
}

fn company_from_row(row: &PgRow) -> Result<Company, StoreError> {
    Ok(Company {
        id: CompanyId::from_uuid(decode(row, "id")?),
        name: decode(row, "name")?,
        industry: decode(row, "industry")?,
        website: decode(row, "website")?,
        created_at: decode(row, "created_at")?,
    })
}

fn joined_from_row(row: &PgRow) -> Result<UserWithCompany, StoreError> {
    Ok(UserWithCompany {
        user: user_from_row(row)?,
        company: joined_company_from_row(row)?,
    })
}

/// Escape LIKE metacharacters so user input matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl UserStore for PgDirectory {
    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, role, permissions, is_active, company_id, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_id", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_user_with_company(
        &self,
        id: UserId,
    ) -> Result<Option<UserWithCompany>, StoreError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u LEFT JOIN companies c ON c.id = u.company_id WHERE u.id = $1"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_with_company", e))?;

        row.as_ref().map(joined_from_row).transpose()
    }

    #[instrument(skip(self, patch), fields(user_id = %id), err)]
    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<bool, StoreError> {
        // COALESCE keeps columns whose patch field is absent.
        let result = sqlx::query(
            r#"
            UPDATE users SET
                role = COALESCE($2, role),
                permissions = COALESCE($3, permissions),
                is_active = COALESCE($4, is_active),
                company_id = COALESCE($5, company_id),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(patch.role.map(|r| r.as_str()))
        .bind(patch.permissions)
        .bind(patch.is_active)
        .bind(patch.company_id.map(Uuid::from))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, query), fields(offset = query.offset, limit = query.limit), err)]
    async fn query_users(&self, query: &UserQuery) -> Result<UserQueryPage, StoreError> {
        let search_param: Option<String> = query.search.as_deref().map(like_pattern);
        let role_param: Option<&str> = query.role.map(|r| r.as_str());
        let company_param: Option<Uuid> = query.company_id.map(Uuid::from);

        let count_sql = format!("SELECT COUNT(*) AS total FROM users u {USER_FILTER}");
        let count_row = sqlx::query(&count_sql)
            .bind(search_param.as_deref())
            .bind(role_param)
            .bind(company_param)
            .bind(query.is_active)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_users", e))?;

        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| StoreError::Corrupt(format!("failed to read count: {}", e)))?;

        let page_sql = format!(
            "SELECT {USER_COLUMNS} FROM users u LEFT JOIN companies c ON c.id = u.company_id {USER_FILTER} \
             ORDER BY u.created_at DESC, u.id DESC LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query(&page_sql)
            .bind(search_param.as_deref())
            .bind(role_param)
            .bind(company_param)
            .bind(query.is_active)
            .bind(i64::from(query.limit))
            .bind(i64::try_from(query.offset).unwrap_or(i64::MAX))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("query_users", e))?;

        let users = rows
            .iter()
            .map(joined_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UserQueryPage {
            users,
            total_count: u64::try_from(total).unwrap_or(0),
        })
    }
}

#[async_trait]
impl CompanyStore for PgDirectory {
    #[instrument(skip(self), fields(company_id = %id), err)]
    async fn find_company_by_id(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, industry, website, created_at FROM companies WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_company_by_id", e))?;

        row.as_ref().map(company_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn search_companies(
        &self,
        search: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Company>, StoreError> {
        let search_param: Option<String> = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let rows = sqlx::query(
            r#"
            SELECT id, name, industry, website, created_at
            FROM companies
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY name ASC, id ASC
            LIMIT $2
            "#,
        )
        .bind(search_param)
        .bind(i64::from(limit))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_companies", e))?;

        rows.iter().map(company_from_row).collect()
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::Corrupt(format!("column {} in {}: {}", index, operation, source))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }

    #[test]
    fn filter_binds_every_optional_predicate() {
        for param in ["$1", "$2", "$3", "$4"] {
            assert!(USER_FILTER.contains(&format!("{param}::")), "{param} is not typed");
        }
    }
}
