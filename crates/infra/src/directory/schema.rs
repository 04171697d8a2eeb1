//! DDL for the directory tables.
//!
//! Statements are idempotent so `PgDirectory::ensure_schema` can run on every
//! startup.

pub(crate) const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        industry TEXT,
        website TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL CHECK (role IN ('admin', 'editor', 'reviewer', 'guest')),
        permissions TEXT[] NOT NULL DEFAULT '{}',
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        company_id UUID REFERENCES companies (id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS users_created_at_idx ON users (created_at DESC, id DESC)",
    "CREATE INDEX IF NOT EXISTS users_company_id_idx ON users (company_id)",
    "CREATE INDEX IF NOT EXISTS companies_name_idx ON companies (name)",
];
