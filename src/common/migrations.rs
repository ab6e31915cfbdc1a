// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created if missing. `RESET_DB=true` drops them first.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - dropping all tables and recreating schema");
        drop_all_tables(pool).await?;
    }

    create_schema(pool).await?;

    info!("Database migration completed");
    Ok(())
}

/// Creates every table and index without touching existing data
pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    create_company_tables(pool).await?;
    create_dependent_tables(pool).await?;
    create_indexes(pool).await?;
    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Dependents first so foreign keys never block the drop
    for table in ["assets", "users", "companies"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_company_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Tables whose rows reference a company. No cascade: the store refuses
/// to delete a company while any of these rows point at it.
async fn create_dependent_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT,
            permissions TEXT,
            company_id INTEGER,
            created_at TEXT,
            FOREIGN KEY(company_id) REFERENCES companies(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_tag TEXT NOT NULL UNIQUE,
            name TEXT,
            company_id INTEGER,
            created_at TEXT,
            FOREIGN KEY(company_id) REFERENCES companies(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_companies_name ON companies(name)",
        "CREATE INDEX IF NOT EXISTS idx_users_company_id ON users(company_id)",
        "CREATE INDEX IF NOT EXISTS idx_assets_company_id ON assets(company_id)",
    ];

    for statement in indexes {
        if let Err(e) = sqlx::query(statement).execute(pool).await {
            warn!(error = %e, statement = %statement, "Failed to create index");
        }
    }

    Ok(())
}
