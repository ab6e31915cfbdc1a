//! Shared fixtures for in-crate tests

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::dev_mode::DevModeConfig;
use super::i18n::Translator;
use super::migrations::create_schema;
use super::AppState;
use crate::auth::models::Claims;

pub const TEST_JWT_SECRET: &str = "test_secret_key";

/// Single-connection in-memory database with the full schema
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("in-memory pool");
    create_schema(&pool).await.expect("schema");
    pool
}

/// HS256 bearer token for `sub` that never expires
pub fn token_for(sub: &str, secret: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: 9999999999,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to encode token")
}

pub fn dev_mode(is_admin: bool) -> DevModeConfig {
    DevModeConfig {
        enabled: true,
        user_email: "dev@test.com".to_string(),
        user_name: "Dev User".to_string(),
        user_is_admin: is_admin,
    }
}

pub fn test_state(pool: SqlitePool, dev_mode: DevModeConfig) -> Arc<RwLock<AppState>> {
    Arc::new(RwLock::new(AppState {
        db: pool,
        translator: Arc::new(Translator::embedded()),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        admin_emails: HashSet::from(["root@example.com".to_string()]),
        dev_mode,
    }))
}

pub async fn insert_user(pool: &SqlitePool, id: &str, email: &str, permissions: Option<&str>, company_id: Option<i64>) {
    sqlx::query(
        "INSERT INTO users (id, email, name, permissions, company_id, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(email)
    .bind("Test User")
    .bind(permissions)
    .bind(company_id)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(pool)
    .await
    .expect("insert user");
}

pub async fn insert_asset(pool: &SqlitePool, asset_tag: &str, company_id: Option<i64>) {
    sqlx::query("INSERT INTO assets (asset_tag, name, company_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(asset_tag)
        .bind("Laptop")
        .bind(company_id)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(pool)
        .await
        .expect("insert asset");
}
