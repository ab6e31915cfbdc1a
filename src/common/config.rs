// src/common/config.rs
//! Environment configuration

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub admin_emails: HashSet<String>,
    pub locale: String,
    pub lang_dir: PathBuf,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://asset_admin.db".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| "replace_with_strong_secret".to_string());

        let admin_emails = parse_admin_emails(&env::var("ADMIN_EMAILS").unwrap_or_default());

        let locale = env::var("APP_LOCALE").unwrap_or_else(|_| "en".to_string());
        let lang_dir = PathBuf::from(env::var("LANG_DIR").unwrap_or_else(|_| "./lang".to_string()));

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            database_url,
            port,
            jwt_secret,
            admin_emails,
            locale,
            lang_dir,
            cors_origins,
        }
    }
}

/// Parse admin emails from a comma-separated list
pub fn parse_admin_emails(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
