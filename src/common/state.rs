// Application state shared across all modules

use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;

use crate::common::dev_mode::DevModeConfig;
use crate::common::i18n::Translator;

/// Application state containing database pool, translator, and auth configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub translator: Arc<Translator>,
    pub jwt_secret: String,
    pub admin_emails: HashSet<String>,
    pub dev_mode: DevModeConfig,
}
