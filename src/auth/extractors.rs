//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::{Claims, User};
use super::policy::SUPERUSER;
use crate::common::helpers::safe_token_log;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// This extractor validates JWT tokens and loads user information from the database.
/// A user is a superuser when listed in `admin_emails` or granted `superuser`.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
    pub is_admin: bool,
    pub permissions: HashSet<String>,
}

impl AuthedUser {
    fn from_user(user: User, admin_emails: &HashSet<String>, force_admin: bool) -> Self {
        let permissions = user.granted_permissions();
        let is_admin = force_admin
            || admin_emails.contains(&user.email.to_lowercase())
            || permissions.contains(SUPERUSER);

        Self {
            id: user.id,
            email: user.email,
            is_admin,
            permissions,
        }
    }

    /// Superusers hold every permission
    pub fn can(&self, permission: &str) -> bool {
        self.is_admin || self.permissions.contains(permission)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        // DEV MODE: Bypass authentication completely
        if app_state.dev_mode.is_enabled() {
            let dev_user = app_state.dev_mode.create_dev_user();
            let authed = AuthedUser::from_user(
                dev_user,
                &app_state.admin_emails,
                app_state.dev_mode.user_is_admin,
            );

            debug!(
                user_id = %authed.id,
                email = %safe_email_log(&authed.email),
                is_admin = authed.is_admin,
                "DEV MODE: Authentication bypassed"
            );

            return Ok(authed);
        }

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let token = match token {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        // Handle "Bearer <token>" format or raw token
        let bare_token = match token.strip_prefix("Bearer ") {
            Some(rest) => rest.to_string(),
            None => token,
        };

        let decoded = match decode::<Claims>(
            &bare_token,
            &DecodingKey::from_secret(app_state.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, token = %safe_token_log(&bare_token), "JWT token validation failed");
                return Err(ApiError::Unauthorized("invalid token".into()));
            }
        };

        let user_id = decoded.claims.sub;

        let user: Option<User> = sqlx::query_as::<_, User>(
            "SELECT id, email, name, permissions, company_id, created_at FROM users WHERE id = ?",
        )
        .bind(&user_id)
        .fetch_optional(&app_state.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = %user_id,
                "Database error during user lookup in authentication"
            );
            ApiError::DatabaseError(e)
        })?;

        match user {
            Some(u) => {
                let authed = AuthedUser::from_user(u, &app_state.admin_emails, false);
                debug!(
                    user_id = %authed.id,
                    email = %safe_email_log(&authed.email),
                    is_admin = authed.is_admin,
                    "User authentication successful via extractor"
                );
                Ok(authed)
            }
            None => {
                warn!(user_id = %user_id, "Authentication failed: user not found in database");
                Err(ApiError::Unauthorized("user not found".into()))
            }
        }
    }
}
