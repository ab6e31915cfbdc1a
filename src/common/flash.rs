// src/common/flash.rs
//! Flash messages carried across one redirect in a cookie

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{
        header::{COOKIE, LOCATION, REFERER, SET_COOKIE},
        request::Parts,
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use tracing::{debug, warn};

pub const FLASH_COOKIE: &str = "flash";

/// Longest value replayed into a form; browsers drop cookies past ~4 KB.
pub const OLD_INPUT_MAX_CHARS: usize = 300;

/// Status text plus form state for the next rendered view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Field name -> localized messages
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
    /// Submitted input, replayed into the form
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub old: BTreeMap<String, String>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_input(mut self, field: &str, value: &str) -> Self {
        let kept: String = value.chars().take(OLD_INPUT_MAX_CHARS).collect();
        self.old.insert(field.to_string(), kept);
        self
    }

    pub fn with_field_error(mut self, field: &str, message: String) -> Self {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message);
        self
    }

    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(raw.as_bytes()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn set_cookie(&self) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            FLASH_COOKIE,
            self.encode()
        )
    }

    pub fn clear_cookie() -> String {
        format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", FLASH_COOKIE)
    }
}

/// Flash left by the previous response, if any
#[derive(Debug, Default)]
pub struct IncomingFlash(pub Option<Flash>);

#[async_trait]
impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(IncomingFlash(read_flash_cookie(&parts.headers)))
    }
}

fn read_flash_cookie(headers: &HeaderMap) -> Option<Flash> {
    let raw = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE)
        .map(|(_, value)| value)?;

    if raw.is_empty() {
        return None;
    }

    let flash = Flash::decode(raw);
    if flash.is_none() {
        warn!("Ignoring malformed flash cookie");
    }
    flash
}

/// `302 Found` that stores a flash for the next request
#[derive(Debug)]
pub struct FlashRedirect {
    pub to: String,
    pub flash: Flash,
}

impl FlashRedirect {
    pub fn to(to: impl Into<String>, flash: Flash) -> Self {
        Self {
            to: to.into(),
            flash,
        }
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        debug!(location = %self.to, "Redirecting with flash");
        (
            StatusCode::FOUND,
            [(LOCATION, self.to), (SET_COOKIE, self.flash.set_cookie())],
        )
            .into_response()
    }
}

/// Path of the page the request came from, or `fallback`.
/// Only the path and query of the `Referer` are kept so the redirect never leaves this host.
pub fn back_url(headers: &HeaderMap, fallback: &str) -> String {
    let referer = headers.get(REFERER).and_then(|h| h.to_str().ok());

    let path = referer.and_then(|r| {
        if r.starts_with('/') && !r.starts_with("//") {
            return Some(r.to_string());
        }
        let (_, rest) = r.split_once("://")?;
        let start = rest.find('/')?;
        Some(rest[start..].to_string())
    });

    path.unwrap_or_else(|| fallback.to_string())
}
