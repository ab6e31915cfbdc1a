// src/common/view.rs
//! Rendered views, returned as a JSON envelope for the front end to template

use axum::{
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use super::flash::Flash;

#[derive(Debug, Serialize)]
pub struct View {
    pub view: String,
    pub data: Map<String, Value>,
    pub flash: Option<Flash>,
}

impl View {
    pub fn new(name: &str) -> Self {
        Self {
            view: name.to_string(),
            data: Map::new(),
            flash: None,
        }
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.data.insert(key.to_string(), value);
        self
    }

    /// Attaches the consumed flash; the response then clears the cookie.
    /// Form views also get `old` and `errors` so fields can be refilled.
    pub fn with_flash(mut self, flash: Option<Flash>) -> Self {
        if let Some(f) = &flash {
            self = self.with("old", &f.old).with("errors", &f.errors);
        }
        self.flash = flash;
        self
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        if self.flash.is_some() {
            ([(SET_COOKIE, Flash::clear_cookie())], Json(self)).into_response()
        } else {
            Json(self).into_response()
        }
    }
}
