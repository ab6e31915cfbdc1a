//! Authentication data models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::collections::HashSet;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    /// JSON object, e.g. `{"companies.view": "1", "superuser": "0"}`
    pub permissions: Option<String>,
    pub company_id: Option<i64>,
    pub created_at: Option<String>,
}

impl User {
    /// Permission keys granted to this user. Values of `"1"`, `1` or `true` grant;
    /// anything else (including malformed JSON) grants nothing.
    pub fn granted_permissions(&self) -> HashSet<String> {
        let Some(raw) = self.permissions.as_deref() else {
            return HashSet::new();
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map
                .into_iter()
                .filter(|(_, v)| match v {
                    Value::String(s) => s == "1",
                    Value::Number(n) => n.as_i64() == Some(1),
                    Value::Bool(b) => *b,
                    _ => false,
                })
                .map(|(k, _)| k)
                .collect(),
            _ => HashSet::new(),
        }
    }
}
