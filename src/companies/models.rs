use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A company row. `id` is `None` until the company has been saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Option<i64>,
    pub name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Form body for create and update
#[derive(Debug, Deserialize)]
pub struct CompanyForm {
    #[serde(default)]
    pub name: String,
}

/// Detail page payload: the company plus how many records point at it
#[derive(Debug, Serialize)]
pub struct CompanyDetails {
    #[serde(flatten)]
    pub company: Company,
    pub users_count: i64,
    pub assets_count: i64,
}
