use super::models::Company;
use crate::common::{StoreError, ValidationResult, Validator};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

pub struct CompaniesService {
    db: SqlitePool,
}

impl CompaniesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ============================================================================
    // Queries
    // ============================================================================

    /// Get all companies
    pub async fn get_all_companies(&self) -> Result<Vec<Company>, StoreError> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM companies
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(companies)
    }

    /// Get company by ID
    pub async fn find(&self, company_id: i64) -> Result<Option<Company>, StoreError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM companies
            WHERE id = ?
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(company)
    }

    /// Looks up an id taken straight from a URL; anything that is not an
    /// integer cannot name a company.
    pub async fn find_by_raw_id(&self, raw_id: &str) -> Result<Option<Company>, StoreError> {
        match raw_id.trim().parse::<i64>() {
            Ok(id) => self.find(id).await,
            Err(_) => {
                debug!(raw_id = %raw_id, "Company id is not numeric");
                Ok(None)
            }
        }
    }

    /// Number of users and assets referencing the company
    pub async fn count_dependents(&self, company_id: i64) -> Result<(i64, i64), StoreError> {
        let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE company_id = ?")
            .bind(company_id)
            .fetch_one(&self.db)
            .await?;

        let (assets,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM assets WHERE company_id = ?")
            .bind(company_id)
            .fetch_one(&self.db)
            .await?;

        Ok((users, assets))
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Validates and persists the company: inserts when it has no id yet
    /// (assigning one), updates its name otherwise.
    pub async fn save(&self, company: &mut Company) -> Result<(), StoreError> {
        let validation = company.validate(company);
        if !validation.is_valid {
            return Err(StoreError::Invalid(validation));
        }

        let now = chrono::Utc::now().to_rfc3339();

        let result = match company.id {
            None => self.insert(company, &now).await,
            Some(id) => self.update(id, company, &now).await,
        };

        result.map_err(|e| match e {
            StoreError::UniqueViolation(detail) => {
                warn!(name = %company.name, detail = %detail, "Company name already taken");
                let mut validation = ValidationResult::new();
                validation.add_error("name", "unique");
                StoreError::Invalid(validation)
            }
            other => other,
        })
    }

    async fn insert(&self, company: &mut Company, now: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO companies (name, created_at, updated_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&company.name)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await?;

        let id = result.last_insert_rowid();
        company.id = Some(id);
        company.created_at = Some(now.to_string());
        company.updated_at = Some(now.to_string());

        info!(company_id = id, name = %company.name, "Created company");
        Ok(())
    }

    async fn update(&self, id: i64, company: &mut Company, now: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE companies SET name = ?, updated_at = ? WHERE id = ?")
            .bind(&company.name)
            .bind(now)
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }

        company.updated_at = Some(now.to_string());

        info!(company_id = id, name = %company.name, "Updated company");
        Ok(())
    }

    /// Delete a company. Fails with `ReferencedByDependents` while users or
    /// assets still point at it.
    pub async fn delete(&self, company_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(company_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }

        info!(company_id = company_id, "Deleted company");
        Ok(())
    }
}
