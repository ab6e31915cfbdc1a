use super::models::{Company, CompanyDetails, CompanyForm};
use super::services::CompaniesService;
use crate::auth::policy::{authorize, require_superuser, COMPANIES_VIEW};
use crate::auth::AuthedUser;
use crate::common::{
    flash::back_url, ApiError, AppState, Flash, FlashRedirect, IncomingFlash, StoreError,
    Translator, ValidationResult, View,
};
use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub const INDEX_URL: &str = "/admin/companies";
pub const CREATE_URL: &str = "/admin/companies/create";

const MESSAGES: &str = "admin/companies/message";

fn edit_url(company_id: &str) -> String {
    format!("{}/{}/edit", INDEX_URL, company_id)
}

fn message(translator: &Translator, key: &str) -> String {
    translator.trans(&format!("{}.{}", MESSAGES, key))
}

fn to_index(flash: Flash) -> Response {
    FlashRedirect::to(INDEX_URL, flash).into_response()
}

/// Localizes each failed rule into the flash under its field
fn with_validation_errors(
    mut flash: Flash,
    translator: &Translator,
    validation: &ValidationResult,
) -> Flash {
    for error in &validation.errors {
        let mut params: Vec<(&str, &str)> = vec![("attribute", error.field.as_str())];
        params.extend(error.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let line = translator.trans_with(&format!("validation.{}", error.rule), &params);
        flash = flash.with_field_error(&error.field, line);
    }
    flash
}

// ============================================================================
// Company CRUD Handlers
// ============================================================================

/// GET /admin/companies - List all companies
pub async fn list_companies(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, ApiError> {
    require_superuser(&user)?;

    let app_state = state.read().await;
    let companies_service = CompaniesService::new(app_state.db.clone());

    let companies = companies_service.get_all_companies().await?;

    Ok(View::new("companies/index")
        .with("companies", companies)
        .with_flash(flash)
        .into_response())
}

/// GET /admin/companies/create - Form for a new company
pub async fn new_company_form(
    user: AuthedUser,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, ApiError> {
    require_superuser(&user)?;

    Ok(View::new("companies/edit")
        .with("item", Company::default())
        .with_flash(flash)
        .into_response())
}

/// POST /admin/companies - Save a new company
pub async fn create_company(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    headers: HeaderMap,
    Form(form): Form<CompanyForm>,
) -> Result<Response, ApiError> {
    require_superuser(&user)?;

    let app_state = state.read().await;
    let companies_service = CompaniesService::new(app_state.db.clone());
    let translator = &app_state.translator;

    let mut company = Company::new(form.name.trim());

    match companies_service.save(&mut company).await {
        Ok(()) => Ok(to_index(Flash::success(message(translator, "create.success")))),
        Err(StoreError::Invalid(validation)) => {
            info!(user_id = %user.id, errors = validation.errors.len(), "Company rejected by validation");
            let flash = with_validation_errors(
                Flash::default().with_input("name", &form.name),
                translator,
                &validation,
            );
            Ok(FlashRedirect::to(back_url(&headers, CREATE_URL), flash).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /admin/companies/:id - Company detail page
pub async fn show_company(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(company_id): Path<String>,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, ApiError> {
    authorize(&user, COMPANIES_VIEW)?;

    let app_state = state.read().await;
    let companies_service = CompaniesService::new(app_state.db.clone());

    let Some(company) = companies_service.find_by_raw_id(&company_id).await? else {
        return Ok(to_index(Flash::error(message(&app_state.translator, "not_found"))));
    };

    let (users_count, assets_count) = match company.id {
        Some(id) => companies_service.count_dependents(id).await?,
        None => (0, 0),
    };

    Ok(View::new("companies/view")
        .with(
            "company",
            CompanyDetails {
                company,
                users_count,
                assets_count,
            },
        )
        .with_flash(flash)
        .into_response())
}

/// GET /admin/companies/:id/edit - Form for an existing company
pub async fn edit_company_form(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(company_id): Path<String>,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, ApiError> {
    require_superuser(&user)?;

    let app_state = state.read().await;
    let companies_service = CompaniesService::new(app_state.db.clone());

    let Some(item) = companies_service.find_by_raw_id(&company_id).await? else {
        return Ok(to_index(Flash::error(message(
            &app_state.translator,
            "does_not_exist",
        ))));
    };

    Ok(View::new("companies/edit")
        .with("item", item)
        .with_flash(flash)
        .into_response())
}

/// PUT /admin/companies/:id - Rename a company
pub async fn update_company(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(company_id): Path<String>,
    Form(form): Form<CompanyForm>,
) -> Result<Response, ApiError> {
    require_superuser(&user)?;

    let app_state = state.read().await;
    let companies_service = CompaniesService::new(app_state.db.clone());
    let translator = &app_state.translator;

    let Some(mut company) = companies_service.find_by_raw_id(&company_id).await? else {
        return Ok(to_index(Flash::error(message(translator, "does_not_exist"))));
    };

    company.name = form.name.trim().to_string();

    match companies_service.save(&mut company).await {
        Ok(()) => Ok(to_index(Flash::success(message(translator, "update.success")))),
        Err(StoreError::Invalid(validation)) => {
            info!(company_id = %company_id, errors = validation.errors.len(), "Company update rejected by validation");
            Ok(FlashRedirect::to(
                edit_url(&company_id),
                Flash::error(message(translator, "update.error")),
            )
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// DELETE /admin/companies/:id - Delete a company
pub async fn delete_company(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(company_id): Path<String>,
) -> Result<Response, ApiError> {
    require_superuser(&user)?;

    let app_state = state.read().await;
    let companies_service = CompaniesService::new(app_state.db.clone());
    let translator = &app_state.translator;

    let Some(id) = companies_service
        .find_by_raw_id(&company_id)
        .await?
        .and_then(|c| c.id)
    else {
        return Ok(to_index(Flash::error(message(translator, "not_found"))));
    };

    match companies_service.delete(id).await {
        Ok(()) => Ok(to_index(Flash::success(message(translator, "delete.success")))),
        Err(StoreError::ReferencedByDependents) => {
            warn!(company_id = id, "Company still referenced, delete refused");
            Ok(to_index(Flash::error(message(translator, "assoc_users"))))
        }
        Err(e) => Err(e.into()),
    }
}
