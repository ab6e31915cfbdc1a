use super::handlers;
use axum::{routing::get, Router};

/// Creates the companies router with the admin resource routes
pub fn companies_routes() -> Router {
    Router::new()
        .route(
            "/admin/companies",
            get(handlers::list_companies).post(handlers::create_company),
        )
        .route("/admin/companies/create", get(handlers::new_company_form))
        .route(
            "/admin/companies/:id",
            get(handlers::show_company)
                .put(handlers::update_company)
                .patch(handlers::update_company)
                .delete(handlers::delete_company),
        )
        .route("/admin/companies/:id/edit", get(handlers::edit_company_form))
}
