//! Tests for companies module
//!
//! These tests verify core company functionality including:
//! - Company validation rules
//! - Store behavior (ids, uniqueness, referential integrity)
//! - The admin pages end to end through the router

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::app::build_router;
    use crate::common::dev_mode::DevModeConfig;
    use crate::common::flash::OLD_INPUT_MAX_CHARS;
    use crate::common::test_support::{
        dev_mode, insert_asset, insert_user, test_pool, test_state, token_for, TEST_JWT_SECRET,
    };
    use crate::common::{Flash, StoreError, Validator};
    use crate::logging_middleware::MAX_BODY_BYTES;
    use axum::body::Body;
    use axum::http::{
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, REFERER, SET_COOKIE},
        Request, StatusCode,
    };
    use axum::response::Response;
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    async fn admin_app() -> (Router, SqlitePool) {
        let pool = test_pool().await;
        let router = build_router(test_state(pool.clone(), dev_mode(true)), &[]);
        (router, pool)
    }

    async fn send(router: &Router, request: Request<Body>) -> Response {
        router.clone().oneshot(request).await.unwrap()
    }

    async fn get(router: &Router, uri: &str) -> Response {
        send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn submit(router: &Router, method: &str, uri: &str, name: &str) -> Response {
        let body = format!("name={}", urlencoding::encode(name));
        send(
            router,
            Request::builder()
                .method(method)
                .uri(uri)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    async fn delete(router: &Router, uri: &str) -> Response {
        send(
            router,
            Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap(),
        )
        .await
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[LOCATION].to_str().unwrap()
    }

    fn flash_of(response: &Response) -> Flash {
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        let value = cookie
            .strip_prefix("flash=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        Flash::decode(value).unwrap()
    }

    async fn company_count(pool: &SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    async fn seed_company(pool: &SqlitePool, name: &str) -> i64 {
        let service = services::CompaniesService::new(pool.clone());
        let mut company = models::Company::new(name);
        service.save(&mut company).await.unwrap();
        company.id.unwrap()
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    #[test]
    fn test_company_validation_success() {
        let company = models::Company::new("Valid Company");
        let result = company.validate(&company);
        assert!(result.is_valid, "Valid company should pass validation");
    }

    #[test]
    fn test_company_validation_blank_name() {
        for name in ["", "   "] {
            let company = models::Company::new(name);
            let result = company.validate(&company);
            assert!(!result.is_valid, "Blank name should fail validation");
            assert!(result.has_error("name", "required"));
        }
    }

    #[test]
    fn test_company_validation_name_length() {
        let company = models::Company::new("a".repeat(validators::NAME_MAX_LENGTH));
        assert!(company.validate(&company).is_valid);

        let company = models::Company::new("a".repeat(validators::NAME_MAX_LENGTH + 1));
        let result = company.validate(&company);
        assert!(result.has_error("name", "max.string"));
    }

    // ------------------------------------------------------------------------
    // Service
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_save_assigns_fresh_ids() {
        let pool = test_pool().await;
        let service = services::CompaniesService::new(pool.clone());

        let mut first = models::Company::new("Acme Corp");
        service.save(&mut first).await.unwrap();
        let mut second = models::Company::new("Globex");
        service.save(&mut second).await.unwrap();

        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
        assert!(first.created_at.is_some());

        let all = service.get_all_companies().await.unwrap();
        let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Acme Corp", "Globex"]);
    }

    #[tokio::test]
    async fn test_save_reports_duplicate_name_as_validation_error() {
        let pool = test_pool().await;
        let service = services::CompaniesService::new(pool.clone());
        seed_company(&pool, "Acme Corp").await;

        let mut duplicate = models::Company::new("Acme Corp");
        match service.save(&mut duplicate).await {
            Err(StoreError::Invalid(result)) => assert!(result.has_error("name", "unique")),
            other => panic!("expected validation failure, got {:?}", other),
        }
        assert_eq!(duplicate.id, None);
        assert_eq!(company_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_find_by_raw_id_handles_garbage() {
        let pool = test_pool().await;
        let service = services::CompaniesService::new(pool.clone());
        let id = seed_company(&pool, "Acme Corp").await;

        assert!(service.find_by_raw_id(&id.to_string()).await.unwrap().is_some());
        assert!(service.find_by_raw_id("abc").await.unwrap().is_none());
        assert!(service.find_by_raw_id("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_dependents() {
        let pool = test_pool().await;
        let service = services::CompaniesService::new(pool.clone());
        let id = seed_company(&pool, "Acme Corp").await;
        insert_user(&pool, "U_1", "worker@example.com", None, Some(id)).await;
        insert_asset(&pool, "TAG-1", Some(id)).await;

        assert_eq!(service.count_dependents(id).await.unwrap(), (1, 1));
        assert!(matches!(
            service.delete(id).await,
            Err(StoreError::ReferencedByDependents)
        ));
        assert!(service.find(id).await.unwrap().is_some());
    }

    // ------------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_company_lifecycle() {
        let (app, _pool) = admin_app().await;

        let res = submit(&app, "POST", "/admin/companies", "Acme Corp").await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/admin/companies");
        assert_eq!(
            flash_of(&res).success.as_deref(),
            Some("Company created successfully.")
        );

        let body = json_body(get(&app, "/admin/companies").await).await;
        assert_eq!(body["view"], "companies/index");
        assert_eq!(body["data"]["companies"][0]["id"], 1);
        assert_eq!(body["data"]["companies"][0]["name"], "Acme Corp");

        let res = submit(&app, "PUT", "/admin/companies/1", "Acme Corporation").await;
        assert_eq!(location(&res), "/admin/companies");
        assert_eq!(
            flash_of(&res).success.as_deref(),
            Some("Company updated successfully.")
        );

        let body = json_body(get(&app, "/admin/companies/1/edit").await).await;
        assert_eq!(body["view"], "companies/edit");
        assert_eq!(body["data"]["item"]["name"], "Acme Corporation");

        let res = delete(&app, "/admin/companies/1").await;
        assert_eq!(location(&res), "/admin/companies");
        assert_eq!(
            flash_of(&res).success.as_deref(),
            Some("The Company was deleted successfully.")
        );

        let res = get(&app, "/admin/companies/1/edit").await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(flash_of(&res).error.as_deref(), Some("Company does not exist."));
    }

    #[tokio::test]
    async fn test_create_form_renders_empty_company() {
        let (app, _pool) = admin_app().await;

        let body = json_body(get(&app, "/admin/companies/create").await).await;
        assert_eq!(body["view"], "companies/edit");
        assert_eq!(body["data"]["item"]["id"], Value::Null);
        assert_eq!(body["data"]["item"]["name"], "");
        assert_eq!(body["flash"], Value::Null);
    }

    #[tokio::test]
    async fn test_create_with_blank_name_redirects_back_with_errors() {
        let (app, pool) = admin_app().await;

        let res = submit(&app, "POST", "/admin/companies", "  ").await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/admin/companies/create");

        let flash = flash_of(&res);
        assert_eq!(flash.old.get("name").map(String::as_str), Some("  "));
        assert_eq!(
            flash.errors["name"],
            vec!["The name field is required.".to_string()]
        );
        assert_eq!(company_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_create_with_overlong_name_keeps_cookie_small() {
        let (app, pool) = admin_app().await;

        let res = submit(&app, "POST", "/admin/companies", &"a".repeat(3500)).await;
        assert_eq!(location(&res), "/admin/companies/create");

        let cookie_len = res.headers()[SET_COOKIE].len();
        assert!(cookie_len < 4096, "flash cookie is {} bytes", cookie_len);

        let flash = flash_of(&res);
        assert_eq!(flash.old["name"].len(), OLD_INPUT_MAX_CHARS);
        assert_eq!(
            flash.errors["name"],
            vec!["The name may not be greater than 255 characters.".to_string()]
        );
        assert_eq!(company_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let (app, pool) = admin_app().await;
        let body = format!("name={}", "a".repeat(MAX_BODY_BYTES));

        let res = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/admin/companies")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(company_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_create_duplicate_redirects_to_referer() {
        let (app, pool) = admin_app().await;
        seed_company(&pool, "Acme Corp").await;

        let res = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/admin/companies")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(REFERER, "http://localhost:8080/admin/companies/create?from=list")
                .body(Body::from("name=Acme+Corp"))
                .unwrap(),
        )
        .await;

        assert_eq!(location(&res), "/admin/companies/create?from=list");
        let flash = flash_of(&res);
        assert_eq!(
            flash.errors["name"],
            vec!["The name has already been taken.".to_string()]
        );
        assert_eq!(flash.old["name"], "Acme Corp");
        assert_eq!(company_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_form_view_replays_flash_and_clears_cookie() {
        let (app, _pool) = admin_app().await;
        let flash = Flash::default()
            .with_input("name", "Draft")
            .with_field_error("name", "The name has already been taken.".to_string());

        let res = send(
            &app,
            Request::builder()
                .uri("/admin/companies/create")
                .header(COOKIE, format!("flash={}", flash.encode()))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        let cookie = res.headers()[SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.contains("Max-Age=0"));

        let body = json_body(res).await;
        assert_eq!(body["data"]["old"]["name"], "Draft");
        assert_eq!(body["data"]["errors"]["name"][0], "The name has already been taken.");
    }

    #[tokio::test]
    async fn test_missing_company_outcomes() {
        let (app, pool) = admin_app().await;
        seed_company(&pool, "Acme Corp").await;

        for id in ["42", "not-a-number"] {
            let res = get(&app, &format!("/admin/companies/{}/edit", id)).await;
            assert_eq!(location(&res), "/admin/companies");
            assert_eq!(flash_of(&res).error.as_deref(), Some("Company does not exist."));

            let res = submit(&app, "PUT", &format!("/admin/companies/{}", id), "Other").await;
            assert_eq!(location(&res), "/admin/companies");
            assert_eq!(flash_of(&res).error.as_deref(), Some("Company does not exist."));

            let res = delete(&app, &format!("/admin/companies/{}", id)).await;
            assert_eq!(location(&res), "/admin/companies");
            assert_eq!(flash_of(&res).error.as_deref(), Some("Company not found."));

            let res = get(&app, &format!("/admin/companies/{}", id)).await;
            assert_eq!(location(&res), "/admin/companies");
            assert_eq!(flash_of(&res).error.as_deref(), Some("Company not found."));
        }

        let service = services::CompaniesService::new(pool.clone());
        let all = service.get_all_companies().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Acme Corp");
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let (app, pool) = admin_app().await;
        let id = seed_company(&pool, "Acme Corp").await;
        let uri = format!("/admin/companies/{}", id);

        for _ in 0..2 {
            let res = submit(&app, "PATCH", &uri, "Acme Corporation").await;
            assert_eq!(
                flash_of(&res).success.as_deref(),
                Some("Company updated successfully.")
            );
        }

        let body = json_body(get(&app, &format!("{}/edit", uri)).await).await;
        assert_eq!(body["data"]["item"]["name"], "Acme Corporation");
    }

    #[tokio::test]
    async fn test_invalid_update_redirects_to_edit_form() {
        let (app, pool) = admin_app().await;
        let id = seed_company(&pool, "Acme Corp").await;
        seed_company(&pool, "Globex").await;

        for bad_name in ["", "Globex"] {
            let res = submit(&app, "PUT", &format!("/admin/companies/{}", id), bad_name).await;
            assert_eq!(location(&res), format!("/admin/companies/{}/edit", id));
            assert_eq!(
                flash_of(&res).error.as_deref(),
                Some("Company was not updated, please try again.")
            );
        }

        let service = services::CompaniesService::new(pool.clone());
        assert_eq!(service.find(id).await.unwrap().unwrap().name, "Acme Corp");
    }

    #[tokio::test]
    async fn test_delete_with_dependents_keeps_company() {
        let (app, pool) = admin_app().await;
        let id = seed_company(&pool, "Acme Corp").await;
        insert_user(&pool, "U_1", "worker@example.com", None, Some(id)).await;

        let res = delete(&app, &format!("/admin/companies/{}", id)).await;
        assert_eq!(location(&res), "/admin/companies");
        let error = flash_of(&res).error.unwrap();
        assert!(error.starts_with("This company is currently associated"));
        assert_eq!(company_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_unclassified_delete_failure_is_server_error() {
        let (app, pool) = admin_app().await;
        let id = seed_company(&pool, "Acme Corp").await;
        sqlx::query(
            "CREATE TRIGGER block_company_delete BEFORE DELETE ON companies \
             BEGIN SELECT RAISE(ABORT, 'deletes are frozen'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let res = delete(&app, &format!("/admin/companies/{}", id)).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(res).await;
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert_eq!(company_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_show_renders_details_with_dependent_counts() {
        let (app, pool) = admin_app().await;
        let id = seed_company(&pool, "Acme Corp").await;
        insert_user(&pool, "U_1", "worker@example.com", None, Some(id)).await;
        insert_asset(&pool, "TAG-1", Some(id)).await;
        insert_asset(&pool, "TAG-2", Some(id)).await;

        let body = json_body(get(&app, &format!("/admin/companies/{}", id)).await).await;
        assert_eq!(body["view"], "companies/view");
        assert_eq!(body["data"]["company"]["name"], "Acme Corp");
        assert_eq!(body["data"]["company"]["users_count"], 1);
        assert_eq!(body["data"]["company"]["assets_count"], 2);
    }

    #[tokio::test]
    async fn test_show_without_view_permission_is_forbidden() {
        let pool = test_pool().await;
        let app = build_router(test_state(pool.clone(), dev_mode(false)), &[]);
        let id = seed_company(&pool, "Acme Corp").await;

        let res = get(&app, &format!("/admin/companies/{}", id)).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        // Denied before lookup: a missing id is still 403, not a not-found redirect
        let res = get(&app, "/admin/companies/999").await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(res.headers().get(LOCATION).is_none());
    }

    #[tokio::test]
    async fn test_viewer_token_can_show_but_not_list() {
        let pool = test_pool().await;
        let app = build_router(test_state(pool.clone(), DevModeConfig::default()), &[]);
        let id = seed_company(&pool, "Acme Corp").await;
        insert_user(&pool, "U_VIEW", "viewer@example.com", Some(r#"{"companies.view":"1"}"#), None).await;
        let bearer = format!("Bearer {}", token_for("U_VIEW", TEST_JWT_SECRET));

        let res = send(
            &app,
            Request::builder()
                .uri(format!("/admin/companies/{}", id))
                .header(AUTHORIZATION, &bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["view"], "companies/view");
        assert_eq!(body["data"]["company"]["name"], "Acme Corp");
        assert_eq!(body["data"]["company"]["users_count"], 0);

        let res = send(
            &app,
            Request::builder()
                .uri("/admin/companies")
                .header(AUTHORIZATION, &bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_non_superuser_cannot_manage_companies() {
        let pool = test_pool().await;
        let app = build_router(test_state(pool.clone(), dev_mode(false)), &[]);

        assert_eq!(get(&app, "/admin/companies").await.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            submit(&app, "POST", "/admin/companies", "Acme Corp").await.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(company_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_are_unauthorized() {
        let pool = test_pool().await;
        let app = build_router(
            test_state(pool, DevModeConfig::default()),
            &[],
        );

        let res = get(&app, "/admin/companies").await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get("x-request-id").is_some());
    }
}
