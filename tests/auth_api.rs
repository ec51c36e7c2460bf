#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::TestContext;
use drinkquick_backend::entities::UserRole;
use serde_json::{Value, json};

#[actix_web::test]
async fn register_login_and_me() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "barkeep",
            "email": "Barkeep@Example.com",
            "password": "Password123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["role"], "Staff");
    assert_eq!(body["data"]["user"]["email"], "barkeep@example.com");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"login": "barkeep@example.com", "password": "Password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();
    let refresh = body["data"]["refreshToken"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {access}")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["username"], "barkeep");

    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({"refreshToken": refresh}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn duplicate_username_is_rejected() {
    let ctx = TestContext::new();
    ctx.user("barkeep", UserRole::Staff).await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "barkeep",
            "email": "someone@example.com",
            "password": "Password123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn only_administrators_change_roles() {
    let ctx = TestContext::new();
    let (staff, staff_token) = ctx.user("barkeep", UserRole::Staff).await;
    let (admin, admin_token) = ctx.user("root", UserRole::Administrator).await;
    let app = init_app!(ctx);

    let req = test::TestRequest::put()
        .uri(&format!("/api/users/{}/role", staff.id))
        .insert_header(("Authorization", staff_token))
        .set_json(json!({"role": "Manager"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/users/{}/role", staff.id))
        .insert_header(("Authorization", admin_token.clone()))
        .set_json(json!({"role": "Manager"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["role"], "Manager");

    let req = test::TestRequest::put()
        .uri(&format!("/api/users/{}/active", admin.id))
        .insert_header(("Authorization", admin_token))
        .set_json(json!({"active": false}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
