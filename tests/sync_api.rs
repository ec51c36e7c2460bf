#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::TestContext;
use drinkquick_backend::entities::UserRole;
use serde_json::{Value, json};

const CLIENT_EDIT: &str = "2020-01-01T10:00:00Z";

#[actix_web::test]
async fn every_record_lands_in_exactly_one_bucket() {
    let ctx = TestContext::new();
    let (owner, token) = ctx.user("till", UserRole::Staff).await;
    let pils = ctx.drink(&owner, "Pils", 500).await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/orders/sync/bulk")
        .insert_header(("Authorization", token))
        .set_json(json!({"orders": [
            {"localId": "till-1", "items": [{"drink": pils.id, "quantity": 1}], "amountPaid": 500},
            {"localId": "till-2", "amountPaid": 500},
            {"localId": "till-3", "items": [{"drink": 999, "quantity": 1}], "amountPaid": 500},
        ]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let result = &body["data"];

    assert_eq!(result["created"].as_array().unwrap().len(), 1);
    assert_eq!(result["updated"].as_array().unwrap().len(), 0);
    assert_eq!(result["conflicts"].as_array().unwrap().len(), 0);
    assert_eq!(result["errors"].as_array().unwrap().len(), 2);

    assert_eq!(result["created"][0]["order"]["syncStatus"], "synced");
    assert_eq!(result["errors"][0]["index"], 1);
    assert_eq!(result["errors"][0]["localId"], "till-2");
    assert_eq!(result["errors"][1]["code"], "NOT_FOUND");
}

#[actix_web::test]
async fn stale_client_edit_conflicts_until_resolved() {
    let ctx = TestContext::new();
    let (owner, token) = ctx.user("till", UserRole::Staff).await;
    let pils = ctx.drink(&owner, "Pils", 500).await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/orders/sync/bulk")
        .insert_header(("Authorization", token.clone()))
        .set_json(json!({"orders": [{
            "localId": "till-7",
            "items": [{"drink": pils.id, "quantity": 1}],
            "amountPaid": 500,
            "updatedAt": CLIENT_EDIT,
        }]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = body["data"]["created"][0]["order"]["id"].as_i64().unwrap();

    // the server copy moves on while the till is offline
    let req = test::TestRequest::put()
        .uri(&format!("/api/orders/{id}"))
        .insert_header(("Authorization", token.clone()))
        .set_json(json!({"notes": "edited at the bar"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/orders/sync/bulk")
        .insert_header(("Authorization", token.clone()))
        .set_json(json!({"orders": [{
            "localId": "till-7",
            "items": [{"drink": pils.id, "quantity": 2}],
            "amountPaid": 1000,
            "updatedAt": CLIENT_EDIT,
        }]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let conflicts = body["data"]["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["orderId"], id);
    assert_eq!(conflicts[0]["serverOrder"]["totalAmount"], 500);
    assert_eq!(conflicts[0]["serverOrder"]["notes"], "edited at the bar");

    let req = test::TestRequest::post()
        .uri("/api/orders/sync/resolve-conflicts")
        .insert_header(("Authorization", token))
        .set_json(json!({"resolutions": [{
            "orderId": id,
            "resolution": "use_client",
            "data": {"items": [{"drink": pils.id, "quantity": 2}], "amountPaid": 1000},
        }]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let resolved = &body["data"]["resolved"][0];
    assert_eq!(resolved["resolution"], "use_client");
    assert_eq!(resolved["order"]["totalAmount"], 1000);
    assert_eq!(resolved["order"]["syncStatus"], "synced");
    assert!(body["data"]["errors"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn resubmitting_the_same_record_is_idempotent() {
    let ctx = TestContext::new();
    let (owner, token) = ctx.user("till", UserRole::Staff).await;
    let pils = ctx.drink(&owner, "Pils", 500).await;
    let app = init_app!(ctx);

    let record = json!({
        "localId": "till-9",
        "items": [{"drink": pils.id, "quantity": 1}],
        "amountPaid": 500,
        "updatedAt": CLIENT_EDIT,
    });
    let mut first = Value::Null;
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/orders/sync/bulk")
            .insert_header(("Authorization", token.clone()))
            .set_json(json!({"orders": [record.clone()]}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        if first.is_null() {
            first = body["data"]["created"][0]["order"].clone();
        } else {
            let again = &body["data"]["updated"][0]["order"];
            assert_eq!(again["id"], first["id"]);
            assert_eq!(again["updatedAt"], first["updatedAt"]);
            assert_eq!(again["lastSyncedAt"], first["lastSyncedAt"]);
        }
    }

    let req = test::TestRequest::get()
        .uri("/api/orders")
        .insert_header(("Authorization", token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 1);
}

#[actix_web::test]
async fn pending_orders_clear_once_marked_synced() {
    let ctx = TestContext::new();
    let (owner, token) = ctx.user("till", UserRole::Staff).await;
    let pils = ctx.drink(&owner, "Pils", 500).await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/orders")
        .insert_header(("Authorization", token.clone()))
        .set_json(json!({"items": [{"drink": pils.id, "quantity": 1}], "amountPaid": 500}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri("/api/orders/sync/pending")
        .insert_header(("Authorization", token.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri("/api/orders/sync/mark-synced")
        .insert_header(("Authorization", token.clone()))
        .set_json(json!({"orderIds": [id, 424242]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["modified"], 1);

    let req = test::TestRequest::get()
        .uri("/api/orders/sync/pending")
        .insert_header(("Authorization", token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}
