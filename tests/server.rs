//! HTTP envelope and status mapping

#![cfg(feature = "server")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use menurbac::server::router;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_menu_roundtrip_over_http() {
    let f = common::setup();
    let app = router(Arc::new(f.rbac));

    let res = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_request("POST", "/menus", json!({ "code": "system", "name": "System", "status": "enabled" })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], 1);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/menus",
            json!({ "code": "menu", "name": "Menus", "parent_id": 1, "type": "button", "status": "enabled" }),
        ))
        .await
        .unwrap();
    let body = read_json(res).await;
    assert_eq!(body["data"]["parent_path"], "1.");
    assert_eq!(body["data"]["type"], "button");

    let res = app.clone().oneshot(get("/menus/tree")).await.unwrap();
    let body = read_json(res).await;
    assert_eq!(body["data"][0]["children"][0]["code"], "menu");

    let res = app.clone().oneshot(get("/menus?parent_id=1&page=1&page_size=10")).await.unwrap();
    let body = read_json(res).await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn test_errors_carry_reason_and_status() {
    let f = common::setup();
    let app = router(Arc::new(f.rbac));

    let res = app.clone().oneshot(get("/menus/9")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = read_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["reason"], "not_found");

    let res = app
        .clone()
        .oneshot(json_request("POST", "/users", json!({ "username": "a", "name": "A", "email": "nope", "status": "activated" })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(res).await["error"]["reason"], "invalid_input");

    app.clone()
        .oneshot(json_request("POST", "/menus", json!({ "code": "a", "name": "A", "status": "enabled" })))
        .await
        .unwrap();
    app.clone()
        .oneshot(json_request("POST", "/menus", json!({ "code": "b", "name": "B", "parent_id": 1, "status": "enabled" })))
        .await
        .unwrap();
    let res = app
        .clone()
        .oneshot(Request::builder().method("DELETE").uri("/menus/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(res).await["error"]["reason"], "precondition_failed");
}

#[tokio::test]
async fn test_user_menus_endpoint() {
    let f = common::setup();
    let app = router(Arc::new(f.rbac));

    app.clone()
        .oneshot(json_request("POST", "/menus", json!({ "code": "home", "name": "Home", "status": "enabled" })))
        .await
        .unwrap();
    app.clone()
        .oneshot(json_request("POST", "/roles", json!({ "code": "r", "name": "R", "menus": [1] })))
        .await
        .unwrap();
    app.clone()
        .oneshot(json_request("POST", "/users", json!({ "username": "u", "name": "U", "roles": [1], "status": "activated" })))
        .await
        .unwrap();

    let res = app.clone().oneshot(get("/users/1/menus?status=enabled")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["data"][0]["code"], "home");

    let res = app.clone().oneshot(get("/roles/1/menus")).await.unwrap();
    assert_eq!(read_json(res).await["data"].as_array().map(Vec::len), Some(1));
}

async fn assert_invalid_input(res: Response) {
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["reason"], "invalid_input");
}

#[tokio::test]
async fn test_malformed_requests_use_the_envelope() {
    let f = common::setup();
    let app = router(Arc::new(f.rbac));

    // Unknown enum value
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/menus",
            json!({ "code": "a", "name": "A", "type": "folder", "status": "enabled" }),
        ))
        .await
        .unwrap();
    assert_invalid_input(res).await;

    // Truncated body
    let req = Request::builder()
        .method("POST")
        .uri("/menus")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"code": "#))
        .unwrap();
    assert_invalid_input(app.clone().oneshot(req).await.unwrap()).await;

    // Non-numeric ID
    assert_invalid_input(app.clone().oneshot(get("/menus/abc")).await.unwrap()).await;

    // Bad query value
    assert_invalid_input(app.clone().oneshot(get("/menus?status=maybe")).await.unwrap()).await;

    // Missing status
    let res = app
        .clone()
        .oneshot(json_request("POST", "/menus", json!({ "code": "a", "name": "A" })))
        .await
        .unwrap();
    assert_invalid_input(res).await;
}

#[tokio::test]
async fn test_menu_resources_over_http() {
    let f = common::setup();
    let app = router(Arc::new(f.rbac));

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/menus",
            json!({
                "code": "menu",
                "name": "Menus",
                "status": "enabled",
                "resources": [{ "method": "GET", "path": "/api/menus" }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(read_json(res).await["data"]["resources"][0]["method"], "GET");

    let res = app.clone().oneshot(get("/menus/1")).await.unwrap();
    assert_eq!(read_json(res).await["data"]["resources"][0]["path"], "/api/menus");

    let res = app.clone().oneshot(get("/menus")).await.unwrap();
    assert!(read_json(res).await["data"]["items"][0].get("resources").is_none());
    let res = app.clone().oneshot(get("/menus?include_resources=true")).await.unwrap();
    assert_eq!(read_json(res).await["data"]["items"][0]["resources"][0]["menu_id"], 1);
}
