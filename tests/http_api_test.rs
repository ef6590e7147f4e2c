mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;
use warung_api::app_router;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::spawn().await;
    let router = app_router(app.state.clone());

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = TestApp::spawn().await;
    let router = app_router(app.state.clone());

    let response = router
        .clone()
        .oneshot(Request::get("/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .oneshot(
            Request::get("/cart")
                .header(header::AUTHORIZATION, "Bearer garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_validates_the_payload() {
    let app = TestApp::spawn().await;
    let router = app_router(app.state.clone());

    let response = router
        .oneshot(json_request(
            "POST",
            "/auth/register",
            None,
            json!({ "name": "A", "email": "not-an-email", "password": "a strong password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_over_http_returns_a_receipt() {
    let app = TestApp::spawn().await;
    let product = app.insert_product("Burger Spesial", 25_000, Some(15_000)).await;
    let router = app_router(app.state.clone());

    // Register over the wire and reuse the returned token.
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            None,
            json!({ "name": "Siti", "email": "siti@example.com", "password": "a strong password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let token = body["data"]["auth"]["token"].as_str().unwrap().to_string();

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/checkout",
            Some(&token),
            json!({
                "product_id": product,
                "qty": 2,
                "payment_method": "cash",
                "delivery_method": "delivery",
                "address": "Jl. Veteran 10"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 35_000);

    let response = router
        .oneshot(
            Request::get("/orders?status=processing")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn payment_status_body_is_not_enveloped() {
    let app = TestApp::spawn().await;
    let product = app.insert_product("Es Teh", 5_000, None).await;
    let user = app.register_user("poll@example.com").await;
    let token = {
        let profile = app.find_user(user).await.unwrap();
        app.state.services.auth.issue_token(&profile).unwrap().token
    };
    let order_id = app
        .state
        .services
        .orders
        .checkout(
            user,
            warung_api::services::orders::CheckoutInput {
                product_id: product,
                qty: 1,
                payment_method: warung_api::services::orders::PaymentMethod::Cash,
                delivery_method: warung_api::services::orders::DeliveryMethod::Pickup,
                address: None,
                note: None,
            },
        )
        .await
        .unwrap()
        .id;

    let router = app_router(app.state.clone());
    let response = router
        .oneshot(
            Request::get(format!("/payments/{}/status", order_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Polling clients read {paid, status} at the top level.
    let body = body_json(response).await;
    assert_eq!(body["paid"], false);
    assert_eq!(body["status"], "pending");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn unknown_status_filter_is_a_bad_request() {
    let app = TestApp::spawn().await;
    let user = app.register_user("f@example.com").await;
    let token = {
        let profile = app.find_user(user).await.unwrap();
        app.state.services.auth.issue_token(&profile).unwrap().token
    };
    let router = app_router(app.state.clone());

    let response = router
        .oneshot(
            Request::get("/orders?status=bogus")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_and_addresses_are_reachable_with_a_token() {
    let app = TestApp::spawn().await;
    let user = app.register_user("siti@example.com").await;
    let token = {
        let profile = app.find_user(user).await.unwrap();
        app.state.services.auth.issue_token(&profile).unwrap().token
    };
    let router = app_router(app.state.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/users/me",
            Some(&token),
            json!({ "name": "Siti Rahayu", "phone": "0812345678" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["name"], "Siti Rahayu");
    assert_eq!(body["data"]["user"]["phone"], "0812345678");

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/addresses",
            Some(&token),
            json!({ "title": "Rumah", "detail": "Jl. Veteran 10" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(
            Request::get("/addresses")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["is_primary"], true);
}

#[tokio::test]
async fn catalog_is_public() {
    let app = TestApp::spawn().await;
    app.insert_product("Nasi Pecel", 25_000, None).await;
    let router = app_router(app.state.clone());

    let response = router
        .oneshot(
            Request::get("/products?category=Semua&q=pecel")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
