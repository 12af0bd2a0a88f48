//! Public lead-capture pipeline: gate checks that run before any row is
//! written.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

fn capture_request(body: serde_json::Value) -> Request<Body> {
    Request::post("/api/public/leads")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn honeypot_submission_is_rejected_as_spam() {
    let app = common::test_app();
    let response = app
        .oneshot(capture_request(serde_json::json!({
            "landing_page_id": "00000000-0000-0000-0000-000000000000",
            "email": "bot@example.com",
            "website": "https://spam.example.com"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"]["code"], "SPAM_DETECTED");
}

#[tokio::test]
async fn whitespace_honeypot_is_not_spam() {
    // A browser autofilling whitespace should not be treated as a bot; the
    // request then fails on the missing page, not on spam detection.
    let app = common::test_app();
    let response = app
        .oneshot(capture_request(serde_json::json!({
            "website": "   "
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_landing_page_id_is_validation_error() {
    let app = common::test_app();
    let response = app
        .oneshot(capture_request(serde_json::json!({
            "email": "visitor@example.com"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let details = body["error"]["details"].as_array().unwrap();
    assert_eq!(details[0]["field"], "landing_page_id");
}

#[tokio::test]
async fn lead_capture_allows_any_origin() {
    let app = common::test_app();
    let response = app
        .oneshot(
            Request::options("/api/public/leads")
                .header(header::ORIGIN, "https://some-landing-site.example")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .expect("public CORS header present");
    assert_eq!(allow_origin, "*");
}

#[tokio::test]
async fn admin_routes_do_not_allow_arbitrary_origins() {
    let app = common::test_app();
    let response = app
        .oneshot(
            Request::options("/api/admin/leads")
                .header(header::ORIGIN, "https://evil.example")
                .header("access-control-request-method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let allow_origin = response.headers().get("access-control-allow-origin");
    assert!(
        allow_origin.is_none(),
        "unlisted origin must not be allowed on admin routes"
    );
}
