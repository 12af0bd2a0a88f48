//! Bearer-token extraction and role enforcement over the real router.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

use pagelift_api::auth::issue_token;
use pagelift_core::{UserCredentials, UserRole};

fn token_for_role(role: UserRole) -> String {
    let user = UserCredentials {
        id: Uuid::new_v4(),
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        password_hash: String::new(),
        role,
    };
    issue_token(common::TEST_JWT_SECRET, &user).expect("token")
}

#[tokio::test]
async fn missing_authorization_header_is_401_no_token() {
    let app = common::test_app();
    let response = app
        .oneshot(
            Request::get("/api/admin/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NO_TOKEN");
}

#[tokio::test]
async fn non_bearer_header_is_401_invalid_format() {
    let app = common::test_app();
    let response = app
        .oneshot(
            Request::get("/api/admin/users")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN_FORMAT");
}

#[tokio::test]
async fn garbage_token_is_401_invalid_token() {
    let app = common::test_app();
    let response = app
        .oneshot(
            Request::get("/api/auth/verify")
                .header(header::AUTHORIZATION, "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn valid_token_passes_verify() {
    let app = common::test_app();
    let token = token_for_role(UserRole::Viewer);
    let response = app
        .oneshot(
            Request::get("/api/auth/verify")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["user"]["email"], "test@example.com");
}

#[tokio::test]
async fn viewer_cannot_create_landing_page() {
    let app = common::test_app();
    let token = token_for_role(UserRole::Viewer);
    let response = app
        .oneshot(
            Request::post("/api/admin/landing-pages")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"title": "T", "slug": "t"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = common::body_json(response).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn editor_create_with_invalid_slug_is_validation_error() {
    // Role check passes; validation rejects before any database work.
    let app = common::test_app();
    let token = token_for_role(UserRole::Editor);
    let response = app
        .oneshot(
            Request::post("/api/admin/landing-pages")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"title": "T", "slug": "Not A Slug"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let details = body["error"]["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d["field"] == "slug"));
}

#[tokio::test]
async fn login_without_fields_is_validation_error() {
    let app = common::test_app();
    let response = app
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let details = body["error"]["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);
}

#[tokio::test]
async fn login_with_malformed_email_is_validation_error() {
    let app = common::test_app();
    let response = app
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"email": "not-an-email", "password": "x"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"]["message"], "Invalid email format");
}

#[tokio::test]
async fn linkedin_authorize_unconfigured_is_503() {
    let app = common::test_app();
    let token = token_for_role(UserRole::Admin);
    let response = app
        .oneshot(
            Request::get("/api/admin/linkedin/oauth/authorize")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = common::body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_CONFIGURED");
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = common::test_app();
    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn responses_carry_request_id_header() {
    let app = common::test_app();
    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header present")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(request_id.len(), 36, "UUID-shaped correlation id");
}
