//! # Integration Tests for intake-api
//!
//! Exercises the full router with `tower::ServiceExt::oneshot`: schema
//! endpoint, submission create/list/update/delete, validation failure
//! bodies, CSV export, health probes, and the 404 fallback.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use intake_api::state::AppState;

/// Helper: build the test app with the embedded default schema and no
/// database.
fn test_app() -> axum::Router {
    intake_api::app(AppState::new())
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

/// Helper: a JSON request.
fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A payload that satisfies every rule of the embedded onboarding form.
fn valid_payload() -> Value {
    json!({
        "fullName": "Jane Doe",
        "email": "jane.doe@example.com",
        "department": "engineering",
        "yearsExperience": 7,
        "startDate": "2024-03-01",
        "skills": ["rust", "sql"],
        "bio": "Backend engineer.",
        "remoteWork": true
    })
}

/// Helper: create one submission and return its id.
async fn create_submission(app: &axum::Router, payload: Value) -> String {
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/rest/v1/submissions", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    body["id"].as_str().unwrap().to_string()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health/liveness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe_without_db() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health/readiness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Form Schema --------------------------------------------------------------

#[tokio::test]
async fn test_get_form_schema() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/rest/v1/form-schema")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["schema"]["title"], json!("Employee Onboarding"));
    let fields = body["schema"]["fields"].as_array().unwrap();
    assert_eq!(fields[0]["name"], json!("fullName"));
    assert_eq!(fields[0]["type"], json!("text"));
}

// -- Create -------------------------------------------------------------------

#[tokio::test]
async fn test_create_valid_submission() {
    let app = test_app();
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/rest/v1/submissions",
            valid_payload(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert!(body["id"].as_str().unwrap().parse::<uuid::Uuid>().is_ok());
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_invalid_submission_returns_field_errors() {
    let app = test_app();
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/rest/v1/submissions",
            json!({
                "fullName": "J",
                "email": "not-an-email",
                "yearsExperience": 99
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["errors"]["fullName"],
        json!("Full Name must be at least 2 characters")
    );
    assert_eq!(body["errors"]["email"], json!("Work Email is invalid"));
    assert_eq!(
        body["errors"]["department"],
        json!("Department is required")
    );
    assert_eq!(
        body["errors"]["yearsExperience"],
        json!("Years of Experience must be at most 50")
    );
    assert_eq!(
        body["errors"]["skills"],
        json!("Skills requires at least one selection")
    );
}

#[tokio::test]
async fn test_create_rejects_non_object_payload() {
    let app = test_app();
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/rest/v1/submissions",
            json!([1, 2, 3]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_create_against_empty_schema_reports_schema_error() {
    let schema = serde_json::from_value(json!({ "title": "Empty", "fields": [] })).unwrap();
    let app = intake_api::app(AppState::with_schema(schema));
    let response = app
        .oneshot(json_request(Method::POST, "/rest/v1/submissions", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["errors"]["_schema"],
        json!("Schema not configured. Please provide form fields.")
    );
}

// -- List ---------------------------------------------------------------------

#[tokio::test]
async fn test_list_pagination() {
    let app = test_app();
    for i in 0..5 {
        let mut payload = valid_payload();
        payload["fullName"] = json!(format!("Person {i}"));
        create_submission(&app, payload).await;
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/rest/v1/submissions?page=2&limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["page"], json!(2));
    assert_eq!(body["limit"], json!(2));
    assert_eq!(body["total"], json!(5));
    assert_eq!(body["totalPages"], json!(3));
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_defaults_and_bad_params_fall_back() {
    let app = test_app();
    create_submission(&app, valid_payload()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/rest/v1/submissions?page=zero&limit=-3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["page"], json!(1));
    assert_eq!(body["limit"], json!(10));
}

#[tokio::test]
async fn test_list_empty_store() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/rest/v1/submissions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], json!(0));
    assert_eq!(body["totalPages"], json!(1));
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_list_search_filters_case_insensitively() {
    let app = test_app();
    let mut a = valid_payload();
    a["fullName"] = json!("Ada Lovelace");
    create_submission(&app, a).await;
    let mut b = valid_payload();
    b["fullName"] = json!("Grace Hopper");
    create_submission(&app, b).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/rest/v1/submissions?search=LOVELACE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["data"][0]["data"]["fullName"], json!("Ada Lovelace"));
}

// -- Update -------------------------------------------------------------------

#[tokio::test]
async fn test_update_submission() {
    let app = test_app();
    let id = create_submission(&app, valid_payload()).await;

    let mut payload = valid_payload();
    payload["department"] = json!("design");
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/rest/v1/submissions/{id}"),
            payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["id"], json!(id));
    assert_eq!(body["data"]["department"], json!("design"));
}

#[tokio::test]
async fn test_update_invalid_payload_rejected() {
    let app = test_app();
    let id = create_submission(&app, valid_payload()).await;

    let mut payload = valid_payload();
    payload["startDate"] = json!("2019-06-01");
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/rest/v1/submissions/{id}"),
            payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["errors"]["startDate"],
        json!("Start Date must be on or after 2020-01-01")
    );
}

#[tokio::test]
async fn test_update_missing_submission_is_404() {
    let app = test_app();
    let id = uuid::Uuid::new_v4();
    let response = app
        .oneshot(json_request(
            Method::PUT,
            &format!("/rest/v1/submissions/{id}"),
            valid_payload(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], json!("Submission not found"));
}

#[tokio::test]
async fn test_update_malformed_id_is_400() {
    let app = test_app();
    let response = app
        .oneshot(json_request(
            Method::PUT,
            "/rest/v1/submissions/not-a-uuid",
            valid_payload(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], json!("Invalid submission id"));
}

// -- Delete -------------------------------------------------------------------

#[tokio::test]
async fn test_delete_submission() {
    let app = test_app();
    let id = create_submission(&app, valid_payload()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/rest/v1/submissions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone afterwards.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/rest/v1/submissions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- CSV Export ---------------------------------------------------------------

#[tokio::test]
async fn test_export_csv() {
    let app = test_app();
    create_submission(&app, valid_payload()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/rest/v1/submissions/export")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"submissions.csv\""
    );

    let body = body_string(response).await;
    let mut lines = body.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,createdAt,fullName,email,department,yearsExperience,startDate,skills,bio,remoteWork"
    );
    let row = lines.next().unwrap();
    assert!(row.contains("Jane Doe"));
    assert!(row.contains("rust|sql"));
    assert!(row.contains("true"));
}

#[tokio::test]
async fn test_export_csv_empty_store_is_header_only() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/rest/v1/submissions/export")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_string(response).await;
    assert_eq!(body.lines().count(), 1);
}

// -- Rate Limiting ------------------------------------------------------------

#[tokio::test]
async fn test_rate_limit_exhaustion_returns_429_with_message() {
    use intake_api::middleware::rate_limit::RateLimitConfig;

    let app = intake_api::app_with_rate_limit(
        AppState::new(),
        RateLimitConfig {
            max_requests: 2,
            window_secs: 60,
        },
    );

    let get_schema = |forwarded_for: &str| {
        Request::builder()
            .uri("/rest/v1/form-schema")
            .header("x-forwarded-for", forwarded_for)
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(get_schema("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Budget spent; the same first hop behind a proxy chain shares it.
    let response = app
        .clone()
        .oneshot(get_schema("10.0.0.1, 172.16.0.9"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["message"],
        json!("Too many requests, please try again later.")
    );

    // A different client has its own budget.
    let response = app.clone().oneshot(get_schema("10.0.0.2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- OpenAPI & Fallback -------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_served() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/rest/v1/submissions"].is_object());
}

#[tokio::test]
async fn test_unknown_route_falls_back_to_404() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/rest/v1/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Not Found"));
}
