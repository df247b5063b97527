//! Integration tests for the query endpoints.
//!
//! The lifecycle runs against an in-memory gateway so each test can check
//! both the HTTP response and how many sessions were created and deleted.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get, post_form, post_json, FakeGateway};
use serde_json::json;

const ROWS: &str = r#"[{"platform":"web","total_units_sold":120,"transaction_count":7},{"platform":"mobile","total_units_sold":80,"transaction_count":4}]"#;

#[tokio::test]
async fn list_queries_returns_catalog() {
    let app = common::build_test_app(Arc::new(FakeGateway::returning("[]")));
    let json = body_json(get(app, "/api/v1/queries").await).await;

    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["platform_exposure", "category_performance"]);
    assert!(json["data"][0]["description"].is_string());
}

#[tokio::test]
async fn run_query_returns_rows_and_deletes_session() {
    let gateway = Arc::new(FakeGateway::returning(ROWS));
    let app = common::build_test_app(gateway.clone());

    let response = post_json(app, "/api/v1/queries/run", json!({"query": "platform_exposure"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["query"], "platform_exposure");
    assert_eq!(json["data"]["row_count"], 2);
    assert_eq!(json["data"]["rows"][0]["platform"], "web");
    assert_eq!(json["data"]["rows"][1]["total_units_sold"], 80);

    assert_eq!(gateway.created(), 1);
    assert_eq!(gateway.deleted(), vec![100]);
    assert_eq!(gateway.submitted().len(), 1);
    assert!(gateway.submitted()[0].contains("platform"));
}

#[tokio::test]
async fn run_query_preserves_column_order() {
    let gateway = Arc::new(FakeGateway::returning(ROWS));
    let app = common::build_test_app(gateway);

    let response = post_json(app, "/api/v1/queries/run", json!({"query": "platform_exposure"})).await;
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    let platform = text.find("\"platform\"").unwrap();
    let units = text.find("\"total_units_sold\"").unwrap();
    let count = text.find("\"transaction_count\"").unwrap();
    assert!(platform < units && units < count);
}

#[tokio::test]
async fn unknown_query_is_rejected_without_a_session() {
    let gateway = Arc::new(FakeGateway::returning(ROWS));
    let app = common::build_test_app(gateway.clone());

    let response = post_json(app, "/api/v1/queries/run", json!({"query": "drop_tables"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNKNOWN_QUERY");
    assert!(json["error"].as_str().unwrap().contains("drop_tables"));
    assert_eq!(gateway.created(), 0);
    assert!(gateway.deleted().is_empty());
}

#[tokio::test]
async fn blank_query_is_a_bad_request_without_a_session() {
    let gateway = Arc::new(FakeGateway::returning(ROWS));

    let response = post_json(
        common::build_test_app(gateway.clone()),
        "/api/v1/queries/run",
        json!({"query": "   "}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "query is required");

    // Form submitted without the field at all.
    let response = post_form(common::build_test_app(gateway.clone()), "/run_job", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    assert_eq!(gateway.created(), 0);
}

#[tokio::test]
async fn run_job_form_returns_result_envelope() {
    let gateway = Arc::new(FakeGateway::returning(ROWS));
    let app = common::build_test_app(gateway.clone());

    let response = post_form(app, "/run_job", "query=platform_exposure").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["result"].as_array().unwrap().len(), 2);
    assert_eq!(json["result"][0]["transaction_count"], 7);
    assert_eq!(gateway.deleted().len(), 1);
}

#[tokio::test]
async fn run_job_with_empty_result_returns_empty_array() {
    let app = common::build_test_app(Arc::new(FakeGateway::returning("[]\n")));

    let json = body_json(post_form(app, "/run_job", "query=category_performance").await).await;

    assert_eq!(json, json!({"result": []}));
}

#[tokio::test]
async fn engine_failure_maps_to_execution_error() {
    let gateway = Arc::new(FakeGateway::failing("Path does not exist"));
    let app = common::build_test_app(gateway.clone());

    let response = post_form(app, "/run_job", "query=category_performance").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "EXECUTION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("Path does not exist"));
    assert_eq!(gateway.deleted().len(), 1);
}

#[tokio::test]
async fn malformed_output_maps_to_bad_gateway() {
    let gateway = Arc::new(FakeGateway::returning("not json at all"));
    let app = common::build_test_app(gateway.clone());

    let response = post_json(app, "/api/v1/queries/run", json!({"query": "platform_exposure"})).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "MALFORMED_RESULT");
    assert_eq!(gateway.deleted().len(), 1);
}

#[tokio::test]
async fn session_that_never_starts_times_out() {
    let mut gateway = FakeGateway::returning(ROWS);
    gateway.session_state = "starting";
    let gateway = Arc::new(gateway);
    let app = common::build_test_app(gateway.clone());

    let response = post_json(app, "/api/v1/queries/run", json!({"query": "platform_exposure"})).await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body_json(response).await["code"], "SESSION_START_TIMEOUT");
    assert!(gateway.submitted().is_empty());
    assert_eq!(gateway.deleted().len(), 1);
}

#[tokio::test]
async fn statement_that_never_finishes_times_out() {
    let gateway = Arc::new(FakeGateway::with_statement(
        json!({"id": 0, "state": "running", "output": null}),
    ));
    let app = common::build_test_app(gateway.clone());

    let response = post_form(app, "/run_job", "query=platform_exposure").await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body_json(response).await["code"], "EXECUTION_TIMEOUT");
    assert_eq!(gateway.deleted().len(), 1);
}
