use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::db::{DbPool, PgAlertSink};
use crate::models::alert::CanonicalAlert;
use crate::processor::alert_processor;
use crate::processor::decode::{self, FieldMap};
use crate::processor::IngestError;
use crate::sink::AlertSink;

// Client-facing names of the two required fields, echoed verbatim in every
// validation rejection so a sender can fix its payload in one round trip.
const REQUIRED_FIELDS: [&str; 2] = ["from", "message"];

// Sender apps are browser extensions and WebView shells as often as native
// code; every response carries the permissive CORS set.
const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, POST, OPTIONS"),
    ("access-control-allow-headers", "Content-Type"),
];

pub struct AppState {
    pub sink: Arc<dyn AlertSink>,
    pub ack_storage_failures: bool,
}

/// Bind the webhook and serve until ctrl-c, draining in-flight requests.
pub async fn start_http_server(config: &AppConfig, pool: DbPool) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        sink: Arc::new(PgAlertSink::new(pool)),
        ack_storage_failures: config.ack_storage_failures,
    });

    let app = build_router(&config.webhook_path, state);
    let addr = format!("{}:{}", config.http_bind_addr, config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Webhook listening on {}{}", addr, config.webhook_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received, draining connections");
        })
        .await?;

    Ok(())
}

pub fn build_router(path: &str, state: Arc<AppState>) -> Router {
    Router::new().route(path, any(ingest)).with_state(state)
}

#[derive(Serialize)]
struct AckBody {
    ok: bool,
    received: CanonicalAlert,
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: String,
}

#[derive(Serialize)]
struct RejectionBody {
    ok: bool,
    error: &'static str,
    required: [&'static str; 2],
    missing: Vec<&'static str>,
    received: FieldMap,
}

/// Single webhook entry point. Method dispatch happens here rather than in
/// the router so the 405 and preflight answers share the CORS header set.
async fn ingest(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return (StatusCode::NO_CONTENT, CORS_HEADERS).into_response();
    }
    if method != Method::GET && method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            CORS_HEADERS,
            Json(ErrorBody {
                ok: false,
                error: "Method not allowed".to_string(),
            }),
        )
            .into_response();
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let fields = match decode::decode(&method, content_type, query, &body) {
        Ok(fields) => fields,
        Err(e) => return error_response(e),
    };

    match alert_processor::process_fields(
        state.sink.as_ref(),
        fields,
        state.ack_storage_failures,
    )
    .await
    {
        Ok(ingested) => (
            StatusCode::OK,
            CORS_HEADERS,
            Json(AckBody {
                ok: true,
                received: ingested.alert,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: IngestError) -> Response {
    match err {
        IngestError::Validation { missing, received } => (
            StatusCode::BAD_REQUEST,
            CORS_HEADERS,
            Json(RejectionBody {
                ok: false,
                error: "Missing required fields",
                required: REQUIRED_FIELDS,
                missing,
                received,
            }),
        )
            .into_response(),
        IngestError::Decode(reason) | IngestError::Storage(reason) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            CORS_HEADERS,
            Json(ErrorBody {
                ok: false,
                error: reason,
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::test_sink::MockSink;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_router(sink: MockSink, ack_storage_failures: bool) -> Router {
        build_router(
            "/api/sms",
            Arc::new(AppState {
                sink: Arc::new(sink),
                ack_storage_failures,
            }),
        )
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn get_with_query_params_is_acknowledged() {
        let sink = MockSink::default();
        let app = test_router(sink.clone(), false);

        let response = app
            .oneshot(
                Request::get("/api/sms?from=%2B15551234&message=Hello")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );

        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["received"]["sender"], "+15551234");
        assert_eq!(body["received"]["message"], "Hello");
        assert_eq!(body["received"]["sim"], Value::Null);
        assert_eq!(body["received"]["filterName"], Value::Null);
        assert!(body["received"]["time"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(body["received"]["receivedAt"]
            .as_str()
            .is_some_and(|t| !t.is_empty()));

        assert_eq!(sink.appended().len(), 1);
    }

    #[tokio::test]
    async fn same_alert_via_query_body_or_form_normalizes_identically() {
        let via_query = {
            let app = test_router(MockSink::default(), false);
            let response = app
                .oneshot(
                    Request::get("/api/sms?from=a&message=Ping")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            body_json(response).await
        };
        let via_json = {
            let app = test_router(MockSink::default(), false);
            let response = app
                .oneshot(
                    Request::post("/api/sms")
                        .header("content-type", "application/json")
                        .body(Body::from(r#"{"from":"a","message":"Ping"}"#))
                        .unwrap(),
                )
                .await
                .unwrap();
            body_json(response).await
        };
        let via_form = {
            let app = test_router(MockSink::default(), false);
            let response = app
                .oneshot(
                    Request::post("/api/sms")
                        .header("content-type", "application/x-www-form-urlencoded")
                        .body(Body::from("from=a&message=Ping"))
                        .unwrap(),
                )
                .await
                .unwrap();
            body_json(response).await
        };

        for body in [&via_json, &via_form] {
            assert_eq!(body["received"]["sender"], via_query["received"]["sender"]);
            assert_eq!(body["received"]["message"], via_query["received"]["message"]);
            assert_eq!(body["received"]["sim"], via_query["received"]["sim"]);
        }
    }

    #[tokio::test]
    async fn post_body_overrides_query_on_collision() {
        let sink = MockSink::default();
        let app = test_router(sink.clone(), false);

        let response = app
            .oneshot(
                Request::post("/api/sms?from=query-sender&message=Hi")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"from":"body-sender"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["received"]["sender"], "body-sender");
        assert_eq!(body["received"]["message"], "Hi");
    }

    #[tokio::test]
    async fn missing_sender_is_rejected_with_details() {
        let sink = MockSink::default();
        let app = test_router(sink.clone(), false);

        let response = app
            .oneshot(
                Request::post("/api/sms")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"msg":"Student 3:1.0,2.0"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(body["required"], serde_json::json!(["from", "message"]));
        assert_eq!(body["missing"], serde_json::json!(["sender"]));
        assert_eq!(body["received"]["msg"], "Student 3:1.0,2.0");

        assert!(sink.appended().is_empty());
    }

    #[tokio::test]
    async fn missing_both_fields_keeps_stable_order() {
        let app = test_router(MockSink::default(), false);
        let response = app
            .oneshot(Request::get("/api/sms").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["missing"], serde_json::json!(["sender", "message"]));
    }

    #[tokio::test]
    async fn options_preflight_gets_empty_no_content() {
        let app = test_router(MockSink::default(), false);
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/sms")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()["access-control-allow-methods"],
            "GET, POST, OPTIONS"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn other_methods_are_not_allowed() {
        let app = test_router(MockSink::default(), false);
        let response = app
            .oneshot(
                Request::delete("/api/sms?from=a&message=b")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn malformed_json_body_is_an_internal_error() {
        let sink = MockSink::default();
        let app = test_router(sink.clone(), false);

        let response = app
            .oneshot(
                Request::post("/api/sms")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert!(sink.appended().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_surfaces_with_sink_reason() {
        let app = test_router(MockSink::failing("alerts"), false);
        let response = app
            .oneshot(
                Request::get("/api/sms?from=a&message=b")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "insert into alerts refused");
    }

    #[tokio::test]
    async fn failed_location_write_is_an_error_even_after_alert_landed() {
        let sink = MockSink::failing("location_alerts");
        let app = test_router(sink.clone(), false);

        let response = app
            .oneshot(
                Request::get("/api/sms?from=a&message=Student%207:12.34,56.78")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(sink.appended().len(), 1);
    }

    #[tokio::test]
    async fn ack_flag_turns_storage_failures_into_200() {
        let app = test_router(MockSink::failing("alerts"), true);
        let response = app
            .oneshot(
                Request::get("/api/sms?from=a&message=b")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
    }
}
