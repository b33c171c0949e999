mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::read_json;
use http_helpers::{json_request, raw_request};
use relay::app::{AppState, build_router};
use relay::dispatch::Dispatcher;
use relay::store::memory::InMemoryStore;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app() -> axum::Router {
    let state = AppState {
        store: Arc::new(InMemoryStore::new()),
        dispatcher: Dispatcher::new(Duration::from_millis(500), 4).expect("dispatcher"),
    };
    build_router(state)
}

#[tokio::test]
async fn subscribe_then_duplicate_then_publish_counts_two() {
    let app = app();

    // First subscribe creates the record and echoes the pair back.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subscribe/t1",
            serde_json::json!({"url": "http://localhost:1234/a"}),
        ))
        .await
        .expect("subscribe");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({"topic": "t1", "url": "http://localhost:1234/a"})
    );

    // The identical pair again is a benign 200 with an error field.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subscribe/t1",
            serde_json::json!({"url": "http://localhost:1234/a"}),
        ))
        .await
        .expect("duplicate subscribe");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({"error": "Subscription already exists!"})
    );

    // A second url under the same topic is a new record.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subscribe/t1",
            serde_json::json!({"url": "http://localhost:1234/b"}),
        ))
        .await
        .expect("second subscribe");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/publish/t1",
            serde_json::json!({"k": "v"}),
        ))
        .await
        .expect("publish");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({
            "status": "Publish to 2 subscriber(s) completed!",
            "data": {"topic": "t1", "data": {"k": "v"}}
        })
    );
}

#[tokio::test]
async fn blank_topic_is_rejected_before_reaching_the_store() {
    let app = app();

    // %20 decodes to a single space: present but blank.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subscribe/%20",
            serde_json::json!({"url": "http://localhost:1234/a"}),
        ))
        .await
        .expect("subscribe");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({"error": "Path parameter 'topic' undefined or blank"})
    );

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/publish/%20",
            serde_json::json!({"k": "v"}),
        ))
        .await
        .expect("publish");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({"error": "Path parameter 'topic' undefined or blank"})
    );
}

#[tokio::test]
async fn subscribe_body_validation_failures() {
    let app = app();

    let cases = [
        (
            serde_json::json!({}),
            "Request body cannot be blank nor empty.",
        ),
        (serde_json::json!({"url": ""}), "URL cannot be blank."),
        (serde_json::json!({"url": "   "}), "URL cannot be blank."),
        (serde_json::json!({"url": null}), "URL cannot be blank."),
        (
            serde_json::json!({"url": "someStringThatIsNotAUrl"}),
            "Invalid URL provided.",
        ),
        (
            serde_json::json!({"url": "ftp://example.com/hook"}),
            "Invalid URL provided.",
        ),
        (serde_json::json!({"url": 42}), "Invalid URL provided."),
    ];
    for (body, expected) in cases {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/subscribe/t1", body.clone()))
            .await
            .expect("subscribe");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(
            read_json(response).await,
            serde_json::json!({"error": expected}),
            "body: {body}"
        );
    }

    // A body that is not JSON at all counts as blank/empty.
    let response = app
        .clone()
        .oneshot(raw_request("POST", "/subscribe/t1", "definitely not json"))
        .await
        .expect("subscribe");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({"error": "Request body cannot be blank nor empty."})
    );

    // None of the rejected subscribes created a record.
    let response = app
        .clone()
        .oneshot(json_request("POST", "/publish/t1", serde_json::json!({})))
        .await
        .expect("publish");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["status"], "Publish to 0 subscriber(s) completed!");
}

#[tokio::test]
async fn publish_rejects_non_object_bodies() {
    let app = app();

    for body in [
        serde_json::json!([]),
        serde_json::json!([1, 2, 3]),
        serde_json::json!("text"),
        serde_json::json!(7),
        serde_json::json!(null),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/publish/t1", body.clone()))
            .await
            .expect("publish");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(
            read_json(response).await,
            serde_json::json!({"error": "Invalid request body."}),
            "body: {body}"
        );
    }

    let response = app
        .clone()
        .oneshot(raw_request("POST", "/publish/t1", "{broken"))
        .await
        .expect("publish");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({"error": "Invalid request body."})
    );
}

#[tokio::test]
async fn publish_with_no_subscribers_reports_zero() {
    let app = app();
    let body = serde_json::json!({"key": "Sample Data", "data": {"in": [1, 2, 3]}});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/publish/noSubscriberTopic", body.clone()))
        .await
        .expect("publish");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({
            "status": "Publish to 0 subscriber(s) completed!",
            "data": {"topic": "noSubscriberTopic", "data": body}
        })
    );
}

#[tokio::test]
async fn repeated_publish_is_idempotent_over_the_subscription_set() {
    let app = app();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subscribe/t1",
            serde_json::json!({"url": "http://localhost:1234/a"}),
        ))
        .await
        .expect("subscribe");
    assert_eq!(response.status(), StatusCode::OK);

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/publish/t1",
                serde_json::json!({"n": 1}),
            ))
            .await
            .expect("publish");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload["status"], "Publish to 1 subscriber(s) completed!");
    }
}

#[tokio::test]
async fn unmatched_routes_fall_back_to_404() {
    let app = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/does/not/exist")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("fallback");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({"error": "Not Found!"})
    );

    // Wrong method on a known path falls through as well.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/subscribe/t1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("fallback");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subscriber_echo_route_reflects_payloads() {
    let app = app();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subscribers/tag-1",
            serde_json::json!({"topic": "t1", "data": {"k": "v"}}),
        ))
        .await
        .expect("echo");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({"tag": "tag-1", "data": {"topic": "t1", "data": {"k": "v"}}})
    );
}

#[tokio::test]
async fn healthz_reports_ok_for_memory_backend() {
    let app = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("health");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, serde_json::json!({"status": "ok"}));
}
