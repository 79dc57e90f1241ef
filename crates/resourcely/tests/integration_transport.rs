//! Transport behaviour against a mock server: headers, body encoding,
//! retries, error classification and cancellation.

mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use resourcely::{Client, Context, Error, ErrorEnvelope};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_sends_auth_and_negotiation_headers() {
    let server = MockServer::start().await;
    let token = common::test_token();

    Mock::given(method("GET"))
        .and(path("/api/v1/system/health"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let health = client
        .system()
        .health(&Context::background())
        .await
        .expect("health request failed");
    assert!(health.is_ok());

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    assert!(request.headers.get("content-type").is_none());
    let user_agent = request.headers.get("user-agent").unwrap().to_str().unwrap();
    assert_eq!(user_agent, resourcely::default_user_agent());
}

#[tokio::test]
async fn test_body_is_json_without_html_escaping() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/echo"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"content":"<b>a & b</b>"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let raw = client
        .transport()
        .post::<_, Value>(
            &Context::background(),
            "echo",
            &json!({"content": "<b>a & b</b>"}),
        )
        .await
        .unwrap();

    assert_eq!(raw.status_code(), 201);
    assert_eq!(raw.into_parsed(), Some(json!({"ok": true})));
}

#[tokio::test]
async fn test_empty_body_decodes_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/blueprints"))
        .and(query_param("page_size", "2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = common::client(&server);
    let raw = client
        .transport()
        .get::<Value>(&Context::background(), "blueprints", &[("page_size", "2")])
        .await
        .unwrap();
    assert_eq!(raw.into_parsed(), None);
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let result = common::client(&server)
        .transport()
        .get::<Value>(&Context::background(), "blueprints", &[])
        .await;
    assert_matches!(result, Err(Error::Decode { .. }));
}

#[tokio::test]
async fn test_get_to_writer_copies_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/blueprints/series/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ \"raw\" : true }"))
        .mount(&server)
        .await;

    let mut sink = Vec::new();
    common::client(&server)
        .transport()
        .get_to_writer(&Context::background(), "blueprints/series/s1", &[], &mut sink)
        .await
        .unwrap();
    assert_eq!(String::from_utf8(sink).unwrap(), "{ \"raw\" : true }");
}

#[tokio::test]
async fn test_transient_status_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/system/health"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/system/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let raw = common::client(&server)
        .transport()
        .get::<Value>(&Context::background(), "system/health", &[])
        .await
        .unwrap();
    assert_eq!(raw.retries_taken(), 2);
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(502).set_body_json(json!({"errors": ["upstream down"]})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let err = common::client(&server)
        .system()
        .health(&Context::background())
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(502));
    assert_eq!(err.as_api().unwrap().errors(), ["upstream down"]);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let err = common::client(&server)
        .system()
        .health(&Context::background())
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
}

#[tokio::test]
async fn test_unauthorized_ignores_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("<html>Sign in</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = common::client(&server)
        .blueprints()
        .get_by_series_id(&Context::background(), "s1")
        .await
        .unwrap_err();

    let api = err.as_api().expect("expected an API error");
    assert_eq!(api.envelope, ErrorEnvelope::unauthorized());
    assert_eq!(
        err.to_string(),
        format!(
            "GET {}/api/v1/blueprints/series/s1: [401]  - Unauthorized",
            server.uri()
        )
    );
}

#[tokio::test]
async fn test_validation_error_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/blueprints/series/s1"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "status": 422,
            "request_id": "req-42",
            "errors": ["name is required"],
            "request_path": "/api/v1/blueprints/series/s1",
            "app_version": "2.3.4"
        })))
        .mount(&server)
        .await;

    let update = resourcely::UpdatedBlueprint {
        series_id: "s1".to_string(),
        ..Default::default()
    };
    let err = common::client(&server)
        .blueprints()
        .update(&Context::background(), &update)
        .await
        .unwrap_err();

    assert_eq!(err.request_id(), Some("req-42"));
    let api = err.as_api().unwrap();
    assert_eq!(api.envelope.app_version, "2.3.4");
    assert_eq!(api.envelope.request_path, "/api/v1/blueprints/series/s1");
    assert!(err.to_string().ends_with("[422] req-42 - name is required"));
}

#[tokio::test]
async fn test_cancel_during_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "ok"}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let client = common::client(&server);
    let (ctx, handle) = Context::with_cancel();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let result = client.system().health(&ctx).await;
    canceller.await.unwrap();
    assert_matches!(result, Err(Error::Cancelled));
}

#[tokio::test]
async fn test_deadline_during_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let ctx = Context::background().with_timeout(Duration::from_millis(50));
    let result = common::client(&server).system().health(&ctx).await;
    assert_matches!(result, Err(Error::DeadlineExceeded));
}

#[tokio::test]
async fn test_connection_failure_after_retries() {
    // Nothing listens on this port once the server is dropped.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let client = Client::builder()
        .host(uri)
        .retry(common::fast_retry(1))
        .build()
        .unwrap();
    let result = client.system().health(&Context::background()).await;
    assert_matches!(result, Err(Error::Connection(_)));
}
