//! Integration tests for the request engine.
//!
//! Covers status-driven deserialization, local failure normalization,
//! request composition (URI, body, headers), and token handling against a
//! wiremock server.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::StatusCode;
use rk_api::{ApiResult, ClientRegistry, Envelope, RestClient, StatusTable};
use rk_core::config::ClientConfig;
use rk_core::error::RkError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Widget {
    id: u32,
    name: String,
}

// ---- Status policy ----

#[tokio::test]
async fn ok_status_overrides_body_success_flag() {
    let (server, client) = common::start("/v1/").await;
    Mock::given(method("GET"))
        .and(path("/v1/widgets/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "title": "fetched",
            "data": { "id": 1, "name": "gear" }
        })))
        .mount(&server)
        .await;

    let resp: ApiResult<Widget> = client.get("widgets/1").await;
    assert!(resp.success);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.title.as_deref(), Some("fetched"));
    assert_eq!(resp.data, Some(Widget { id: 1, name: "gear".into() }));
    assert!(resp.exception.is_none());
}

#[tokio::test]
async fn not_found_with_empty_body_is_default_envelope() {
    let (server, client) = common::start("/v1/").await;
    Mock::given(method("GET"))
        .and(path("/v1/widgets/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resp: ApiResult<Widget> = client.get("widgets/9").await;
    assert!(!resp.success);
    assert_eq!(resp.status, 404);
    assert!(resp.title.is_none());
    assert!(resp.data.is_none());
    assert!(resp.exception.is_none());
}

#[tokio::test]
async fn ok_with_empty_body_is_successful_default() {
    let (server, client) = common::start("/").await;
    Mock::given(method("DELETE"))
        .and(path("/widgets/4"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let resp: ApiResult<Widget> = client.delete("widgets/4").await;
    assert!(resp.success);
    assert_eq!(resp.status, 200);
    assert!(resp.data.is_none());
}

#[tokio::test]
async fn bad_request_body_is_parsed_but_unsuccessful() {
    let (server, client) = common::start("/v1/").await;
    Mock::given(method("POST"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "title": "One or more validation errors occurred.",
            "status": 400,
            "errors": { "name": ["The name field is required."] }
        })))
        .mount(&server)
        .await;

    let resp: ApiResult<Widget> = client.post("widgets", &json!({ "id": 3 })).await;
    assert!(!resp.success);
    assert_eq!(resp.status, 400);
    assert_eq!(resp.title.as_deref(), Some("One or more validation errors occurred."));
    assert_eq!(resp.errors["name"], vec!["The name field is required.".to_string()]);
    assert!(resp.exception.is_none());
}

#[tokio::test]
async fn server_error_text_becomes_title() {
    let (server, client) = common::start("/v1/").await;
    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let resp: ApiResult<Vec<Widget>> = client.get("widgets").await;
    assert!(!resp.success);
    assert_eq!(resp.status, 500);
    assert_eq!(resp.title.as_deref(), Some("internal error"));
    assert!(resp.exception.is_none());
}

#[tokio::test]
async fn invalid_utf8_error_text_is_replaced() {
    let (server, client) = common::start("/").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_bytes(vec![b'b', b'a', b'd', 0xff, 0xfe]))
        .mount(&server)
        .await;

    let resp: ApiResult = client.get("upstream").await;
    assert!(!resp.success);
    assert_eq!(resp.status, 502);
    assert_eq!(resp.title.as_deref(), Some("bad\u{FFFD}\u{FFFD}"));
    assert!(resp.exception.is_none());
}

#[tokio::test]
async fn unexpected_status_with_empty_body_has_no_title() {
    let (server, client) = common::start("/").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let resp: ApiResult = client.get("anything").await;
    assert!(!resp.success);
    assert_eq!(resp.status, 503);
    assert!(resp.title.is_none());
}

#[tokio::test]
async fn unexpected_status_json_body_is_not_parsed() {
    let (server, client) = common::start("/").await;
    let body = r#"{"success":true,"data":{"id":5,"name":"new"}}"#;
    Mock::given(method("POST"))
        .and(path("/widgets"))
        .respond_with(ResponseTemplate::new(201).set_body_string(body))
        .mount(&server)
        .await;

    let resp: ApiResult<Widget> = client.post("widgets", &Widget { id: 5, name: "new".into() }).await;
    assert!(!resp.success);
    assert_eq!(resp.status, 201);
    assert_eq!(resp.title.as_deref(), Some(body));
    assert!(resp.data.is_none());
}

#[tokio::test]
async fn html_error_page_is_not_parsed() {
    let (server, client) = common::start("/").await;
    let page = "<html><body><h1>502 Bad Gateway</h1></body></html>";
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_raw(page, "text/html"))
        .mount(&server)
        .await;

    let resp: ApiResult<Widget> = client.get("widgets").await;
    assert_eq!(resp.status, 502);
    assert_eq!(resp.title.as_deref(), Some(page));
    assert!(resp.exception.is_none());
}

#[tokio::test]
async fn custom_status_table_parses_extra_codes() {
    let (server, client) = common::start("/").await;
    let client = client.with_status_table(StatusTable::default().with_parsed(StatusCode::CREATED));
    Mock::given(method("POST"))
        .and(path("/widgets"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "data": { "id": 8, "name": "bolt" } })),
        )
        .mount(&server)
        .await;

    let resp: ApiResult<Widget> = client.post("widgets", &json!({ "name": "bolt" })).await;
    assert!(!resp.success, "only 200 is a success");
    assert_eq!(resp.status, 201);
    assert_eq!(resp.data.unwrap().id, 8);
}

// ---- Local failures ----

#[tokio::test]
async fn network_error_becomes_exception_envelope() {
    let client = RestClient::with_client(reqwest::Client::new(), &common::closed_port_uri()).unwrap();

    let resp: ApiResult<Widget> = client.get("widgets").await;
    assert!(!resp.success);
    assert_eq!(resp.status, 444);
    assert_eq!(resp.title.as_deref(), Some("Exception"));
    assert!(matches!(resp.exception(), Some(RkError::Http(_))));
}

#[tokio::test]
async fn malformed_json_becomes_exception_envelope() {
    let (server, client) = common::start("/").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": 1,"))
        .mount(&server)
        .await;

    let resp: ApiResult<Widget> = client.get("widgets/1").await;
    assert!(!resp.success);
    assert_eq!(resp.status, 444);
    assert_eq!(resp.title.as_deref(), Some("Exception"));
    assert!(matches!(resp.exception(), Some(RkError::Serialization(_))));
}

#[tokio::test]
async fn wrong_payload_shape_becomes_exception_envelope() {
    let (server, client) = common::start("/").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "data": "not a widget" })))
        .mount(&server)
        .await;

    let resp: ApiResult<Widget> = client.get("widgets/1").await;
    assert_eq!(resp.status, 444);
    assert!(resp.is_exception());
}

#[tokio::test]
async fn unserializable_body_never_reaches_server() {
    let (server, client) = common::start("/").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut body = HashMap::new();
    body.insert((1, 2), "tuple keys are not valid JSON object keys");
    let resp: ApiResult = client.post("widgets", &body).await;
    assert_eq!(resp.status, 444);
    assert!(matches!(resp.exception(), Some(RkError::Serialization(_))));
}

#[tokio::test]
async fn unknown_registry_client_becomes_exception_envelope() {
    let client =
        RestClient::from_registry(Arc::new(ClientRegistry::new()), "missing", "http://localhost/")
            .unwrap();
    let resp: ApiResult = client.get("x").await;
    assert_eq!(resp.status, 444);
    assert!(matches!(resp.exception(), Some(RkError::InvalidArgument(_))));
}

// ---- Request composition ----

#[tokio::test]
async fn post_sends_json_body_and_bearer_token() {
    let (server, client) = common::start("/v1/").await;
    let client = client.with_auth_token("tok-1");
    Mock::given(method("POST"))
        .and(path("/v1/widgets"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!({ "id": 2, "name": "cog" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": 2, "name": "cog" } })))
        .expect(1)
        .mount(&server)
        .await;

    let resp: ApiResult<Widget> = client.post("widgets", &Widget { id: 2, name: "cog".into() }).await;
    assert!(resp.success);
    assert_eq!(resp.data.unwrap().name, "cog");
}

#[tokio::test]
async fn put_sends_json_body() {
    let (server, client) = common::start("/v1/").await;
    Mock::given(method("PUT"))
        .and(path("/v1/widgets/2"))
        .and(body_json(json!({ "id": 2, "name": "sprocket" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "updated" })))
        .expect(1)
        .mount(&server)
        .await;

    let resp: ApiResult<Widget> = client
        .put("widgets/2", &Widget { id: 2, name: "sprocket".into() })
        .await;
    assert!(resp.success);
    assert_eq!(resp.title.as_deref(), Some("updated"));
}

#[tokio::test]
async fn rooted_path_replaces_base_path() {
    let (server, client) = common::start("/v1/").await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let resp: ApiResult = client.get("/health").await;
    assert!(resp.success);
}

#[tokio::test]
async fn network_path_does_not_leave_base_host() {
    let (server, client) = common::start("/v1/").await;
    let client = client.with_auth_token("s3cret");
    let foreign = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&foreign)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resp: ApiResult = client.get(&format!("//{}/steal", foreign.address())).await;
    assert!(!resp.success);
    assert_ne!(resp.status, 200);
}

#[tokio::test]
async fn foreign_absolute_uri_becomes_exception_envelope() {
    let (_server, client) = common::start("/v1/").await;
    let client = client.with_auth_token("s3cret");
    let foreign = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&foreign)
        .await;

    let resp: ApiResult = client.get(&format!("{}/steal", foreign.uri())).await;
    assert!(!resp.success);
    assert_eq!(resp.status, 444);
    assert_eq!(resp.title.as_deref(), Some("Exception"));
    assert!(resp.exception.as_deref().is_some_and(RkError::is_invalid_argument));
}

#[tokio::test]
async fn query_string_is_preserved() {
    let (server, client) = common::start("/v1/").await;
    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let resp: ApiResult = client.get("widgets?page=2").await;
    assert!(resp.success);
}

#[tokio::test]
async fn token_updates_apply_to_next_call() {
    let (server, client) = common::start("/").await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer first"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "first" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "second" })))
        .mount(&server)
        .await;

    client.set_auth_token(Some("first".into())).await;
    let first: ApiResult = client.get("me").await;
    client.set_auth_token(Some("second".into())).await;
    let second: ApiResult = client.get("me").await;

    assert_eq!(first.title.as_deref(), Some("first"));
    assert_eq!(second.title.as_deref(), Some("second"));
}

#[tokio::test]
async fn registry_client_sends_identity_headers() {
    let server = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("accept", "application/json"))
        .and(header("user-agent", "orders/1.2.3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let mut registry = ClientRegistry::new();
    registry.register("orders", "1.2.3").unwrap();
    let client = RestClient::from_registry(Arc::new(registry), "orders", &server.uri()).unwrap();

    let resp: ApiResult = client.get("orders").await;
    assert!(resp.success);
}

#[tokio::test]
async fn from_config_applies_token_and_headers() {
    let server = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .and(header("authorization", "Bearer cfg-token"))
        .and(header("x-tenant", "acme"))
        .and(header("user-agent", "status-probe/0.9.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = ClientConfig {
        name: "status-probe".into(),
        version: "0.9.0".into(),
        base_uri: format!("{}/api/", server.uri()),
        auth_token: Some("cfg-token".into()),
        ..ClientConfig::default()
    };
    config.default_headers.insert("X-Tenant".into(), "acme".into());

    let client = RestClient::from_config(&config).unwrap();
    let resp: ApiResult = client.get("status").await;
    assert!(resp.success);
}

#[tokio::test]
async fn from_config_rejects_missing_base_uri() {
    let err = RestClient::from_config(&ClientConfig::default()).unwrap_err();
    assert!(err.is_invalid_argument());
}

// ---- Concurrency ----

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let (server, client) = common::start("/").await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "a" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "title": "b" })))
        .mount(&server)
        .await;

    let other = client.clone();
    let (a, b) = tokio::join!(
        client.get::<ApiResult>("a"),
        other.get::<ApiResult>("b"),
    );
    assert!(a.success);
    assert_eq!(a.title.as_deref(), Some("a"));
    assert!(!b.success);
    assert_eq!(b.status, 404);
    assert_eq!(b.title.as_deref(), Some("b"));
}

#[tokio::test]
async fn calls_can_run_on_spawned_tasks() {
    let (server, client) = common::start("/").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(3)
        .mount(&server)
        .await;

    let mut handles = Vec::new();
    for i in 0..3 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.get::<ApiResult>(&format!("item/{i}")).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().success);
    }
}
