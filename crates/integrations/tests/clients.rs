use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;
use skillswap_config::KeywordServiceConfig;
use skillswap_integrations::{IntegrationError, KeywordClient, StreamChatClient, MESSAGING_CHANNEL};

fn stream_client(server: &MockServer) -> StreamChatClient {
    StreamChatClient::new("test-key", "test-secret", &server.base_url(), Duration::from_secs(2))
        .expect("client should build")
}

fn keyword_client(server: &MockServer, enabled: bool) -> KeywordClient {
    KeywordClient::new(&KeywordServiceConfig {
        enabled,
        base_url: server.base_url(),
        timeout_seconds: 2,
    })
    .expect("client should build")
}

#[tokio::test]
async fn keyword_extract_posts_topic_and_returns_keywords() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/llm/query")
                .json_body(json!({ "topic": "Rust", "sub_topics": ["ownership", "traits"] }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "response": ["borrowing", " lifetimes ", ""] }));
        })
        .await;

    let keywords = keyword_client(&server, true)
        .extract("Rust", &["ownership".to_string(), "traits".to_string()])
        .await
        .expect("keywords should be returned");

    mock.assert_async().await;
    assert_eq!(keywords, vec!["borrowing", "lifetimes"]);
}

#[tokio::test]
async fn keyword_extract_reports_upstream_failures() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/llm/query");
            then.status(502).body("bad gateway");
        })
        .await;

    let err = keyword_client(&server, true)
        .extract("Rust", &[])
        .await
        .expect_err("upstream error expected");

    match err {
        IntegrationError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn disabled_keyword_client_never_calls_out() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/llm/query");
            then.status(200).json_body(json!({ "response": [] }));
        })
        .await;

    let err = keyword_client(&server, false)
        .extract("Rust", &[])
        .await
        .expect_err("disabled client should refuse");

    assert!(matches!(err, IntegrationError::Disabled));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn upsert_user_signs_server_requests() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/users")
                .query_param("api_key", "test-key")
                .header("stream-auth-type", "jwt")
                .header_exists("Authorization")
                .json_body(json!({
                    "users": { "u1": { "id": "u1", "name": "Alice", "image": "https://img" } }
                }));
            then.status(201)
                .json_body(json!({ "users": { "u1": { "id": "u1" } } }));
        })
        .await;

    let reply = stream_client(&server)
        .upsert_user("u1", "Alice", Some("https://img"))
        .await
        .expect("upsert should succeed");

    mock.assert_async().await;
    assert_eq!(reply["users"]["u1"]["id"], "u1");
}

#[tokio::test]
async fn query_user_returns_first_match_or_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users")
                .query_param("api_key", "test-key")
                .query_param_exists("payload");
            then.status(200)
                .json_body(json!({ "users": [{ "id": "u1", "name": "Alice" }] }));
        })
        .await;

    let user = stream_client(&server)
        .query_user("u1")
        .await
        .expect("query should succeed")
        .expect("user should be present");
    assert_eq!(user["name"], "Alice");
}

#[tokio::test]
async fn channel_operations_hit_channel_endpoints() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/channels/messaging/a-b/query");
            then.status(201).json_body(json!({ "channel": { "id": "a-b" } }));
        })
        .await;
    let send = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/channels/messaging/a-b/message")
                .json_body(json!({ "message": { "text": "hi", "user_id": "a" } }));
            then.status(201).json_body(json!({ "message": { "text": "hi" } }));
        })
        .await;
    let list = server
        .mock_async(|when, then| {
            when.method(POST).path("/channels");
            then.status(201)
                .json_body(json!({ "channels": [{ "channel": { "id": "a-b" } }] }));
        })
        .await;

    let client = stream_client(&server);
    let channel = client
        .get_or_create_channel(MESSAGING_CHANNEL, "a-b", &["a", "b"], "a")
        .await
        .expect("channel should be created");
    assert_eq!(channel["channel"]["id"], "a-b");

    client
        .send_message(MESSAGING_CHANNEL, "a-b", "a", "hi")
        .await
        .expect("message should send");

    let channels = client.query_channels("a").await.expect("channels should list");
    assert_eq!(channels.len(), 1);

    create.assert_async().await;
    send.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn chat_service_errors_surface_status_and_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/users");
            then.status(401).body("{\"message\":\"bad signature\"}");
        })
        .await;

    let err = stream_client(&server)
        .upsert_user("u1", "Alice", None)
        .await
        .expect_err("unauthorised expected");

    assert!(matches!(err, IntegrationError::Status { status: 401, .. }));
}
