//! Delivery sink contract tests against a mock HTTP server.

use serde_json::json;
use statusbot_channels::{DiscordChannel, DiscordConfig, WebhookSink};
use statusbot_core::error::StatusBotError;
use statusbot_core::traits::DeliverySink;
use statusbot_core::types::{Accent, RenderedReport};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn report(content: &str, accent: Accent) -> RenderedReport {
    RenderedReport {
        content: content.into(),
        accent,
        error: None,
    }
}

fn discord(server: &MockServer, token: &str) -> DiscordChannel {
    DiscordChannel::new(DiscordConfig {
        bot_token: token.into(),
        api_base: format!("{}/api/v10", server.uri()),
    })
}

#[tokio::test]
async fn test_discord_deliver_posts_embed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v10/channels/555/messages"))
        .and(header("Authorization", "Bot token-1"))
        .and(body_partial_json(json!({
            "embeds": [{"description": "📊 report", "color": 7419530}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m-1"})))
        .expect(1)
        .mount(&server)
        .await;

    discord(&server, "token-1")
        .deliver("555", &report("📊 report", Accent::Success))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_discord_long_report_is_split() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v10/channels/555/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m"})))
        .expect(2)
        .mount(&server)
        .await;

    let line = "x".repeat(3000);
    let content = format!("{line}\n{line}");
    discord(&server, "t")
        .deliver("555", &report(&content, Accent::Success))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_discord_error_code_is_preserved() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"message": "Unknown Channel", "code": 10003})),
        )
        .mount(&server)
        .await;

    let err = discord(&server, "t").send_text("1", "hi").await.unwrap_err();
    match err {
        StatusBotError::Channel { code, message } => {
            assert_eq!(code, Some(10003));
            assert!(message.contains("Unknown Channel"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_discord_send_text_returns_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"content": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "987"})))
        .mount(&server)
        .await;

    let id = discord(&server, "t").send_text("1", "hello").await.unwrap();
    assert_eq!(id.as_deref(), Some("987"));
}

#[tokio::test]
async fn test_discord_without_token_fails_fast() {
    let server = MockServer::start().await;
    let err = discord(&server, "")
        .deliver("1", &report("x", Accent::Success))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("BOT_TOKEN"));
}

#[tokio::test]
async fn test_generic_webhook_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("X-Token", "abc"))
        .and(body_partial_json(json!({"content": "boom", "accent": "error"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    WebhookSink::new()
        .with_header("X-Token", "abc")
        .deliver(&format!("{}/hook", server.uri()), &report("boom", Accent::Error))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_webhook_failure_maps_to_channel_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    let err = WebhookSink::new()
        .deliver(&format!("{}/hook", server.uri()), &report("x", Accent::Success))
        .await
        .unwrap_err();
    assert!(matches!(err, StatusBotError::Channel { .. }));
}
