//! API route handlers for the gateway.

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use statusbot_core::error::StatusBotError;

use super::server::AppState;

/// Discord error codes surfaced as specific HTTP statuses.
const UNKNOWN_CHANNEL: u64 = 10003;
const MISSING_ACCESS: u64 = 50001;
const MISSING_PERMISSIONS: u64 = 50013;

type ApiResponse = (StatusCode, Json<Value>);

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "statusbot-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Liveness check kept for existing callers.
pub async fn test_endpoint() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Server is up!",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// POST /send-message — `{ "message": "...", "channelId": "..." }`.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResponse {
    tracing::info!("📨 /send-message request received");

    let message = body["message"].as_str().unwrap_or("").trim();
    let channel_id = body["channelId"].as_str().unwrap_or("").trim();

    let mut issues = Vec::new();
    if message.is_empty() {
        issues.push(json!({"field": "message", "issue": "Message must not be empty"}));
    }
    if channel_id.is_empty() {
        issues.push(json!({"field": "channelId", "issue": "Channel ID is required"}));
    }
    if !issues.is_empty() {
        tracing::warn!("⚠️ /send-message validation failed: {} issue(s)", issues.len());
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Invalid data", "details": issues})),
        );
    }

    match state.dispatcher.sink().send_text(channel_id, message).await {
        Ok(message_id) => {
            tracing::info!("✅ Message sent to {channel_id}");
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": "Message sent",
                    "data": {
                        "messageId": message_id,
                        "channelId": channel_id,
                        "content": message,
                    }
                })),
            )
        }
        Err(e) => {
            tracing::error!("❌ Failed to send message to {channel_id}: {e}");
            channel_error_response(&e)
        }
    }
}

fn channel_error_response(err: &StatusBotError) -> ApiResponse {
    let code = match err {
        StatusBotError::Channel { code, .. } => *code,
        _ => None,
    };
    let (status, error, details) = match code {
        Some(UNKNOWN_CHANNEL) => (
            StatusCode::NOT_FOUND,
            "Channel not found",
            "The channel does not exist or the bot cannot see it.".to_string(),
        ),
        Some(MISSING_ACCESS) => (
            StatusCode::FORBIDDEN,
            "No access to channel",
            "The bot has no permission to access this channel.".to_string(),
        ),
        Some(MISSING_PERMISSIONS) => (
            StatusCode::FORBIDDEN,
            "Missing permissions",
            "The bot has no permission to send messages in this channel.".to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to send message",
            err.to_string(),
        ),
    };
    (
        status,
        Json(json!({"success": false, "error": error, "details": details})),
    )
}

/// Optional body of `POST /api/v1/report`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    /// Also deliver the report to this destination.
    #[serde(default, rename = "channelId")]
    pub channel_id: Option<String>,
    /// Also deliver to the configured destination when no `channelId` is given.
    #[serde(default)]
    pub deliver: bool,
}

impl ReportRequest {
    fn destination(self, configured: Option<&str>) -> Result<Option<String>, &'static str> {
        match self.channel_id.filter(|c| !c.trim().is_empty()) {
            Some(channel) => Ok(Some(channel)),
            None if self.deliver => configured
                .map(|d| Some(d.to_string()))
                .ok_or("deliver requested but no destination is configured"),
            None => Ok(None),
        }
    }
}

/// POST /api/v1/report — on-demand report.
///
/// Builds the report now and returns it, success or rendered error, with
/// HTTP 200. Delivers it too when the body names a destination.
pub async fn report_on_demand(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResponse {
    let request: ReportRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ReportRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"ok": false, "error": format!("Invalid body: {e}")})),
                );
            }
        }
    };
    let destination = match request.destination(state.destination.as_deref()) {
        Ok(d) => d,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({"ok": false, "error": e})));
        }
    };

    let report = state.reports.build().await;
    let delivery = match destination {
        Some(dest) => {
            let result = state
                .dispatcher
                .dispatch("On-demand status report", &dest, &report)
                .await;
            json!({
                "destination": dest,
                "delivered": result.is_ok(),
                "error": result.err().map(|e| e.to_string()),
            })
        }
        None => Value::Null,
    };

    (
        StatusCode::OK,
        Json(json!({
            "ok": !report.is_error(),
            "report": report,
            "delivery": delivery,
        })),
    )
}

/// GET /api/v1/schedule — target time, zone and last fired date.
pub async fn schedule_info(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "hour": state.schedule.hour,
        "minute": state.schedule.minute,
        "timezone": state.schedule.timezone,
        "enabled": state.destination.is_some(),
        "destination": state.destination,
        "last_fired": state.trigger_state.last_fired().map(|d| d.to_string()),
    }))
}

/// GET /api/v1/deliveries — recent delivery attempts.
pub async fn delivery_history(State(state): State<Arc<AppState>>) -> Json<Value> {
    let deliveries = state.dispatcher.history();
    Json(json!({"count": deliveries.len(), "deliveries": deliveries}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use statusbot_core::config::ScheduleConfig;
    use statusbot_core::error::Result;
    use statusbot_core::traits::{DeliverySink, RecordSource};
    use statusbot_core::types::{Record, RenderedReport};
    use statusbot_report::{AggregateOptions, ReportService};
    use statusbot_scheduler::{Dispatcher, TriggerState};
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct FixedSource(Option<Vec<Record>>);

    #[async_trait]
    impl RecordSource for FixedSource {
        async fn fetch(&self) -> Result<Vec<Record>> {
            self.0
                .clone()
                .ok_or_else(|| StatusBotError::MisconfiguredCredential("SUPABASE_KEY is not set".into()))
        }
    }

    #[derive(Default)]
    struct TestSink {
        error_code: Option<u64>,
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl DeliverySink for TestSink {
        fn name(&self) -> &str {
            "test"
        }

        async fn deliver(&self, destination: &str, report: &RenderedReport) -> Result<()> {
            self.send_text(destination, &report.content).await.map(|_| ())
        }

        async fn send_text(&self, destination: &str, text: &str) -> Result<Option<String>> {
            if let Some(code) = self.error_code {
                return Err(StatusBotError::Channel {
                    code: Some(code),
                    message: "rejected".into(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((destination.to_string(), text.to_string()));
            Ok(Some("msg-1".into()))
        }
    }

    fn test_state(
        records: Option<Vec<Record>>,
        sink: Arc<TestSink>,
        destination: Option<&str>,
    ) -> State<Arc<AppState>> {
        State(Arc::new(AppState {
            reports: ReportService::new(Arc::new(FixedSource(records)), AggregateOptions::default()),
            dispatcher: Arc::new(Dispatcher::new(sink)),
            trigger_state: TriggerState::new(),
            schedule: ScheduleConfig::default(),
            destination: destination.map(String::from),
            start_time: std::time::Instant::now(),
        }))
    }

    fn ana() -> Vec<Record> {
        vec![Record {
            name: Some("Ana".into()),
            category: Some("cliente".into()),
            ..Record::default()
        }]
    }

    // ---- Health ----

    #[tokio::test]
    async fn test_health_check() {
        let json = health_check(test_state(Some(vec![]), Arc::default(), None)).await.0;
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn test_test_endpoint() {
        let json = test_endpoint().await.0;
        assert_eq!(json["success"], true);
        assert!(json["timestamp"].is_string());
    }

    // ---- Send message ----

    #[tokio::test]
    async fn test_send_message_validation() {
        let (status, json) = send_message(
            test_state(None, Arc::default(), None),
            Json(json!({"message": "", "channelId": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_send_message_success() {
        let sink = Arc::new(TestSink::default());
        let (status, json) = send_message(
            test_state(None, sink.clone(), None),
            Json(json!({"message": "hi", "channelId": "42"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["messageId"], "msg-1");
        assert_eq!(sink.sent.lock().unwrap()[0], ("42".to_string(), "hi".to_string()));
    }

    #[tokio::test]
    async fn test_send_message_error_codes() {
        for (code, expected) in [
            (UNKNOWN_CHANNEL, StatusCode::NOT_FOUND),
            (MISSING_ACCESS, StatusCode::FORBIDDEN),
            (MISSING_PERMISSIONS, StatusCode::FORBIDDEN),
            (40001, StatusCode::INTERNAL_SERVER_ERROR),
        ] {
            let sink = Arc::new(TestSink {
                error_code: Some(code),
                ..TestSink::default()
            });
            let (status, json) = send_message(
                test_state(None, sink, None),
                Json(json!({"message": "hi", "channelId": "42"})),
            )
            .await;
            assert_eq!(status, expected, "code {code}");
            assert_eq!(json["success"], false);
        }
    }

    // ---- Reports ----

    #[tokio::test]
    async fn test_report_on_demand_success() {
        let (status, json) =
            report_on_demand(test_state(Some(ana()), Arc::default(), None), Bytes::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert!(json["report"]["content"].as_str().unwrap().contains("### **Ana**"));
        assert!(json["delivery"].is_null());
    }

    #[tokio::test]
    async fn test_report_on_demand_error_is_content() {
        let (status, json) =
            report_on_demand(test_state(None, Arc::default(), None), Bytes::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], false);
        assert_eq!(json["report"]["accent"], "error");
        assert!(json["report"]["content"].as_str().unwrap().contains("SUPABASE_KEY"));
    }

    #[tokio::test]
    async fn test_report_deliver_requires_destination() {
        let (status, _) = report_on_demand(
            test_state(Some(ana()), Arc::default(), None),
            Bytes::from_static(br#"{"deliver": true}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_report_deliver_to_configured_destination() {
        let sink = Arc::new(TestSink::default());
        let state = test_state(Some(ana()), sink.clone(), Some("777"));
        let (status, json) =
            report_on_demand(state.clone(), Bytes::from_static(br#"{"deliver": true}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["delivery"]["destination"], "777");
        assert_eq!(json["delivery"]["delivered"], true);
        assert_eq!(sink.sent.lock().unwrap()[0].0, "777");

        let history = delivery_history(state).await.0;
        assert_eq!(history["count"], 1);
        assert_eq!(history["deliveries"][0]["delivered"], true);
    }

    #[tokio::test]
    async fn test_report_deliver_to_explicit_channel() {
        let sink = Arc::new(TestSink::default());
        let (_, json) = report_on_demand(
            test_state(Some(ana()), sink.clone(), Some("777")),
            Bytes::from_static(br#"{"channelId": "888"}"#),
        )
        .await;
        assert_eq!(json["delivery"]["destination"], "888");
        assert_eq!(sink.sent.lock().unwrap()[0].0, "888");
    }

    #[tokio::test]
    async fn test_report_rejects_bad_body() {
        let (status, _) = report_on_demand(
            test_state(Some(ana()), Arc::default(), Some("777")),
            Bytes::from_static(b"not json"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ---- Schedule ----

    #[tokio::test]
    async fn test_schedule_info() {
        let json = schedule_info(test_state(None, Arc::default(), Some("1"))).await.0;
        assert_eq!(json["hour"], 18);
        assert_eq!(json["minute"], 40);
        assert_eq!(json["timezone"], "America/Sao_Paulo");
        assert_eq!(json["enabled"], true);
        assert!(json["last_fired"].is_null());
    }

    async fn call(router: axum::Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_router_serves_on_demand_report() {
        let State(state) = test_state(Some(ana()), Arc::default(), None);
        let router = crate::build_router(state);

        let (status, json) = call(router.clone(), "POST", "/api/v1/report", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);

        let (status, _) = call(router.clone(), "GET", "/api/v1/report", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, json) = call(router, "GET", "/api/v1/schedule", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["minute"], 40);
    }

    #[tokio::test]
    async fn test_router_send_message_validation() {
        let State(state) = test_state(None, Arc::default(), None);
        let (status, json) = call(
            crate::build_router(state),
            "POST",
            "/send-message",
            r#"{"message": "hi"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"][0]["field"], "channelId");
    }
}
