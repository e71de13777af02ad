//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use statusbot_core::config::{GatewayConfig, ScheduleConfig};
use statusbot_core::error::Result;
use statusbot_report::ReportService;
use statusbot_scheduler::{Dispatcher, TriggerState};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
pub struct AppState {
    /// Fetch → aggregate → render chain for on-demand reports.
    pub reports: ReportService,
    /// Delivery sink plus delivery history.
    pub dispatcher: Arc<Dispatcher>,
    /// Read-only view of the daily trigger's last fired date.
    pub trigger_state: TriggerState,
    pub schedule: ScheduleConfig,
    /// Configured destination for the recurring report, if any.
    pub destination: Option<String>,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/test", get(super::routes::test_endpoint))
        .route("/send-message", post(super::routes::send_message))
        .route("/api/v1/report", post(super::routes::report_on_demand))
        .route("/api/v1/schedule", get(super::routes::schedule_info))
        .route("/api/v1/deliveries", get(super::routes::delivery_history))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process stops.
pub async fn start_server(state: Arc<AppState>, config: &GatewayConfig) -> Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
