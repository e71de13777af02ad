//! Dispatcher — hands a rendered report to the delivery sink, once.
//! Failures are logged and recorded, never raised past the caller.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use statusbot_core::error::{Result, StatusBotError};
use statusbot_core::traits::DeliverySink;
use statusbot_core::types::RenderedReport;

use crate::history::{DeliveryHistory, DeliveryRecord};

pub struct Dispatcher {
    sink: Arc<dyn DeliverySink>,
    history: Mutex<DeliveryHistory>,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            sink,
            history: Mutex::new(DeliveryHistory::new()),
        }
    }

    pub fn sink(&self) -> &Arc<dyn DeliverySink> {
        &self.sink
    }

    /// Attempt delivery once. `Err` is `DeliveryFailed` and already logged.
    pub async fn dispatch(
        &self,
        title: &str,
        destination: &str,
        report: &RenderedReport,
    ) -> Result<()> {
        tracing::info!("📤 Sending '{}' via {} to {}", title, self.sink.name(), destination);

        let result = self.sink.deliver(destination, report).await;
        let error = result.as_ref().err().map(|e| e.to_string());
        match &error {
            None => tracing::info!("✅ '{}' delivered to {}", title, destination),
            Some(e) => tracing::warn!("⚠️ Delivery of '{}' to {} failed: {}", title, destination, e),
        }

        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record(DeliveryRecord {
                title: title.to_string(),
                sink: self.sink.name().to_string(),
                destination: destination.to_string(),
                delivered: error.is_none(),
                error: error.clone(),
                timestamp: Utc::now(),
            });

        match error {
            None => Ok(()),
            Some(e) => Err(StatusBotError::DeliveryFailed(e)),
        }
    }

    /// Recent delivery attempts, oldest first.
    pub fn history(&self) -> Vec<DeliveryRecord> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries()
    }
}
