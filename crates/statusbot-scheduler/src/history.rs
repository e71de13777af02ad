//! Delivery history — in-memory ring buffer of recent delivery attempts.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_ENTRIES: usize = 100;

/// One delivery attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub title: String,
    /// Sink that carried it (discord, webhook).
    pub sink: String,
    pub destination: String,
    pub delivered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Keeps the last 100 attempts, oldest first.
#[derive(Debug, Default)]
pub struct DeliveryHistory {
    entries: VecDeque<DeliveryRecord>,
}

impl DeliveryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: DeliveryRecord) {
        self.entries.push_back(entry);
        if self.entries.len() > MAX_ENTRIES {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> Vec<DeliveryRecord> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_keeps_last_100() {
        let mut history = DeliveryHistory::new();
        for i in 0..105 {
            history.record(DeliveryRecord {
                title: format!("report {i}"),
                sink: "discord".into(),
                destination: "123".into(),
                delivered: true,
                error: None,
                timestamp: Utc::now(),
            });
        }
        assert_eq!(history.len(), 100);
        assert_eq!(history.entries()[0].title, "report 5");
    }
}
