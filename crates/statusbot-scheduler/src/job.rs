//! The daily report job: build the report, deliver it to the configured destination.

use std::sync::Arc;

use async_trait::async_trait;
use statusbot_core::error::Result;
use statusbot_report::ReportService;

use crate::dispatch::Dispatcher;
use crate::trigger::DailyJob;

pub const DAILY_TITLE: &str = "Daily status report";

pub struct ReportJob {
    service: ReportService,
    dispatcher: Arc<Dispatcher>,
    destination: String,
}

impl ReportJob {
    pub fn new(service: ReportService, dispatcher: Arc<Dispatcher>, destination: &str) -> Self {
        Self {
            service,
            dispatcher,
            destination: destination.to_string(),
        }
    }
}

#[async_trait]
impl DailyJob for ReportJob {
    async fn run(&self) -> Result<()> {
        // Fetch failures are already rendered as error reports; they are delivered too.
        let report = self.service.build().await;
        self.dispatcher
            .dispatch(DAILY_TITLE, &self.destination, &report)
            .await
    }
}
