//! Fetch → aggregate → render, shared by the daily trigger and on-demand callers.

use std::sync::Arc;

use statusbot_core::error::Result;
use statusbot_core::traits::RecordSource;
use statusbot_core::types::RenderedReport;

use crate::aggregate::{AggregateOptions, Report, aggregate};
use crate::render::{render, render_failure};

/// Stateless report builder. Safe to call concurrently from several entry points.
#[derive(Clone)]
pub struct ReportService {
    source: Arc<dyn RecordSource>,
    options: AggregateOptions,
}

impl ReportService {
    pub fn new(source: Arc<dyn RecordSource>, options: AggregateOptions) -> Self {
        Self { source, options }
    }

    /// Fetch and aggregate. Errors come from the record source only.
    pub async fn generate(&self) -> Result<Report> {
        let records = self.source.fetch().await?;
        Ok(aggregate(&records, &self.options))
    }

    /// Always yields presentable content: the report, or a rendered error.
    pub async fn build(&self) -> RenderedReport {
        match self.generate().await {
            Ok(report) => {
                tracing::info!(
                    "📊 Report built: {} shown, {} excluded",
                    report.visible_count,
                    report.excluded_count
                );
                render(&report)
            }
            Err(e) => {
                tracing::error!("❌ Failed to build report: {e}");
                render_failure(&e)
            }
        }
    }
}
