//! # StatusBot Report
//!
//! The fetch → aggregate → render chain shared by the daily trigger and
//! the on-demand request path.
//!
//! ```text
//! RecordSource::fetch()        (SupabaseFetcher)
//!   └── aggregate(records)     pure, deterministic → Report
//!         └── render(report)   → RenderedReport (success / empty / error)
//! ```

pub mod aggregate;
pub mod fetcher;
pub mod render;
pub mod service;

pub use aggregate::{AggregateOptions, ConnectionBucket, Report, Tally, aggregate};
pub use fetcher::SupabaseFetcher;
pub use render::{render, render_error, render_failure};
pub use service::ReportService;
