//! # StatusBot Scheduler
//!
//! Clock-driven daily trigger and report dispatch.
//!
//! ## Architecture
//! ```text
//! DailyTrigger (tokio interval, every 60s, first tick immediate)
//!   ├── Clock::now() → (date, hour, minute) in the configured zone
//!   ├── hour:minute == target && date != TriggerState.last_fired
//!   └── on fire → DailyJob (ReportJob)
//!                   ├── ReportService::build()  fetch → aggregate → render
//!                   └── Dispatcher::dispatch()  one attempt, logged, recorded
//! ```

pub mod clock;
pub mod dispatch;
pub mod history;
pub mod job;
pub mod trigger;

pub use clock::{Clock, LocalTime, ZonedClock};
pub use dispatch::Dispatcher;
pub use history::{DeliveryHistory, DeliveryRecord};
pub use job::ReportJob;
pub use trigger::{DailyJob, DailyTrigger, TickOutcome, TriggerState};
