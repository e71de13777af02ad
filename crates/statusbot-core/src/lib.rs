//! # StatusBot Core
//!
//! Shared building blocks for the daily status report:
//! configuration, the error taxonomy, the record data model and the
//! traits at the seams to external collaborators (record source, delivery sink).

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::StatusBotConfig;
pub use error::{Result, StatusBotError};
pub use traits::{DeliverySink, RecordSource};
pub use types::{Accent, ConnectionState, ConnectionStatus, Record, RenderedReport};
