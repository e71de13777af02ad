//! # StatusBot Channels
//! Delivery sinks for rendered reports.

pub mod discord;
pub mod webhook;

pub use discord::{DiscordChannel, DiscordConfig, split_message};
pub use webhook::WebhookSink;
