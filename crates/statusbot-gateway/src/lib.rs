//! # StatusBot Gateway
//! HTTP admin endpoint: health, direct messages, on-demand reports,
//! schedule inspection and delivery history.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start_server};
