//! startup-insights - reporting API over startup, mentor and session records
//!
//! Reads three MongoDB collections whose document shapes have drifted over
//! time, normalizes them into typed records and serves aggregate statistics
//! and enriched session listings as JSON (and CSV for the session download).
//!
//! ## Layers
//!
//! - **db**: [`db::RecordSource`] over MongoDB or memory, behind a lazily
//!   connected [`db::SourceHandle`]
//! - **normalize** / **records**: total coercion of stored values into
//!   canonical records
//! - **pipeline**: pure join, grouping and ranking functions
//! - **service**: [`service::Dashboard`], caching and degradation to empty
//!   results
//! - **routes** / **server**: hyper http1 front end

pub mod cache;
pub mod config;
pub mod db;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod routes;
pub mod seed;
pub mod server;
pub mod service;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use service::{Dashboard, Report, ReportStatus};
pub use types::{InsightsError, Result};
