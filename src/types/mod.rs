//! Shared types for startup-insights

mod error;

pub use error::{InsightsError, Result};
