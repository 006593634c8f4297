//! HTTP routes for startup-insights

pub mod admin;
pub mod health;
pub mod response;
pub mod sessions;
pub mod startups;

pub use health::{health_check, readiness_check, version_info};
pub use response::{error_response, json_response, report_response, respond};
