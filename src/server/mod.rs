//! HTTP server

pub mod http;

pub use http::{route, run, AppState};

#[cfg(test)]
pub(crate) use http::test_state;
