//! Health check endpoints
//!
//! - /health, /healthz - Liveness probe, always 200 while the process runs
//! - /ready, /readyz - Readiness probe, 200 only with a database handle
//! - /version - Build information
//!
//! Reports degrade to empty results without a database, so a live but
//! unready instance still answers every data endpoint.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::cache::CacheStats;
use crate::routes::response::json_response;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    /// "online" with a reachable database, otherwise "degraded"
    pub status: &'static str,
    pub version: &'static str,
    pub node_id: String,
    pub timestamp: String,
    pub database: DatabaseHealth,
    pub cache: CacheStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

async fn build_health_response(state: &AppState) -> HealthResponse {
    let dashboard = &state.dashboard;
    let source = dashboard.source().get().await;

    let (connected, error) = match &source {
        Some(_) => match dashboard.ping().await {
            Ok(()) => (true, None),
            Err(e) => (false, Some(e.to_string())),
        },
        None => (false, Some("No database connection, reports are empty".to_string())),
    };

    HealthResponse {
        healthy: true,
        status: if connected { "online" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        node_id: state.args.node_id.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: DatabaseHealth {
            connected,
            source: source.map(|s| s.describe()),
        },
        cache: dashboard.cache().stats(),
        error,
    }
}

/// Handle liveness probe (/health, /healthz)
pub async fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let response = build_health_response(&state).await;
    json_response(StatusCode::OK, &response)
}

/// Handle readiness probe (/ready, /readyz)
pub async fn readiness_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let response = build_health_response(&state).await;
    let status = if response.database.connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    json_response(status, &response)
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: env!("CARGO_PKG_NAME"),
    };
    json_response(StatusCode::OK, &response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemorySource, SourceHandle};
    use crate::server::test_state;
    use http_body_util::BodyExt;

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ready_with_source() {
        let state = test_state(SourceHandle::ready(Arc::new(MemorySource::new())), false);
        let response = readiness_check(state.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(health_check(state).await).await;
        assert_eq!(body["status"], "online");
        assert_eq!(body["database"]["connected"], true);
    }

    #[tokio::test]
    async fn test_unready_without_source() {
        let state = test_state(SourceHandle::unavailable(), false);
        let response = readiness_check(state.clone()).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = health_check(state).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn test_version() {
        let body = body_json(version_info()).await;
        assert_eq!(body["service"], "startup-insights");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
