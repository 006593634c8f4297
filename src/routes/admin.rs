//! Overview, cache administration and demo seeding

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::{info, warn};

use crate::routes::response::{error_response, json_response, report_response};
use crate::service::Dashboard;

/// GET /api/v1/overview
pub async fn overview(dashboard: &Dashboard) -> Response<Full<Bytes>> {
    report_response(&dashboard.overview().await)
}

/// POST /api/v1/cache/clear
pub fn clear_cache(dashboard: &Dashboard) -> Response<Full<Bytes>> {
    let removed = dashboard.clear_cache();
    json_response(StatusCode::OK, &serde_json::json!({ "cleared": removed }))
}

/// POST /api/v1/seed_sessions
pub async fn seed_sessions(dashboard: &Dashboard) -> Response<Full<Bytes>> {
    match dashboard.seed_sessions().await {
        Ok(ids) => {
            info!(count = ids.len(), "Seed sessions inserted");
            json_response(
                StatusCode::CREATED,
                &serde_json::json!({
                    "message": format!("Inserted {} sessions", ids.len()),
                    "inserted_ids": ids,
                }),
            )
        }
        Err(e) => {
            warn!("Seed request rejected: {}", e);
            error_response(e)
        }
    }
}
